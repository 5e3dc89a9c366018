//! Markdown rendering.
//!
//! Wraps `pulldown-cmark` with the four switches of [`MarkdownConfig`]. The
//! switches are applied as event rewrites between the parser and the HTML
//! writer.

use std::sync::LazyLock;

use pulldown_cmark::{
    html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use regex::Regex;

use crate::config::MarkdownConfig;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"]+[^\s<>"'.,;:!?)\]]"#).expect("valid URL pattern")
});

/// Markdown to HTML renderer.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    config: MarkdownConfig,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(MarkdownConfig::default())
    }
}

impl MarkdownRenderer {
    pub fn new(config: MarkdownConfig) -> Self {
        Self { config }
    }

    /// Parser options for the configured switches.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        if self.config.typographer {
            options |= Options::ENABLE_SMART_PUNCTUATION;
        }
        options
    }

    /// Renders `markdown` to an HTML fragment.
    pub fn render(&self, markdown: &str) -> String {
        let parser = TextMergeStream::new(Parser::new_ext(markdown, self.parser_options()));
        let mut events = Vec::new();
        // Links, image alt text and code blocks are never linkified.
        let mut link_depth = 0usize;
        let mut image_depth = 0usize;
        let mut in_code_block = false;

        for event in parser {
            match event {
                Event::SoftBreak if self.config.breaks => events.push(Event::HardBreak),
                Event::Html(raw) | Event::InlineHtml(raw) if !self.config.html => {
                    events.push(Event::Text(raw))
                }
                Event::Start(Tag::Link { .. }) => {
                    link_depth += 1;
                    events.push(event);
                }
                Event::End(TagEnd::Link) => {
                    link_depth = link_depth.saturating_sub(1);
                    events.push(event);
                }
                Event::Start(Tag::Image { .. }) => {
                    image_depth += 1;
                    events.push(event);
                }
                Event::End(TagEnd::Image) => {
                    image_depth = image_depth.saturating_sub(1);
                    events.push(event);
                }
                Event::Start(Tag::CodeBlock(_)) => {
                    in_code_block = true;
                    events.push(event);
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    events.push(event);
                }
                Event::Text(text)
                    if self.config.linkify && link_depth == 0 && image_depth == 0 && !in_code_block =>
                {
                    linkify(text, &mut events)
                }
                other => events.push(other),
            }
        }

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());
        output
    }
}

/// Splits `text` around bare URLs, wrapping each URL in a link.
fn linkify<'a>(text: CowStr<'a>, events: &mut Vec<Event<'a>>) {
    if !URL_RE.is_match(&text) {
        events.push(Event::Text(text));
        return;
    }

    let text = text.into_string();
    let mut last = 0;
    for found in URL_RE.find_iter(&text) {
        if found.start() > last {
            events.push(Event::Text(CowStr::from(text[last..found.start()].to_string())));
        }
        let url = found.as_str().to_string();
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(url.clone()),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        events.push(Event::Text(CowStr::from(url)));
        events.push(Event::End(TagEnd::Link));
        last = found.end();
    }
    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(html: bool, breaks: bool, linkify: bool, typographer: bool) -> MarkdownRenderer {
        MarkdownRenderer::new(MarkdownConfig {
            html,
            breaks,
            linkify,
            typographer,
        })
    }

    #[test]
    fn test_basic_rendering() {
        let html = MarkdownRenderer::default().render("# Title\n\nSome *text*.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn test_breaks() {
        let md = "line one\nline two";
        assert!(renderer(true, true, false, false).render(md).contains("<br />"));
        assert!(!renderer(true, false, false, false).render(md).contains("<br />"));
    }

    #[test]
    fn test_html_switch() {
        let md = "<div class=\"note\">hi</div>\n";
        assert!(renderer(true, false, false, false).render(md).contains("<div class=\"note\">"));
        assert!(renderer(false, false, false, false).render(md).contains("&lt;div"));
    }

    #[test]
    fn test_linkify() {
        let html = renderer(true, false, true, false).render("See https://example.com/page.");
        assert!(html.contains("<a href=\"https://example.com/page\">https://example.com/page</a>."));

        let html = renderer(true, false, false, false).render("See https://example.com/page.");
        assert!(!html.contains("<a "));
    }

    #[test]
    fn test_linkify_skips_links_and_code() {
        let r = renderer(true, false, true, false);
        let html = r.render("[https://a.example](https://b.example)");
        assert_eq!(html.matches("<a ").count(), 1);

        let html = r.render("```\nhttps://example.com\n```\n");
        assert!(!html.contains("<a "));

        let html = r.render("![map of https://example.com](map.png)");
        assert_eq!(
            html,
            "<p><img src=\"map.png\" alt=\"map of https://example.com\" /></p>\n"
        );
    }

    #[test]
    fn test_typographer() {
        let html = renderer(true, false, false, true).render("\"quoted\" -- dash");
        assert!(html.contains('\u{201c}'));
        assert!(html.contains('\u{2013}'));
        let html = renderer(true, false, false, false).render("\"quoted\"");
        assert!(!html.contains('\u{201c}'));
    }
}
