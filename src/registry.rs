//! Named filters, transforms and shortcodes.
//!
//! Each table is a fixed list of `(name, fn)` pairs. The renderer iterates
//! the filter and shortcode tables into the template engine at startup and
//! the page processor runs the transforms over every rendered page.

use std::path::Path;
use std::sync::LazyLock;

use cruet::Inflector;
use html_escape::encode_double_quoted_attribute;
use indexmap::IndexMap;
use regex::Regex;

/// A template filter over a string value.
pub type Filter = fn(&str) -> String;

/// A transform over a rendered page and its output path.
pub type Transform = fn(&str, &Path) -> String;

/// A shortcode taking positional string arguments.
pub type Shortcode = fn(&[String]) -> String;

/// Length of an [`excerpt`], in characters.
pub const EXCERPT_LENGTH: usize = 200;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));
// Whitespace around these tags never renders, unlike the gap between
// inline elements.
const BLOCK_TAGS: &str = "address|article|aside|blockquote|body|dd|details|div|dl|dt|fieldset|\
    figcaption|figure|footer|form|h[1-6]|head|header|hr|html|li|link|main|meta|nav|ol|p|\
    section|summary|table|tbody|td|tfoot|th|thead|title|tr|ul";
static BEFORE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\s+(</?(?:{BLOCK_TAGS})\b)")).expect("valid block tag pattern")
});
static AFTER_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(</?(?:{BLOCK_TAGS})\b[^>]*>)\s+")).expect("valid block tag pattern")
});

/// Lookup tables merged into the build at startup.
#[derive(Clone)]
pub struct Registry {
    pub filters: IndexMap<&'static str, Filter>,
    pub transforms: IndexMap<&'static str, Transform>,
    pub shortcodes: IndexMap<&'static str, Shortcode>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut filters: IndexMap<&'static str, Filter> = IndexMap::new();
        filters.insert("slugify", slugify);
        filters.insert("strip_html", strip_html);
        filters.insert("excerpt", excerpt);

        let mut transforms: IndexMap<&'static str, Transform> = IndexMap::new();
        transforms.insert("minify_html", minify_html);

        let mut shortcodes: IndexMap<&'static str, Shortcode> = IndexMap::new();
        shortcodes.insert("icon", icon);

        Self {
            filters,
            transforms,
            shortcodes,
        }
    }
}

impl Registry {
    /// Runs every transform over `content`, in table order.
    pub fn apply_transforms(&self, content: String, output_path: &Path) -> String {
        self.transforms
            .values()
            .fold(content, |content, transform| transform(&content, output_path))
    }
}

/// URL-safe slug: `"Hello World"` becomes `"hello-world"`.
pub fn slugify(value: &str) -> String {
    value.to_kebab_case()
}

/// Removes tags and collapses whitespace.
pub fn strip_html(value: &str) -> String {
    let text = TAG_RE.replace_all(value, " ");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Plain-text summary cut at a word boundary.
pub fn excerpt(value: &str) -> String {
    let text = strip_html(value);
    if text.chars().count() <= EXCERPT_LENGTH {
        return text;
    }
    let cut: String = text.chars().take(EXCERPT_LENGTH).collect();
    let cut = match cut.rfind(' ') {
        Some(space) => &cut[..space],
        None => cut.as_str(),
    };
    format!("{}…", cut.trim_end())
}

/// Drops whitespace next to block-level tags of HTML pages.
///
/// Whitespace between inline elements is kept. Pages containing `<pre>` or
/// `<textarea>` are left alone.
pub fn minify_html(content: &str, output_path: &Path) -> String {
    let is_html = output_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
    if !is_html || content.contains("<pre") || content.contains("<textarea") {
        return content.to_string();
    }
    let content = BEFORE_BLOCK_RE.replace_all(content.trim(), "$1");
    AFTER_BLOCK_RE.replace_all(&content, "$1").into_owned()
}

/// Reference to an icon of the SVG sprite: `icon("github")`.
pub fn icon(args: &[String]) -> String {
    let Some(name) = args.first() else {
        return String::new();
    };
    let name = encode_double_quoted_attribute(name);
    format!(
        "<svg class=\"icon icon-{name}\" aria-hidden=\"true\" focusable=\"false\"><use xlink:href=\"#icon-{name}\"></use></svg>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables() {
        let registry = Registry::default();
        assert_eq!(
            registry.filters.keys().copied().collect::<Vec<_>>(),
            vec!["slugify", "strip_html", "excerpt"]
        );
        assert!(registry.transforms.contains_key("minify_html"));
        assert!(registry.shortcodes.contains_key("icon"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>there</b></p>\n<p>friend</p>"), "Hello there friend");
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("<p>short</p>"), "short");
        let long = "word ".repeat(100);
        let result = excerpt(&long);
        assert!(result.ends_with('…'));
        assert!(result.chars().count() <= EXCERPT_LENGTH + 1);
    }

    #[test]
    fn test_minify_html() {
        let html = "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>\n";
        assert_eq!(minify_html(html, Path::new("dist/index.html")), "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(minify_html(html, Path::new("dist/feed.xml")), html);
        let pre = "<pre>\n  x\n</pre>";
        assert_eq!(minify_html(pre, Path::new("dist/index.html")), pre);
    }

    #[test]
    fn test_minify_html_keeps_inline_gaps() {
        let html = crate::markdown::MarkdownRenderer::default().render("*hello* **world**\n");
        assert_eq!(
            minify_html(&html, Path::new("dist/index.html")),
            "<p><em>hello</em> <strong>world</strong></p>"
        );
        let page = "<div>\n  <a href=\"/\">Home</a>\n  <a href=\"/about/\">About</a>\n</div>";
        assert_eq!(
            minify_html(page, Path::new("dist/index.html")),
            "<div><a href=\"/\">Home</a>\n  <a href=\"/about/\">About</a></div>"
        );
    }

    #[test]
    fn test_icon() {
        assert_eq!(
            icon(&["github".to_string()]),
            "<svg class=\"icon icon-github\" aria-hidden=\"true\" focusable=\"false\"><use xlink:href=\"#icon-github\"></use></svg>"
        );
        assert_eq!(icon(&[]), "");
    }
}
