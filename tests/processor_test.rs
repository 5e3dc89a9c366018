use std::fs;
use std::path::{Path, PathBuf};

use kiln::config::Config;
use kiln::error::Result;
use kiln::markdown::MarkdownRenderer;
use kiln::processor::{PageKind, Processor};
use kiln::registry::Registry;
use kiln::renderer::TemplateRenderer;
use serde_json::json;
use tempfile::TempDir;

/// Renderer that echoes its input so the processor can be checked alone.
struct EchoRenderer;

impl TemplateRenderer for EchoRenderer {
    fn render(&self, _name: &str, template: &str, context: &serde_json::Value) -> Result<String> {
        let title = context["title"].as_str().unwrap_or_default();
        Ok(template.replace("{{ title }}", title))
    }

    fn render_layout(
        &self,
        layout: &str,
        content: &str,
        _context: &serde_json::Value,
    ) -> Result<String> {
        Ok(format!("<main data-layout=\"{layout}\">{content}</main>"))
    }
}

fn process(config: &Config, relative: &str, source: &str) -> (PathBuf, String) {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("src");
    let output = temp_dir.path().join("dist");
    let path = input.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, source).unwrap();

    let markdown = MarkdownRenderer::new(config.markdown);
    let registry = Registry::default();
    let data = json!({"title": "From data", "site": {"lang": "en"}});
    let processor = Processor::new(
        &EchoRenderer,
        &markdown,
        &registry,
        config,
        &input,
        &output,
        &data,
    );
    let page = processor
        .process(&path, PageKind::from_path(&path, &config.template_formats).unwrap())
        .unwrap();
    let target = page.target.strip_prefix(&output).unwrap().to_path_buf();
    (target, page.content)
}

#[test]
fn test_markdown_page_with_layout() {
    let config = Config::default();
    let (target, content) = process(
        &config,
        "posts/first.md",
        "---\ntitle: First\nlayout: post\n---\n# {{ title }}\n",
    );

    assert_eq!(target, Path::new("posts/first/index.html"));
    assert_eq!(content, "<main data-layout=\"post.jinja\"><h1>First</h1></main>");
}

#[test]
fn test_template_page_uses_data() {
    let config = Config::default();
    let (target, content) = process(&config, "index.jinja", "<p>{{ title }}</p>\n<p>x</p>");

    assert_eq!(target, Path::new("index.html"));
    assert_eq!(content, "<p>From data</p><p>x</p>");
}

#[test]
fn test_markdown_without_template_engine() {
    let mut config = Config::default();
    config.markdown_template_engine = false;
    let (_, content) = process(&config, "raw.md", "{{ title }}");

    assert_eq!(content, "<p>{{ title }}</p>");
}

#[test]
fn test_permalink() {
    let config = Config::default();
    let (target, _) = process(&config, "errors/missing.html", "---\npermalink: /404.html\n---\nGone");

    assert_eq!(target, Path::new("404.html"));
}
