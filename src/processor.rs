//! Page processing.
//! Turns one input file into its rendered output: front matter, template
//! engine, markdown, layout and transforms.

use log::debug;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::markdown::MarkdownRenderer;
use crate::registry::Registry;
use crate::renderer::TemplateRenderer;

/// How a page's body is turned into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// `.jinja` and `.html`: template engine only
    Template,
    /// `.md`: optionally the template engine, then markdown
    Markdown,
}

impl PageKind {
    /// Kind of `path`, if its extension is one of `template_formats`.
    pub fn from_path(path: &Path, template_formats: &[String]) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if !template_formats.iter().any(|format| format == ext) {
            return None;
        }
        match ext {
            "md" => Some(PageKind::Markdown),
            "jinja" | "html" => Some(PageKind::Template),
            _ => None,
        }
    }
}

/// Result of processing one page.
#[derive(Debug)]
pub struct ProcessedPage {
    pub source: PathBuf,
    pub target: PathBuf,
    pub url: String,
    pub content: String,
}

/// Splits a leading `---` YAML block from `content`.
///
/// # Returns
/// * `(front matter, body)` - front matter is an empty object when absent
pub fn parse_front_matter<'a>(content: &'a str, path: &Path) -> Result<(serde_json::Value, &'a str)> {
    let empty = serde_json::Value::Object(serde_json::Map::new());
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return Ok((empty, content));
    };

    let (yaml, body) = if let Some(body) = rest.strip_prefix("---") {
        // Empty front matter block
        ("", body.trim_start_matches(['\r', '\n']))
    } else if let Some(end) = rest.find("\n---") {
        let after = &rest[end + 4..];
        let body = after
            .strip_prefix("\r\n")
            .or_else(|| after.strip_prefix('\n'))
            .unwrap_or(after);
        (&rest[..end], body)
    } else {
        return Err(Error::FrontMatterError {
            path: path.display().to_string(),
            reason: "unterminated front matter block".to_string(),
        });
    };

    if yaml.trim().is_empty() {
        return Ok((empty, body));
    }
    let value: serde_json::Value = serde_yaml::from_str(yaml).map_err(|e| Error::FrontMatterError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    match value {
        serde_json::Value::Object(_) => Ok((value, body)),
        serde_json::Value::Null => Ok((empty, body)),
        _ => Err(Error::FrontMatterError {
            path: path.display().to_string(),
            reason: "front matter must be a mapping".to_string(),
        }),
    }
}

/// Output path of the page at `relative` (relative to the input directory).
///
/// `index.*` becomes `index.html` in the same folder, anything else
/// `name/index.html`. A `permalink` overrides both; a trailing `/` on it
/// appends `index.html`.
pub fn resolve_target_path<P: AsRef<Path>>(
    relative: &Path,
    output_dir: P,
    permalink: Option<&str>,
) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if let Some(permalink) = permalink {
        let trimmed = permalink.trim_start_matches('/');
        let mut target = PathBuf::from(trimmed);
        if trimmed.is_empty() || trimmed.ends_with('/') {
            target.push("index.html");
        }
        if target
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Error::FrontMatterError {
                path: relative.display().to_string(),
                reason: format!("permalink '{permalink}' leaves the output directory"),
            });
        }
        return Ok(output_dir.join(target));
    }

    let parent = relative.parent().unwrap_or_else(|| Path::new(""));
    let stem = relative
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    let target = if stem == "index" {
        parent.join("index.html")
    } else {
        parent.join(stem).join("index.html")
    };
    Ok(output_dir.join(target))
}

/// Public URL of an output file.
pub fn page_url(target: &Path, output_dir: &Path) -> String {
    let relative = target.strip_prefix(output_dir).unwrap_or(target);
    let mut url = String::from("/");
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    url.push_str(&parts.join("/"));
    match url.strip_suffix("index.html") {
        Some(dir) => dir.to_string(),
        None => url,
    }
}

/// Merges `overlay` onto `base`.
///
/// With `deep`, nested objects are merged key by key; otherwise top-level
/// keys of `overlay` replace those of `base`.
pub fn merge_data(base: &mut serde_json::Value, overlay: &serde_json::Value, deep: bool) {
    match (base, overlay) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) if deep && existing.is_object() && value.is_object() => {
                        merge_data(existing, value, deep)
                    }
                    _ => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Processes the pages of one site.
pub struct Processor<'a> {
    renderer: &'a dyn TemplateRenderer,
    markdown: &'a MarkdownRenderer,
    registry: &'a Registry,
    config: &'a Config,
    input_dir: &'a Path,
    output_dir: &'a Path,
    data: &'a serde_json::Value,
}

impl<'a> Processor<'a> {
    pub fn new(
        renderer: &'a dyn TemplateRenderer,
        markdown: &'a MarkdownRenderer,
        registry: &'a Registry,
        config: &'a Config,
        input_dir: &'a Path,
        output_dir: &'a Path,
        data: &'a serde_json::Value,
    ) -> Self {
        Self {
            renderer,
            markdown,
            registry,
            config,
            input_dir,
            output_dir,
            data,
        }
    }

    /// Renders the page at `path` without writing it.
    pub fn process(&self, path: &Path, kind: PageKind) -> Result<ProcessedPage> {
        let relative = path.strip_prefix(self.input_dir).unwrap_or(path);
        debug!("Processing page {}", relative.display());

        let raw = fs::read_to_string(path)?;
        let (front_matter, body) = parse_front_matter(&raw, relative)?;

        let permalink = front_matter.get("permalink").and_then(|v| v.as_str());
        let target = resolve_target_path(relative, self.output_dir, permalink)?;
        let url = page_url(&target, self.output_dir);

        let mut context = self.data.clone();
        merge_data(&mut context, &front_matter, self.config.data_deep_merge);
        merge_data(
            &mut context,
            &serde_json::json!({
                "page": {
                    "url": url,
                    "input_path": relative.display().to_string(),
                    "output_path": target.display().to_string(),
                }
            }),
            true,
        );

        let name = relative.to_string_lossy();
        let content = match kind {
            PageKind::Template => self.renderer.render(&name, body, &context)?,
            PageKind::Markdown => {
                let source = if self.config.markdown_template_engine {
                    self.renderer.render(&name, body, &context)?
                } else {
                    body.to_string()
                };
                self.markdown.render(&source)
            }
        };

        let content = match front_matter.get("layout").and_then(|v| v.as_str()) {
            Some(layout) => {
                let layout = self.config.resolve_layout(layout);
                debug!("Applying layout {layout} to {}", relative.display());
                self.renderer.render_layout(layout, &content, &context)?
            }
            None => content,
        };

        let content = self.registry.apply_transforms(content, &target);

        Ok(ProcessedPage {
            source: path.to_path_buf(),
            target,
            url,
            content,
        })
    }
}

/// Writes `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).map_err(Error::IoError)
}
