//! Template rendering for kiln.
//! Builds the MiniJinja environment of a site: layouts and includes loader,
//! registry filters and shortcodes, the image adapters, the icon sprite and
//! the paired `markdown` block.
use std::path::PathBuf;
use std::sync::Arc;

use minijinja::value::Rest;
use minijinja::{context, path_loader, AutoEscape, Environment, Value};

use crate::config::MarkdownConfig;
use crate::error::Result;
use crate::markdown::MarkdownRenderer;
use crate::registry::Registry;
use crate::shortcode::{ImageRequest, ImageShortcode};

/// Trait for template rendering engines.
///
/// Pages render on several threads at once, so engines must be shareable.
pub trait TemplateRenderer: Send + Sync {
    /// Renders template source registered under `name`.
    ///
    /// # Arguments
    /// * `name` - Template name, used for error messages and auto-escaping
    /// * `template` - Template source to render
    /// * `context` - Context variables for rendering
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String>;

    /// Wraps rendered page `content` in the layout template `layout`.
    fn render_layout(
        &self,
        layout: &str,
        content: &str,
        context: &serde_json::Value,
    ) -> Result<String>;
}

/// Everything the environment registers besides the built-ins.
pub struct RendererOptions {
    /// Directories searched for layouts and includes, in order
    pub template_dirs: Vec<PathBuf>,
    pub registry: Registry,
    pub images: Arc<ImageShortcode>,
    pub sprite_shortcode: String,
    pub sprite: String,
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    pub fn new(options: RendererOptions) -> Self {
        let mut env = Environment::new();

        let loaders: Vec<_> = options.template_dirs.into_iter().map(path_loader).collect();
        env.set_loader(move |name| {
            for loader in &loaders {
                if let Some(source) = loader(name)? {
                    return Ok(Some(source));
                }
            }
            Ok(None)
        });

        env.set_auto_escape_callback(|name| {
            if name.ends_with(".html") || name.ends_with(".jinja") {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });

        for (&name, &filter) in &options.registry.filters {
            env.add_filter(name, move |value: String| filter(&value));
        }
        for (&name, &shortcode) in &options.registry.shortcodes {
            env.add_function(name, move |args: Rest<String>| {
                Value::from_safe_string(shortcode(&args))
            });
        }

        let sprite = options.sprite;
        env.add_function(options.sprite_shortcode, move || {
            Value::from_safe_string(sprite.clone())
        });

        // `image(src, alt, sizes)` and `src | image(alt, sizes)`.
        let images = options.images.clone();
        env.add_function("image", move |src: String, alt: Option<String>, sizes: Option<String>| {
            image_adapter(&images, src, alt, sizes)
        });
        let images = options.images;
        env.add_filter("image", move |src: String, alt: Option<String>, sizes: Option<String>| {
            image_adapter(&images, src, alt, sizes)
        });

        // `{% filter markdown %}...{% endfilter %}`
        let paired = MarkdownRenderer::new(MarkdownConfig::paired());
        env.add_filter("markdown", move |content: String| {
            Value::from_safe_string(paired.render(&content))
        });

        Self { env }
    }
}

fn image_adapter(
    images: &ImageShortcode,
    src: String,
    alt: Option<String>,
    sizes: Option<String>,
) -> std::result::Result<Value, minijinja::Error> {
    let request = ImageRequest {
        source: src,
        alt,
        sizes: sizes.unwrap_or_default(),
    };
    images
        .render_html(&request)
        .map(Value::from_safe_string)
        .map_err(|e| e.into_template_error())
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String> {
        Ok(self.env.render_named_str(name, template, context)?)
    }

    fn render_layout(
        &self,
        layout: &str,
        content: &str,
        context: &serde_json::Value,
    ) -> Result<String> {
        let template = self.env.get_template(layout)?;
        let ctx = context! {
            content => Value::from_safe_string(content.to_string()),
            ..Value::from_serialize(context)
        };
        Ok(template.render(ctx)?)
    }
}
