//! Site configuration.
//! Loads `kiln.json`, `kiln.yml` or `kiln.yaml` from the project root, fills
//! in defaults and validates everything that must hold before a build starts.

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::CONFIG_FILES;
use crate::error::{Error, Result};
use crate::image::VariantSpec;

/// Template formats kiln knows how to render.
pub const KNOWN_TEMPLATE_FORMATS: [&str; 3] = ["jinja", "html", "md"];

/// Directory layout, relative to the project root (`input`, `output`) or to
/// the input directory (`includes`, `layouts`, `data`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub includes: PathBuf,
    pub layouts: PathBuf,
    pub data: PathBuf,
}

impl Default for DirConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("src"),
            output: PathBuf::from("dist"),
            includes: PathBuf::from("includes"),
            layouts: PathBuf::from("layouts"),
            data: PathBuf::from("data"),
        }
    }
}

/// Markdown renderer switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Pass raw HTML through instead of escaping it
    pub html: bool,
    /// Render soft line breaks as `<br />`
    pub breaks: bool,
    /// Turn bare URLs into links
    pub linkify: bool,
    /// Smart quotes and dashes
    pub typographer: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            html: true,
            breaks: true,
            linkify: true,
            typographer: true,
        }
    }
}

impl MarkdownConfig {
    /// Settings of the paired `markdown` block: raw HTML only.
    pub fn paired() -> Self {
        Self {
            html: true,
            breaks: false,
            linkify: false,
            typographer: false,
        }
    }
}

/// Responsive image settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    pub widths: Vec<u32>,
    pub formats: Vec<String>,
    /// Where variants are written, relative to the project root
    pub output_dir: PathBuf,
    /// Public URL prefix of `output_dir`
    pub url_path: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            widths: vec![150, 300, 600, 900],
            formats: vec!["webp".to_string(), "jpeg".to_string()],
            output_dir: PathBuf::from("dist/img"),
            url_path: "/img/".to_string(),
        }
    }
}

/// SVG icon sprite settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteConfig {
    /// Directory of `*.svg` icons, relative to the project root
    pub path: PathBuf,
    /// Name of the shortcode that emits the sprite
    pub shortcode: String,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("src/assets/icons"),
            shortcode: "iconsprite".to_string(),
        }
    }
}

/// Full site configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub dir: DirConfig,
    pub template_formats: Vec<String>,
    /// Run markdown pages through the template engine before markdown
    pub markdown_template_engine: bool,
    pub layout_aliases: IndexMap<String, String>,
    /// Files and directories copied verbatim, relative to the project root
    pub passthrough: Vec<PathBuf>,
    pub data_deep_merge: bool,
    pub markdown: MarkdownConfig,
    pub image: ImageConfig,
    pub sprite: SpriteConfig,
}

impl Default for Config {
    fn default() -> Self {
        let mut layout_aliases = IndexMap::new();
        layout_aliases.insert("base".to_string(), "base.jinja".to_string());
        layout_aliases.insert("post".to_string(), "post.jinja".to_string());

        Self {
            dir: DirConfig::default(),
            template_formats: KNOWN_TEMPLATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            markdown_template_engine: true,
            layout_aliases,
            passthrough: [
                "CNAME",
                "src/robots.txt",
                "src/site.webmanifest",
                "src/assets/images",
                "src/assets/fonts",
            ]
            .iter()
            .map(PathBuf::from)
            .collect(),
            data_deep_merge: true,
            markdown: MarkdownConfig::default(),
            image: ImageConfig::default(),
            sprite: SpriteConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration of the project at `root`.
    ///
    /// Falls back to [`Config::default`] when no configuration file exists.
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self> {
        match load_config(root, &CONFIG_FILES)? {
            Some(content) => parse_config(&content),
            None => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Checks every startup invariant and returns the image variant spec.
    pub fn validate(&self) -> Result<VariantSpec> {
        for (name, dir) in [
            ("input", &self.dir.input),
            ("output", &self.dir.output),
            ("includes", &self.dir.includes),
            ("layouts", &self.dir.layouts),
            ("data", &self.dir.data),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(Error::ConfigError(format!("dir.{name} must not be empty")));
            }
        }

        if self.template_formats.is_empty() {
            return Err(Error::ConfigError("template_formats must not be empty".to_string()));
        }
        if let Some(unknown) = self
            .template_formats
            .iter()
            .find(|format| !KNOWN_TEMPLATE_FORMATS.contains(&format.as_str()))
        {
            return Err(Error::ConfigError(format!(
                "unknown template format '{unknown}' (supported: {})",
                KNOWN_TEMPLATE_FORMATS.join(", ")
            )));
        }

        if self.sprite.shortcode.trim().is_empty() {
            return Err(Error::ConfigError("sprite.shortcode must not be empty".to_string()));
        }

        VariantSpec::from_names(self.image.widths.clone(), &self.image.formats)
    }

    /// Resolves a layout name through the alias table.
    pub fn resolve_layout<'a>(&'a self, layout: &'a str) -> &'a str {
        self.layout_aliases
            .get(layout)
            .map(String::as_str)
            .unwrap_or(layout)
    }

    pub fn includes_dir<P: AsRef<Path>>(&self, root: P) -> PathBuf {
        root.as_ref().join(&self.dir.input).join(&self.dir.includes)
    }

    pub fn layouts_dir<P: AsRef<Path>>(&self, root: P) -> PathBuf {
        root.as_ref().join(&self.dir.input).join(&self.dir.layouts)
    }

    pub fn data_dir<P: AsRef<Path>>(&self, root: P) -> PathBuf {
        root.as_ref().join(&self.dir.input).join(&self.dir.data)
    }
}

/// Reads the first configuration file that exists in `root`.
///
/// # Returns
/// * `Result<Option<String>>` - Contents of the first found configuration file, if any
pub fn load_config<P: AsRef<Path>>(root: P, config_files: &[&str]) -> Result<Option<String>> {
    for file in config_files {
        let config_path = root.as_ref().join(file);
        if config_path.exists() {
            debug!("Loading configuration from {}", config_path.display());
            return Ok(Some(std::fs::read_to_string(&config_path)?));
        }
    }
    Ok(None)
}

/// Parses configuration content, trying JSON first and YAML second.
pub fn parse_config(content: &str) -> Result<Config> {
    match serde_json::from_str(content) {
        Ok(config) => Ok(config),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration format: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        let spec = config.validate().unwrap();
        assert_eq!(spec.widths(), &[150, 300, 600, 900]);
        assert_eq!(config.resolve_layout("post"), "post.jinja");
        assert_eq!(config.resolve_layout("custom.jinja"), "custom.jinja");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = parse_config("image:\n  widths: [100, 200]\n").unwrap();
        assert_eq!(config.image.widths, vec![100, 200]);
        assert_eq!(config.image.formats, vec!["webp", "jpeg"]);
        assert_eq!(config.dir, DirConfig::default());
    }

    #[test]
    fn test_json_config() {
        let config = parse_config(r#"{"dir": {"output": "_site"}, "data_deep_merge": false}"#).unwrap();
        assert_eq!(config.dir.output, PathBuf::from("_site"));
        assert_eq!(config.dir.input, PathBuf::from("src"));
        assert!(!config.data_deep_merge);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            parse_config("imgae:\n  widths: [1]\n"),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unsupported_format() {
        let mut config = Config::default();
        config.image.formats = vec!["webp".to_string(), "tiff".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unsupported image format 'tiff'"));
    }

    #[test]
    fn test_validate_rejects_unknown_template_format() {
        let mut config = Config::default();
        config.template_formats.push("liquid".to_string());
        assert!(config.validate().is_err());
    }
}
