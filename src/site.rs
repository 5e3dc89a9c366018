//! Site build orchestration.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::GlobSet;
use log::{debug, info};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::Config;
use crate::constants::IGNORE_FILE;
use crate::error::{Error, Result};
use crate::ignore::parse_kilnignore_file;
use crate::image::{ImageProcessor, VariantSpec};
use crate::markdown::MarkdownRenderer;
use crate::passthrough::copy_passthrough;
use crate::processor::{merge_data, write_file, PageKind, Processor};
use crate::registry::Registry;
use crate::renderer::{MiniJinjaRenderer, RendererOptions};
use crate::shortcode::ImageShortcode;
use crate::sprite::build_sprite;

/// What a build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Written pages, in input order
    pub pages: Vec<PathBuf>,
    /// Passthrough files
    pub copied: Vec<PathBuf>,
}

/// A loaded and validated site.
#[derive(Debug)]
pub struct Site {
    root: PathBuf,
    config: Config,
    spec: VariantSpec,
}

impl Site {
    /// Loads the configuration at `root` and validates it.
    ///
    /// Configuration errors surface here, before any page is built.
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self> {
        let config = Config::load(root.as_ref())?;
        Self::with_config(root, config)
    }

    pub fn with_config<P: AsRef<Path>>(root: P, config: Config) -> Result<Self> {
        let spec = config.validate()?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            config,
            spec,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join(&self.config.dir.input)
    }

    /// Overrides the configured output directory.
    ///
    /// An image directory inside the old output directory moves along with it.
    pub fn set_output_dir<P: AsRef<Path>>(&mut self, output_dir: P) {
        let output_dir = output_dir.as_ref().to_path_buf();
        if let Ok(relative) = self.config.image.output_dir.strip_prefix(&self.config.dir.output) {
            let rebased = output_dir.join(relative);
            debug!("Moving image output to {}", rebased.display());
            self.config.image.output_dir = rebased;
        }
        self.config.dir.output = output_dir;
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.dir.output)
    }

    /// Builds the image shortcode for this site.
    pub fn image_shortcode(&self) -> ImageShortcode {
        ImageShortcode::new(ImageProcessor::new(
            self.spec.clone(),
            self.root.join(&self.config.image.output_dir),
            &self.config.image.url_path,
            &self.root,
        ))
    }

    /// Renders every page and copies passthrough files.
    ///
    /// Pages render in parallel; the first failing page aborts the build.
    pub fn build(&self) -> Result<BuildReport> {
        let input_dir = self.input_dir();
        let output_dir = self.output_dir();
        info!("Building {} into {}", input_dir.display(), output_dir.display());

        let data = load_data(&self.config.data_dir(&self.root), self.config.data_deep_merge)?;
        let registry = Registry::default();
        let renderer = MiniJinjaRenderer::new(RendererOptions {
            template_dirs: vec![
                self.config.layouts_dir(&self.root),
                self.config.includes_dir(&self.root),
            ],
            registry: registry.clone(),
            images: Arc::new(self.image_shortcode()),
            sprite_shortcode: self.config.sprite.shortcode.clone(),
            sprite: build_sprite(self.root.join(&self.config.sprite.path))?,
        });
        let markdown = MarkdownRenderer::new(self.config.markdown);
        let processor = Processor::new(
            &renderer,
            &markdown,
            &registry,
            &self.config,
            &input_dir,
            &output_dir,
            &data,
        );

        let ignored = parse_kilnignore_file(self.root.join(IGNORE_FILE))?;
        let pages = self.collect_pages(&input_dir, &ignored)?;
        info!("Rendering {} pages", pages.len());

        let written = pages
            .par_iter()
            .map(|(path, kind)| {
                let page = processor.process(path, *kind)?;
                write_file(&page.target, &page.content)?;
                debug!("Wrote {} ({})", page.target.display(), page.url);
                Ok(page.target)
            })
            .collect::<Result<Vec<_>>>()?;

        let copied = copy_passthrough(
            &self.root,
            &self.config.passthrough,
            &self.config.dir.input,
            &output_dir,
        )?;

        Ok(BuildReport {
            pages: written,
            copied,
        })
    }

    /// Lists the pages of the input tree.
    ///
    /// Skips the includes, layouts and data directories, ignored paths and
    /// files that are not a configured template format.
    pub fn collect_pages(
        &self,
        input_dir: &Path,
        ignored: &GlobSet,
    ) -> Result<Vec<(PathBuf, PageKind)>> {
        let skipped_dirs = [
            self.config.includes_dir(&self.root),
            self.config.layouts_dir(&self.root),
            self.config.data_dir(&self.root),
        ];

        let mut pages = Vec::new();
        let walker = WalkDir::new(input_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !skipped_dirs.iter().any(|dir| entry.path() == dir));
        for entry in walker {
            let entry = entry.map_err(|e| Error::IoError(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let relative = path
                .strip_prefix(input_dir)
                .map_err(|e| Error::ConfigError(e.to_string()))?;
            if ignored.is_match(relative) {
                debug!("Skipping file {} from .kilnignore", relative.display());
                continue;
            }
            if let Some(kind) = PageKind::from_path(path, &self.config.template_formats) {
                pages.push((path.to_path_buf(), kind));
            }
        }
        Ok(pages)
    }
}

/// Loads every `*.json`, `*.yaml` and `*.yml` file of `data_dir` into one
/// object keyed by file stem.
pub fn load_data(data_dir: &Path, deep: bool) -> Result<serde_json::Value> {
    let mut data = serde_json::Value::Object(serde_json::Map::new());
    if !data_dir.is_dir() {
        return Ok(data);
    }

    for entry in WalkDir::new(data_dir).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::IoError(e.into()))?;
        let path = entry.path();
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let value: serde_json::Value = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&fs::read_to_string(path)?).map_err(|e| {
                Error::ConfigError(format!("invalid data file {}: {e}", path.display()))
            })?,
            Some("yaml" | "yml") => serde_yaml::from_str(&fs::read_to_string(path)?).map_err(|e| {
                Error::ConfigError(format!("invalid data file {}: {e}", path.display()))
            })?,
            _ => continue,
        };
        debug!("Loaded data file {}", path.display());
        let mut keyed = serde_json::Map::new();
        keyed.insert(stem.to_string(), value);
        merge_data(&mut data, &serde_json::Value::Object(keyed), deep);
    }
    Ok(data)
}
