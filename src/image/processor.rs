//! Turns a source image into its set of resized, re-encoded variants.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::image::cache::{VariantCache, VariantKey};
use crate::image::format::OutputFormat;
use crate::image::source::{content_hash, ImageSource};
use crate::image::variant::VariantSpec;

/// One encoded variant of a source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub path: PathBuf,
    pub url: String,
    pub size: u64,
}

/// Every variant produced for one source image, grouped by format in
/// preference order and sorted by width inside each group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    pub source_width: u32,
    pub source_height: u32,
    pub variants: IndexMap<OutputFormat, Vec<Variant>>,
}

impl ImageMetadata {
    pub fn len(&self) -> usize {
        self.variants.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over all variants, most preferred format first.
    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.values().flatten()
    }
}

/// Resizes and encodes source images into a [`VariantCache`].
#[derive(Debug)]
pub struct ImageProcessor {
    spec: VariantSpec,
    cache: VariantCache,
    url_path: String,
    base_dir: PathBuf,
}

impl ImageProcessor {
    /// Creates a processor writing into `output_dir`.
    ///
    /// `url_path` is the public URL prefix of `output_dir`, relative sources
    /// are resolved against `base_dir`.
    pub fn new<P: AsRef<Path>, B: AsRef<Path>>(
        spec: VariantSpec,
        output_dir: P,
        url_path: &str,
        base_dir: B,
    ) -> Self {
        let mut url_path = url_path.to_string();
        if !url_path.ends_with('/') {
            url_path.push('/');
        }
        Self {
            spec,
            cache: VariantCache::new(output_dir),
            url_path,
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn spec(&self) -> &VariantSpec {
        &self.spec
    }

    pub fn output_dir(&self) -> &Path {
        self.cache.dir()
    }

    /// Produces or reuses every variant of `source`.
    ///
    /// The source is fully decoded only if at least one variant is missing
    /// from the cache.
    pub fn process(&self, source: &str) -> Result<ImageMetadata> {
        let source = ImageSource::resolve(source, &self.base_dir);
        let bytes = source.read()?;
        let hash = content_hash(&bytes);
        let (source_width, source_height) = read_dimensions(&bytes, &source)?;
        debug!("Processing {source} ({source_width}x{source_height}, hash {hash})");

        let widths = self.spec.widths_for(source_width);
        let mut decoded: Option<DynamicImage> = None;
        let mut variants = IndexMap::new();

        for &format in self.spec.formats() {
            let mut group = Vec::with_capacity(widths.len());
            for &width in &widths {
                let height = scaled_height(source_width, source_height, width);
                let key = VariantKey {
                    hash: hash.clone(),
                    width,
                    format,
                };
                let artifact = self.cache.get_or_create(&key, || {
                    if decoded.is_none() {
                        decoded = Some(decode(&bytes, &source)?);
                    }
                    let image = decoded.as_ref().ok_or_else(|| Error::SourceError {
                        source_path: source.to_string(),
                        reason: "image was not decoded".to_string(),
                    })?;
                    let resized = if width == image.width() {
                        image.clone()
                    } else {
                        image.resize_exact(width, height, FilterType::Lanczos3)
                    };
                    format.encode(&resized)
                })?;

                group.push(Variant {
                    width,
                    height,
                    format,
                    url: format!("{}{}", self.url_path, key.file_name()),
                    path: artifact.path,
                    size: artifact.size,
                });
            }
            variants.insert(format, group);
        }

        Ok(ImageMetadata {
            source_width,
            source_height,
            variants,
        })
    }
}

/// Height of a `width`-pixel variant preserving the source aspect ratio.
pub fn scaled_height(source_width: u32, source_height: u32, width: u32) -> u32 {
    let height = (u64::from(source_height) * u64::from(width) + u64::from(source_width) / 2)
        / u64::from(source_width.max(1));
    (height as u32).max(1)
}

fn read_dimensions(bytes: &[u8], source: &ImageSource) -> Result<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::SourceError {
            source_path: source.to_string(),
            reason: e.to_string(),
        })?
        .into_dimensions()
        .map_err(|e| Error::SourceError {
            source_path: source.to_string(),
            reason: e.to_string(),
        })
}

fn decode(bytes: &[u8], source: &ImageSource) -> Result<DynamicImage> {
    debug!("Decoding {source}");
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::SourceError {
            source_path: source.to_string(),
            reason: e.to_string(),
        })?
        .decode()
        .map_err(Error::ImageError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_height_keeps_ratio() {
        assert_eq!(scaled_height(1200, 800, 600), 400);
        assert_eq!(scaled_height(1200, 800, 150), 100);
        assert_eq!(scaled_height(1000, 333, 300), 100);
        assert_eq!(scaled_height(4000, 1, 10), 1);
    }
}
