//! The set of widths and encodings every source image is rendered into.

use crate::error::{Error, Result};
use crate::image::format::OutputFormat;

/// Target widths crossed with output encodings.
///
/// Widths are strictly increasing and positive. Formats are non-empty,
/// unique, and ordered from most to least preferred; the last one is the
/// fallback every browser understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpec {
    widths: Vec<u32>,
    formats: Vec<OutputFormat>,
}

impl VariantSpec {
    pub fn new(widths: Vec<u32>, formats: Vec<OutputFormat>) -> Result<Self> {
        if widths.is_empty() {
            return Err(Error::ConfigError("image widths must not be empty".to_string()));
        }
        if widths.contains(&0) {
            return Err(Error::ConfigError("image widths must be positive".to_string()));
        }
        if widths.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::ConfigError(format!(
                "image widths must be strictly increasing, got {widths:?}"
            )));
        }
        if formats.is_empty() {
            return Err(Error::ConfigError("image formats must not be empty".to_string()));
        }
        for (i, format) in formats.iter().enumerate() {
            if formats[..i].contains(format) {
                return Err(Error::ConfigError(format!("image format '{format}' is listed twice")));
            }
        }
        Ok(Self { widths, formats })
    }

    /// Parses format names as they appear in the config file.
    pub fn from_names<S: AsRef<str>>(widths: Vec<u32>, formats: &[S]) -> Result<Self> {
        let formats = formats
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<OutputFormat>>>()?;
        Self::new(widths, formats)
    }

    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    pub fn formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    /// The least preferred format, used for the `<img>` fallback.
    pub fn fallback_format(&self) -> OutputFormat {
        // `new` rejects an empty format list.
        self.formats[self.formats.len() - 1]
    }

    /// Widths to produce for a source of `native_width` pixels.
    ///
    /// Never upscales. When every configured width is larger than the
    /// source, the native width is the only one produced.
    pub fn widths_for(&self, native_width: u32) -> Vec<u32> {
        let widths: Vec<u32> = self
            .widths
            .iter()
            .copied()
            .filter(|width| *width <= native_width)
            .collect();
        if widths.is_empty() {
            vec![native_width]
        } else {
            widths
        }
    }
}
