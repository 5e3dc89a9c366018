//! The responsive image shortcode.
//!
//! [`ImageShortcode::render`] is the only entry point; the template
//! function and filter registered by the renderer are thin wrappers around
//! it and it does not know which one called it.

use log::debug;

use crate::error::{Error, Result};
use crate::image::{ImageProcessor, Picture};

/// Arguments of one shortcode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Path relative to the project root, or an `http(s)` URL
    pub source: String,
    /// Alt text. `None` is rejected, `Some("")` marks a decorative image.
    pub alt: Option<String>,
    /// `sizes` attribute, passed through untouched
    pub sizes: String,
}

impl ImageRequest {
    pub fn new<S: Into<String>>(source: S, alt: Option<&str>, sizes: &str) -> Self {
        Self {
            source: source.into(),
            alt: alt.map(str::to_string),
            sizes: sizes.to_string(),
        }
    }

    /// Returns the alt text, or [`Error::MissingAltText`] when absent.
    pub fn validate(&self) -> Result<&str> {
        self.alt.as_deref().ok_or_else(|| Error::MissingAltText {
            source_path: self.source.clone(),
        })
    }
}

/// Renders image requests into `<picture>` descriptions.
#[derive(Debug)]
pub struct ImageShortcode {
    processor: ImageProcessor,
}

impl ImageShortcode {
    pub fn new(processor: ImageProcessor) -> Self {
        Self { processor }
    }

    pub fn processor(&self) -> &ImageProcessor {
        &self.processor
    }

    /// Produces the variants for `request` and describes the markup.
    ///
    /// Alt text is checked before the source is touched, so a rejected
    /// request never writes to the cache.
    pub fn render(&self, request: &ImageRequest) -> Result<Picture> {
        let alt = request.validate()?;
        let metadata = self.processor.process(&request.source)?;
        debug!(
            "Rendered {} variants for {}",
            metadata.len(),
            request.source
        );
        Ok(Picture::new(&metadata, alt, &request.sizes))
    }

    /// Renders `request` straight to HTML.
    pub fn render_html(&self, request: &ImageRequest) -> Result<String> {
        self.render(request).map(|picture| picture.to_html())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_alt() {
        assert_eq!(ImageRequest::new("a.jpg", Some("A cat"), "").validate().unwrap(), "A cat");
        assert_eq!(ImageRequest::new("a.jpg", Some(""), "").validate().unwrap(), "");

        match ImageRequest::new("a.jpg", None, "").validate() {
            Err(Error::MissingAltText { source_path }) => assert_eq!(source_path, "a.jpg"),
            other => panic!("Expected MissingAltText, got {other:?}"),
        }
    }
}
