//! `<picture>` markup built from a set of image variants.

use std::fmt::Write;

use html_escape::encode_double_quoted_attribute as attr;
use serde::Serialize;

use crate::image::processor::{ImageMetadata, Variant};

/// One candidate in a `srcset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SrcsetEntry {
    pub url: String,
    pub width: u32,
}

/// A `<source>` element: every width of one format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PictureSource {
    pub mime_type: String,
    pub srcset: Vec<SrcsetEntry>,
    pub sizes: String,
}

impl PictureSource {
    /// `srcset` attribute value, e.g. `/img/a-150.webp 150w, /img/a-300.webp 300w`.
    pub fn srcset_attr(&self) -> String {
        self.srcset
            .iter()
            .map(|entry| format!("{} {}w", entry.url, entry.width))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The `<img>` element browsers fall back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackImage {
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub alt: String,
    pub sizes: String,
    pub loading: &'static str,
    pub decoding: &'static str,
}

/// Structural description of a responsive `<picture>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Picture {
    pub sources: Vec<PictureSource>,
    pub fallback: FallbackImage,
}

impl Picture {
    /// Builds the markup for `metadata`.
    ///
    /// Sources follow the metadata's format order. The fallback uses the
    /// largest variant of the last format.
    pub fn new(metadata: &ImageMetadata, alt: &str, sizes: &str) -> Self {
        let sources = metadata
            .variants
            .iter()
            .map(|(format, variants)| PictureSource {
                mime_type: format.mime_type().to_string(),
                srcset: variants
                    .iter()
                    .map(|variant| SrcsetEntry {
                        url: variant.url.clone(),
                        width: variant.width,
                    })
                    .collect(),
                sizes: sizes.to_string(),
            })
            .collect();

        let largest: Option<&Variant> = metadata
            .variants
            .values()
            .last()
            .and_then(|variants| variants.iter().max_by_key(|variant| variant.width));
        let (src, width, height) = match largest {
            Some(variant) => (variant.url.clone(), variant.width, variant.height),
            None => (String::new(), metadata.source_width, metadata.source_height),
        };

        Self {
            sources,
            fallback: FallbackImage {
                src,
                width,
                height,
                alt: alt.to_string(),
                sizes: sizes.to_string(),
                loading: "lazy",
                decoding: "async",
            },
        }
    }

    /// Serializes the picture to HTML.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<picture>");
        for source in &self.sources {
            let _ = write!(
                html,
                "<source type=\"{}\" srcset=\"{}\"",
                attr(&source.mime_type),
                attr(&source.srcset_attr())
            );
            if !source.sizes.is_empty() {
                let _ = write!(html, " sizes=\"{}\"", attr(&source.sizes));
            }
            html.push('>');
        }

        let img = &self.fallback;
        let _ = write!(
            html,
            "<img src=\"{}\" width=\"{}\" height=\"{}\" alt=\"{}\"",
            attr(&img.src),
            img.width,
            img.height,
            attr(&img.alt)
        );
        if !img.sizes.is_empty() {
            let _ = write!(html, " sizes=\"{}\"", attr(&img.sizes));
        }
        let _ = write!(
            html,
            " loading=\"{}\" decoding=\"{}\"></picture>",
            img.loading, img.decoding
        );
        html
    }
}
