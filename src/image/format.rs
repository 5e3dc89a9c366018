//! Output encodings supported by the image pipeline.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::DynamicImage;
use serde::Serialize;

use crate::constants::JPEG_QUALITY;
use crate::error::{Error, Result};

/// An encoding an image variant can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Webp,
    Jpeg,
    Png,
}

impl OutputFormat {
    /// File extension used for artifacts of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
        }
    }

    /// Value of the `type` attribute on a `<source>` element.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Webp => "image/webp",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    /// Encodes `image` into this format.
    ///
    /// JPEG has no alpha channel, so the image is flattened to RGB first.
    /// WebP is written lossless, the only WebP mode the `image` crate encodes.
    pub fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        match self {
            OutputFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY))?;
            }
            OutputFormat::Webp => {
                let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
                rgba.write_with_encoder(WebPEncoder::new_lossless(&mut buffer))?;
            }
            OutputFormat::Png => {
                image.write_with_encoder(PngEncoder::new(&mut buffer))?;
            }
        }
        Ok(buffer.into_inner())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webp" => Ok(OutputFormat::Webp),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            other => Err(Error::ConfigError(format!(
                "unsupported image format '{other}' (supported: webp, jpeg, png)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn test_parse_formats() {
        assert_eq!("webp".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert!(matches!(
            "avif".parse::<OutputFormat>(),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_encoded_bytes_decode_back() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 4, image::Rgba([200, 10, 10, 255])));
        for format in [OutputFormat::Webp, OutputFormat::Jpeg, OutputFormat::Png] {
            let bytes = format.encode(&image).unwrap();
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (8, 4), "{format}");
        }
    }
}
