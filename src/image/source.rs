//! Locating and reading source images.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use sha2::{Digest, Sha256};
use url::Url;

use crate::constants::IMAGE_HASH_LEN;
use crate::error::{Error, Result};

/// Where a source image lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Local filesystem path
    Local(PathBuf),
    /// Remote `http` or `https` URL
    Remote(Url),
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Local(path) => write!(f, "{}", path.display()),
            ImageSource::Remote(url) => write!(f, "{url}"),
        }
    }
}

impl ImageSource {
    /// Resolves a shortcode argument against the project root.
    ///
    /// `http` and `https` URLs are remote, everything else is a path.
    /// Relative paths are joined onto `base_dir`.
    pub fn resolve<P: AsRef<Path>>(source: &str, base_dir: P) -> Self {
        if let Ok(url) = Url::parse(source) {
            if url.scheme() == "http" || url.scheme() == "https" {
                return Self::Remote(url);
            }
        }

        let path = PathBuf::from(source);
        if path.is_absolute() {
            Self::Local(path)
        } else {
            Self::Local(base_dir.as_ref().join(path))
        }
    }

    /// Reads the raw bytes of the image.
    pub fn read(&self) -> Result<Vec<u8>> {
        match self {
            ImageSource::Local(path) => {
                debug!("Reading image {}", path.display());
                fs::read(path).map_err(|e| Error::SourceError {
                    source_path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
            ImageSource::Remote(url) => {
                debug!("Fetching image {url}");
                let fetch_error = |e: reqwest::Error| Error::FetchError {
                    url: url.to_string(),
                    reason: e.to_string(),
                };
                let response = reqwest::blocking::get(url.as_str())
                    .and_then(|response| response.error_for_status())
                    .map_err(fetch_error)?;
                let bytes = response.bytes().map_err(fetch_error)?;
                Ok(bytes.to_vec())
            }
        }
    }
}

/// Short content hash used to name the artifacts of a source image.
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hash = hex::encode(digest);
    hash.truncate(IMAGE_HASH_LEN);
    hash
}
