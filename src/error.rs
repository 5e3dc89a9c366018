//! Error handling for kiln.
//! Defines the error type and result alias used throughout the crate.

use std::io;
use thiserror::Error;

/// Errors that can occur while loading a site or building its pages.
///
/// Validation and I/O errors abort the page that raised them, configuration
/// errors abort the build before any page is rendered.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Represents errors raised by the template engine
    #[error("Template rendering error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    /// Represents errors that occur during configuration parsing or validation
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// An image shortcode was called without alt text.
    #[error(
        "Missing alt text for image '{source_path}': pass alt=\"\" for decorative images."
    )]
    MissingAltText { source_path: String },

    /// The source image could not be read or identified.
    #[error("Failed to read image '{source_path}': {reason}.")]
    SourceError { source_path: String, reason: String },

    /// A remote source image could not be downloaded.
    #[error("Failed to fetch '{url}': {reason}.")]
    FetchError { url: String, reason: String },

    /// Represents decode or encode failures in the image pipeline
    #[error("Image processing error: {0}.")]
    ImageError(#[from] image::ImageError),

    /// A page's front matter block is not valid YAML.
    #[error("Front matter error in '{path}': {reason}.")]
    FrontMatterError { path: String, reason: String },

    /// Represents errors in processing .kilnignore files
    #[error("KilnIgnore error: {0}.")]
    IgnoreError(String),
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps the error so it can be raised from inside a template call.
    pub fn into_template_error(self) -> minijinja::Error {
        minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, self.to_string())
            .with_source(self)
    }
}

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
