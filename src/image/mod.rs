//! Responsive image pipeline.
//!
//! | Module | Role |
//! |---|---|
//! | [`format`] | Output encodings and how each is written |
//! | [`variant`] | Configured widths × encodings |
//! | [`source`] | Local or remote source images and their content hash |
//! | [`cache`] | Shared on-disk artifact cache |
//! | [`processor`] | Resize and encode a source into its variants |
//! | [`picture`] | `<picture>` markup for a set of variants |

pub mod cache;
pub mod format;
pub mod picture;
pub mod processor;
pub mod source;
pub mod variant;

pub use format::OutputFormat;
pub use picture::Picture;
pub use processor::{ImageMetadata, ImageProcessor, Variant};
pub use variant::VariantSpec;
