//! kiln is a static site builder.
//! It renders MiniJinja and markdown pages, copies static assets through,
//! and turns images into responsive `<picture>` elements backed by a shared
//! on-disk variant cache.

/// Command-line interface module for the kiln application
pub mod cli;

/// Site configuration
/// Supports JSON and YAML formats (kiln.json, kiln.yml, kiln.yaml)
pub mod config;

/// Common constants
pub mod constants;

/// Error types and handling for the kiln application
pub mod error;

/// File and directory ignore patterns
/// Processes the .kilnignore file of the project root
pub mod ignore;

/// Responsive image pipeline: formats, variants, cache and markup
pub mod image;

/// Logger setup for the binary
pub mod logger;

/// Markdown rendering
pub mod markdown;

/// Verbatim copy of static files
pub mod passthrough;

/// Per-page processing: front matter, templates, layouts, transforms
pub mod processor;

/// Named filters, transforms and shortcodes
pub mod registry;

/// MiniJinja environment setup and rendering
pub mod renderer;

/// The responsive image shortcode
pub mod shortcode;

/// Build orchestration
pub mod site;

/// SVG icon sprite
pub mod sprite;
