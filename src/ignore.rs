//! File and directory ignore pattern handling for kiln sites.
//! This module processes the .kilnignore file in the project root to exclude
//! paths of the input directory from the build, similar to .gitignore.

use crate::constants::DEFAULT_IGNORE_PATTERNS;
use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::{fs::read_to_string, path::Path};

/// Reads the .kilnignore file and compiles it with the default patterns.
///
/// # Arguments
/// * `kilnignore_path` - Path to the .kilnignore file
///
/// # Returns
/// * `Result<GlobSet>` - Set of compiled glob patterns, matched against paths
///   relative to the input directory
///
/// # Notes
/// - If the .kilnignore file doesn't exist, only the defaults apply
/// - Blank lines and lines starting with `#` are skipped
///
/// # Example
/// ```ignore
/// # Contents of .kilnignore:
/// drafts/**
/// *.bak
/// ```
pub fn parse_kilnignore_file<P: AsRef<Path>>(kilnignore_path: P) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in DEFAULT_IGNORE_PATTERNS {
        builder.add(Glob::new(pattern).map_err(|e| Error::IgnoreError(e.to_string()))?);
    }

    if let Ok(contents) = read_to_string(kilnignore_path.as_ref()) {
        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            builder.add(Glob::new(line).map_err(|e| {
                Error::IgnoreError(format!(".kilnignore loading failed: {e}"))
            })?);
        }
    } else {
        debug!(".kilnignore does not exist")
    }

    builder
        .build()
        .map_err(|e| Error::IgnoreError(format!(".kilnignore loading failed: {e}")))
}
