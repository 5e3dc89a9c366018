//! SVG icon sprite.
//! Bundles every icon of a directory into one hidden `<svg>` of `<symbol>`s
//! that the `icon` shortcode references by id.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use walkdir::WalkDir;

use crate::error::{Error, Result};

static SVG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<svg\b([^>]*)>(.*)</svg>").expect("valid svg pattern")
});
static VIEWBOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"viewBox\s*=\s*"([^"]*)""#).expect("valid viewBox pattern"));

/// Builds the sprite from the `*.svg` files directly inside `dir`.
///
/// Icons are ordered by file name. A missing directory yields an empty
/// string.
pub fn build_sprite<P: AsRef<Path>>(dir: P) -> Result<String> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        warn!("Icon directory {} does not exist, sprite is empty", dir.display());
        return Ok(String::new());
    }

    let mut symbols = String::new();
    for entry in WalkDir::new(dir).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::IoError(e.into()))?;
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "svg") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let svg = fs::read_to_string(path)?;
        match symbol(name, &svg) {
            Some(symbol) => {
                debug!("Adding icon '{name}' to sprite");
                symbols.push_str(&symbol);
            }
            None => warn!("Skipping {}: no <svg> element", path.display()),
        }
    }

    if symbols.is_empty() {
        return Ok(String::new());
    }
    Ok(format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" aria-hidden=\"true\" style=\"position:absolute;width:0;height:0;overflow:hidden\">{symbols}</svg>"
    ))
}

/// Converts one icon file into a `<symbol id="icon-{name}">`.
fn symbol(name: &str, svg: &str) -> Option<String> {
    let captures = SVG_RE.captures(svg)?;
    let attributes = captures.get(1).map_or("", |m| m.as_str());
    let body = captures.get(2).map_or("", |m| m.as_str()).trim();
    let view_box = VIEWBOX_RE
        .captures(attributes)
        .and_then(|c| c.get(1))
        .map(|m| format!(" viewBox=\"{}\"", m.as_str()))
        .unwrap_or_default();
    Some(format!("<symbol id=\"icon-{name}\"{view_box}>{body}</symbol>"))
}
