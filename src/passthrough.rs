//! Passthrough copy.
//! Copies configured files and directories to the output unchanged.

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Where a passthrough entry lands in the output directory.
///
/// Entries under the input directory keep their path relative to it;
/// anything else keeps its path relative to the project root.
pub fn passthrough_target(entry: &Path, input_dir: &Path, output_dir: &Path) -> PathBuf {
    match entry.strip_prefix(input_dir) {
        Ok(relative) => output_dir.join(relative),
        Err(_) => output_dir.join(entry),
    }
}

fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(Error::IoError)?;
    }
    fs::copy(source, dest).map(|_| ()).map_err(Error::IoError)
}

/// Copies every entry of `entries` (relative to `root`).
///
/// # Returns
/// * `Result<Vec<PathBuf>>` - Output paths of the copied files
///
/// Missing entries are skipped with a warning.
pub fn copy_passthrough(
    root: &Path,
    entries: &[PathBuf],
    input_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();

    for entry in entries {
        let source = root.join(entry);
        if !source.exists() {
            warn!("Passthrough entry '{}' does not exist, skipping", entry.display());
            continue;
        }
        let target = passthrough_target(entry, input_dir, output_dir);

        for dir_entry in WalkDir::new(&source) {
            let dir_entry = dir_entry.map_err(|e| Error::IoError(e.into()))?;
            if !dir_entry.file_type().is_file() {
                continue;
            }
            let relative = dir_entry
                .path()
                .strip_prefix(&source)
                .map_err(|e| Error::ConfigError(e.to_string()))?;
            let dest = if relative.as_os_str().is_empty() {
                target.clone()
            } else {
                target.join(relative)
            };
            debug!("Copying file: {}", dest.display());
            copy_file(dir_entry.path(), &dest)?;
            copied.push(dest);
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_passthrough_target() {
        let input = Path::new("src");
        let output = Path::new("/site/dist");
        assert_eq!(
            passthrough_target(Path::new("src/robots.txt"), input, output),
            PathBuf::from("/site/dist/robots.txt")
        );
        assert_eq!(
            passthrough_target(Path::new("CNAME"), input, output),
            PathBuf::from("/site/dist/CNAME")
        );
        assert_eq!(
            passthrough_target(Path::new("src/assets/fonts"), input, output),
            PathBuf::from("/site/dist/assets/fonts")
        );
    }

    #[test]
    fn test_copy_passthrough() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/assets/fonts/sub")).unwrap();
        fs::write(root.join("CNAME"), "example.com").unwrap();
        fs::write(root.join("src/assets/fonts/a.woff2"), "a").unwrap();
        fs::write(root.join("src/assets/fonts/sub/b.woff2"), "b").unwrap();

        let output = root.join("dist");
        let copied = copy_passthrough(
            root,
            &[
                PathBuf::from("CNAME"),
                PathBuf::from("src/assets/fonts"),
                PathBuf::from("src/missing.txt"),
            ],
            Path::new("src"),
            &output,
        )
        .unwrap();

        assert_eq!(copied.len(), 3);
        assert_eq!(fs::read_to_string(output.join("CNAME")).unwrap(), "example.com");
        assert_eq!(fs::read_to_string(output.join("assets/fonts/sub/b.woff2")).unwrap(), "b");
    }
}
