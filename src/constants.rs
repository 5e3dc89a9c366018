//! Common constants used throughout kiln.

/// Supported configuration file names, in lookup order
pub const CONFIG_FILES: [&str; 3] = ["kiln.json", "kiln.yml", "kiln.yaml"];

/// kiln's ignore file name, read from the project root
pub const IGNORE_FILE: &str = ".kilnignore";

/// Patterns that are always ignored in the input tree
pub const DEFAULT_IGNORE_PATTERNS: [&str; 3] = ["**/.DS_Store", "**/.git/**", "**/*~"];

/// Number of hex characters of the source hash kept in artifact names
pub const IMAGE_HASH_LEN: usize = 10;

/// Quality used for lossy JPEG output
pub const JPEG_QUALITY: u8 = 80;
