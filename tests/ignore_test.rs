use kiln::constants::IGNORE_FILE;
use kiln::ignore::parse_kilnignore_file;
use std::fs::File;
use std::io::Write;
use tempfile::TempDir;

#[test]
fn test_parse_kilnignore_file() {
    let temp_dir = TempDir::new().unwrap();
    let ignore_path = temp_dir.path().join(IGNORE_FILE);

    // Test without .kilnignore
    let glob_set = parse_kilnignore_file(&ignore_path).unwrap();
    assert!(glob_set.is_match("posts/.DS_Store")); // Default pattern
    assert!(!glob_set.is_match("posts/hello.md"));

    // Test with .kilnignore
    let mut file = File::create(&ignore_path).unwrap();
    writeln!(file, "# drafts stay local\ndrafts/**\n\n*.bak").unwrap();

    let glob_set = parse_kilnignore_file(&ignore_path).unwrap();
    assert!(glob_set.is_match("drafts/wip.md"));
    assert!(glob_set.is_match("index.md.bak"));
    assert!(glob_set.is_match("posts/.DS_Store")); // Default pattern still works
    assert!(!glob_set.is_match("posts/hello.md"));
}

#[test]
fn test_invalid_pattern() {
    let temp_dir = TempDir::new().unwrap();
    let ignore_path = temp_dir.path().join(IGNORE_FILE);
    std::fs::write(&ignore_path, "a[\n").unwrap();

    assert!(parse_kilnignore_file(&ignore_path).is_err());
}
