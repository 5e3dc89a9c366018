use std::io;

use kiln::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let kiln_err: Error = io_err.into();

    match kiln_err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid config".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid config.");

    let err = Error::MissingAltText {
        source_path: "src/assets/images/bike.jpg".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Missing alt text for image 'src/assets/images/bike.jpg': pass alt=\"\" for decorative images."
    );
}

#[test]
fn test_template_error_keeps_message() {
    let err = Error::MissingAltText {
        source_path: "cat.png".to_string(),
    }
    .into_template_error();
    assert!(err.to_string().contains("Missing alt text for image 'cat.png'"));
}
