//! Malformed configuration files must fail loudly rather than fall back.

use std::ffi::OsString;
use std::fs;

use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;
use gridwire_config::Config;

#[test]
fn malformed_config_file_is_reported() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("gridwire.toml");

    fs::write(
        &path,
        r#"endpoint = { transport = "tcp" host = "127.0.0.1" }"#,
    )
    .expect("write malformed config");

    let args = vec![
        OsString::from("gridwired"),
        OsString::from("--config-path"),
        path.clone().into_os_string(),
    ];

    let error = Config::load_from_iter(args).expect_err("loading must fail");
    let message = error.to_string();
    assert!(!message.is_empty(), "error should describe the failure");
    assert!(
        !matches!(error.as_ref(), OrthoError::CliParsing(_)),
        "file errors must not be reported as CLI parsing failures: {message}"
    );
}
