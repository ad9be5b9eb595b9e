//! Configuration file loading tests
//!
//! Covers TOML parsing, explicit config files that are missing or malformed,
//! and the override > file > default resolution order.

use std::io::Write;
use std::path::PathBuf;

use fdp_common::config::{load_toml_config, ConfigOverrides, ServiceConfig, TomlConfig};
use fdp_common::Error;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Should create temp file");
    file.write_all(content.as_bytes()).expect("Should write config");
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
host = "0.0.0.0"
port = 8088
export_filename = "Council_Projects.csv"
seed_csv = "/var/lib/fdp/seed.csv"
"#,
    );

    let config = load_toml_config(file.path()).unwrap();
    assert_eq!(
        config,
        TomlConfig {
            host: Some("0.0.0.0".to_string()),
            port: Some(8088),
            export_filename: Some("Council_Projects.csv".to_string()),
            seed_csv: Some(PathBuf::from("/var/lib/fdp/seed.csv")),
        }
    );
}

#[test]
fn test_load_partial_config() {
    let file = write_config("port = 7000\n");
    let config = load_toml_config(file.path()).unwrap();
    assert_eq!(config.port, Some(7000));
    assert_eq!(config.host, None);
}

#[test]
fn test_malformed_config_is_error() {
    let file = write_config("port = \"not a number\"\n");
    let err = load_toml_config(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_unknown_key_is_error() {
    let file = write_config("prot = 7000\n");
    assert!(load_toml_config(file.path()).is_err());
}

#[test]
fn test_explicit_missing_file_is_error() {
    let overrides = ConfigOverrides {
        config_file: Some(PathBuf::from("/nonexistent/fdp/config.toml")),
        ..Default::default()
    };
    let err = ServiceConfig::resolve(overrides).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_resolve_with_explicit_file_and_override() {
    let file = write_config("host = \"10.0.0.5\"\nport = 7000\n");
    let overrides = ConfigOverrides {
        port: Some(7100),
        config_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let config = ServiceConfig::resolve(overrides).unwrap();
    assert_eq!(config.host, "10.0.0.5");
    assert_eq!(config.port, 7100);
    assert_eq!(config.export_filename, "Forbes_Design_Projects.csv");
    assert_eq!(config.bind_address(), "10.0.0.5:7100");
}
