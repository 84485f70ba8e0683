//! Layered configuration loading

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use git2consul_core::{ConfigLayer, Endpoint, Error};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("git2consul.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_file_values_fill_gaps_left_by_flags() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        repository = "git@example.com:org/config.git"
        polling_interval = "30s"
        consul_host = "consul.internal"
        "#,
    );

    let flags = ConfigLayer {
        polling_interval: Some(Duration::from_secs(5)),
        ..Default::default()
    };
    let config = flags.merge(ConfigLayer::load(&path).unwrap()).resolve().unwrap();

    assert_eq!(config.repository, "git@example.com:org/config.git");
    assert_eq!(config.polling_interval, Duration::from_secs(5));
    assert_eq!(config.consul, Endpoint::new("consul.internal", 8500));
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = ConfigLayer::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::ConfigFile { .. }));
}

#[test]
fn test_zero_interval_from_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "repository = \"r\"\npolling_interval = \"0\"\n");

    let err = ConfigLayer::load(&path).unwrap().resolve().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}
