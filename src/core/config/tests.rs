use super::data::{path_display, resolve_base_url, Config};
use super::io::ConfigError;
use crate::core::constants::DEFAULT_BASE_URL;
use crate::core::storage::SessionBackend;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert_eq!(config.session_backend(), SessionBackend::File);
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        base_url: Some("http://localhost:8000/api".to_string()),
        session_store: Some(SessionBackend::Keyring),
        default_username: Some("alice".to_string()),
    };
    config.save_to_path(&config_path).expect("Failed to save config");

    let mut loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded, config);

    loaded.base_url = None;
    loaded.session_store = None;
    loaded.save_to_path(&config_path).expect("Failed to save config");

    let reloaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(reloaded.base_url, None);
    assert_eq!(reloaded.session_backend(), SessionBackend::File);
    assert_eq!(reloaded.default_username.as_deref(), Some("alice"));
}

#[test]
fn session_store_is_written_in_lowercase() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    let config = Config {
        session_store: Some(SessionBackend::Keyring),
        ..Default::default()
    };
    config.save_to_path(&config_path).expect("Failed to save config");

    let contents = std::fs::read_to_string(&config_path).expect("read config");
    assert!(contents.contains("session_store = \"keyring\""));
}

#[test]
fn invalid_toml_reports_parse_error_with_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "base_url = [").expect("write config");

    let err = Config::load_from_path(&config_path).expect_err("parse should fail");
    let config_err = err
        .downcast_ref::<ConfigError>()
        .expect("error should be a ConfigError");
    assert!(matches!(config_err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn base_url_resolution_order() {
    let config = Config {
        base_url: Some("http://from-config/api/".to_string()),
        ..Default::default()
    };

    assert_eq!(
        resolve_base_url(Some("http://from-cli/api"), Some("http://from-env/api"), &config),
        "http://from-cli/api"
    );
    assert_eq!(
        resolve_base_url(None, Some("http://from-env/api"), &config),
        "http://from-env/api"
    );
    assert_eq!(resolve_base_url(None, None, &config), "http://from-config/api");
    assert_eq!(
        resolve_base_url(Some("  "), None, &Config::default()),
        DEFAULT_BASE_URL
    );
}

#[cfg(unix)]
#[test]
fn path_display_abbreviates_home() {
    let Some(home) = std::env::var_os("HOME") else {
        return;
    };
    let path = std::path::PathBuf::from(home).join(".config").join("roomchat");
    assert_eq!(path_display(&path), "~/.config/roomchat");
}
