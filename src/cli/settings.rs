//! `roomchat set` / `roomchat unset`.

use crate::core::config::data::Config;
use crate::core::storage::SessionBackend;
use crate::utils::url::normalize_base_url;

pub const CONFIG_KEYS: &[&str] = &["base-url", "session-store", "default-username"];

/// Apply `set KEY VALUE...` to the config. Multi-word values are joined
/// with spaces. Returns the confirmation line to print.
pub fn set_value(config: &mut Config, key: &str, value: &[String]) -> Result<String, String> {
    let value = value.join(" ");
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("A value is required. Example: roomchat set {key} VALUE"));
    }

    match key {
        "base-url" => {
            let url = normalize_base_url(value);
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("base-url must start with http:// or https://, got '{url}'"));
            }
            config.base_url = Some(url.clone());
            Ok(format!("✅ Set base-url to: {url}"))
        }
        "session-store" => {
            let backend: SessionBackend = value.parse()?;
            config.session_store = Some(backend);
            Ok(format!("✅ Set session-store to: {}", backend.as_str()))
        }
        "default-username" => {
            config.default_username = Some(value.to_string());
            Ok(format!("✅ Set default-username to: {value}"))
        }
        _ => Err(unknown_key(key)),
    }
}

pub fn unset_value(config: &mut Config, key: &str) -> Result<String, String> {
    match key {
        "base-url" => config.base_url = None,
        "session-store" => config.session_store = None,
        "default-username" => config.default_username = None,
        _ => return Err(unknown_key(key)),
    }
    Ok(format!("✅ Unset {key}"))
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key: {key}. Available keys: {}",
        CONFIG_KEYS.join(", ")
    )
}
