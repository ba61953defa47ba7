use crate::core::constants::DEFAULT_BASE_URL;
use crate::core::storage::SessionBackend;
use crate::utils::url::normalize_base_url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// API root, e.g. "https://host/api"
    pub base_url: Option<String>,
    /// Where the login token is kept between runs ("file" or "keyring")
    pub session_store: Option<SessionBackend>,
    /// Prefilled at the login prompt
    pub default_username: Option<String>,
}

impl Config {
    pub fn session_backend(&self) -> SessionBackend {
        self.session_store.unwrap_or_default()
    }
}

/// Pick the base URL: command line first, then environment, then config,
/// then the built-in default. Blank values are skipped.
pub fn resolve_base_url(cli: Option<&str>, env: Option<&str>, config: &Config) -> String {
    [cli, env, config.base_url.as_deref()]
        .into_iter()
        .flatten()
        .map(normalize_base_url)
        .find(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
