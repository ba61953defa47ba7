//! Durable key/value storage for the session.
//!
//! The session only ever stores two keys ([`AUTH_TOKEN_KEY`] and
//! [`USERNAME_KEY`]); the backends below differ in where those strings live.

use crate::core::keyring::KeyringAccessError;
use directories::ProjectDirs;
use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use tracing::warn;

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const USERNAME_KEY: &str = "username";

const KEYRING_SERVICE: &str = "roomchat";
const SESSION_FILE_NAME: &str = "session.toml";

#[derive(Debug)]
pub enum StorageError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Serialize(toml::ser::Error),
    Keyring(KeyringAccessError),
    NoDataDir,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io { path, source } => {
                write!(f, "session file {}: {}", path.display(), source)
            }
            StorageError::Parse { path, source } => {
                write!(f, "corrupt session file {}: {}", path.display(), source)
            }
            StorageError::Serialize(err) => write!(f, "failed to encode session: {err}"),
            StorageError::Keyring(err) => write!(f, "keyring: {err}"),
            StorageError::NoDataDir => write!(f, "could not determine a data directory"),
        }
    }
}

impl StdError for StorageError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StorageError::Io { source, .. } => Some(source),
            StorageError::Parse { source, .. } => Some(source),
            StorageError::Serialize(err) => Some(err),
            StorageError::Keyring(err) => Some(err),
            StorageError::NoDataDir => None,
        }
    }
}

impl From<KeyringAccessError> for StorageError {
    fn from(err: KeyringAccessError) -> Self {
        StorageError::Keyring(err)
    }
}

/// Which backend keeps the session between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    File,
    Keyring,
}

impl SessionBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionBackend::File => "file",
            SessionBackend::Keyring => "keyring",
        }
    }

    pub fn open(&self) -> Result<Box<dyn SessionStorage>, StorageError> {
        match self {
            SessionBackend::File => Ok(Box::new(FileStorage::default_location()?)),
            SessionBackend::Keyring => Ok(Box::new(KeyringStorage::new())),
        }
    }
}

impl std::str::FromStr for SessionBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(SessionBackend::File),
            "keyring" => Ok(SessionBackend::Keyring),
            other => Err(format!(
                "Unknown session store '{other}'. Expected 'file' or 'keyring'."
            )),
        }
    }
}

/// Persistent string storage, in the spirit of a browser's `localStorage`.
pub trait SessionStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// TOML table on disk, rewritten atomically on every change.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<data dir>/session.toml` for the current user.
    pub fn default_location() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("org", "roomchat", "roomchat").ok_or(StorageError::NoDataDir)?;
        Ok(Self::new(dirs.data_dir().join(SESSION_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Entries to rewrite from. A corrupt file is discarded rather than
    /// blocking the write that replaces it.
    fn read_for_update(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_all() {
            Err(err @ StorageError::Parse { .. }) => {
                warn!(error = %err, "Discarding corrupt session file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn delete_file(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        let parent = self.path.parent().filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(io_err)?;
        }

        let contents = toml::to_string_pretty(entries).map_err(StorageError::Serialize)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(io_err)?;
        temp_file.write_all(contents.as_bytes()).map_err(io_err)?;
        temp_file.as_file_mut().sync_all().map_err(io_err)?;
        temp_file
            .persist(&self.path)
            .map_err(|err| io_err(err.error))?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(err @ StorageError::Parse { .. }) => {
                warn!(error = %err, "Removing corrupt session file");
                return self.delete_file();
            }
            Err(err) => return Err(err),
        };
        if entries.remove(key).is_none() {
            return Ok(());
        }
        if entries.is_empty() {
            return self.delete_file();
        }
        self.write_all(&entries)
    }
}

/// One keyring entry per key under the `roomchat` service.
#[derive(Debug, Clone)]
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, StorageError> {
        Entry::new(&self.service, key).map_err(|err| KeyringAccessError::from(err).into())
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStorage for KeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(KeyringAccessError::from(err).into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|err| KeyringAccessError::from(err).into())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(KeyringAccessError::from(err).into()),
        }
    }
}

/// In-process storage. Clones share the same map, so a test can keep a
/// handle after giving the storage to a client.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let storage = Self::new();
        {
            let mut map = storage.lock();
            for (key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
        }
        storage
    }

    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // a poisoned map still holds valid strings
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_storage_round_trips_keys() {
        let dir = TempDir::new().expect("temp dir");
        let mut storage = FileStorage::new(dir.path().join("nested").join("session.toml"));

        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap(), None);
        storage.set(AUTH_TOKEN_KEY, "abc123").unwrap();
        storage.set(USERNAME_KEY, "alice").unwrap();

        let reopened = FileStorage::new(storage.path().to_path_buf());
        assert_eq!(reopened.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("abc123"));
        assert_eq!(reopened.get(USERNAME_KEY).unwrap().as_deref(), Some("alice"));
    }

    #[test]
    fn file_storage_deletes_file_when_last_key_removed() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("session.toml");
        let mut storage = FileStorage::new(path.clone());

        storage.set(AUTH_TOKEN_KEY, "abc123").unwrap();
        storage.set(USERNAME_KEY, "alice").unwrap();
        storage.remove(AUTH_TOKEN_KEY).unwrap();
        assert!(path.exists());
        storage.remove(USERNAME_KEY).unwrap();
        assert!(!path.exists());
        storage.remove(USERNAME_KEY).unwrap();
    }

    #[test]
    fn corrupt_session_file_reports_path() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "auth_token = [").unwrap();

        let err = FileStorage::new(path).get(AUTH_TOKEN_KEY).unwrap_err();
        assert!(matches!(err, StorageError::Parse { .. }));
        assert!(err.to_string().contains("session.toml"));
    }

    #[test]
    fn writes_replace_a_corrupt_session_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "auth_token = [").unwrap();

        let mut storage = FileStorage::new(path.clone());
        storage.set(USERNAME_KEY, "alice").unwrap();
        assert_eq!(storage.get(USERNAME_KEY).unwrap().as_deref(), Some("alice"));
        assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap(), None);

        std::fs::write(&path, "auth_token = [").unwrap();
        storage.remove(AUTH_TOKEN_KEY).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn session_backend_parses_case_insensitively() {
        assert_eq!("Keyring".parse::<SessionBackend>(), Ok(SessionBackend::Keyring));
        assert_eq!(" file ".parse::<SessionBackend>(), Ok(SessionBackend::File));
        assert!("sqlite".parse::<SessionBackend>().is_err());
    }

    #[test]
    fn memory_storage_clones_share_state() {
        let storage = MemoryStorage::with_entries([(AUTH_TOKEN_KEY, "t")]);
        let mut handle = storage.clone();
        handle.remove(AUTH_TOKEN_KEY).unwrap();
        assert_eq!(storage.snapshot(AUTH_TOKEN_KEY), None);
    }
}
