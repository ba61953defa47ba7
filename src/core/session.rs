use crate::core::storage::{SessionStorage, StorageError, AUTH_TOKEN_KEY, USERNAME_KEY};
use tracing::{debug, warn};

/// Client-held proof of authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub username: Option<String>,
}

/// The single source of truth for "am I logged in".
///
/// The in-memory session is what requests read; every change is mirrored to
/// the storage backend so the next process starts in the same state. Memory
/// is always updated first, so a storage failure can never leave the client
/// believing it is logged in after a clear.
pub struct SessionStore {
    session: Session,
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    /// Restore the session saved by a previous run. A token that cannot be
    /// read counts as logged out; the next `start` or `clear` overwrites it.
    pub fn load(storage: Box<dyn SessionStorage>) -> Self {
        let token = read_key(storage.as_ref(), AUTH_TOKEN_KEY).filter(|token| !token.is_empty());
        let username = match token {
            Some(_) => read_key(storage.as_ref(), USERNAME_KEY),
            None => None,
        };
        debug!(authenticated = token.is_some(), "Loaded session");
        Self {
            session: Session { token, username },
            storage,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.session.username.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.token.is_some()
    }

    /// Record a fresh login.
    pub fn start(&mut self, token: &str, username: &str) -> Result<(), StorageError> {
        self.session = Session {
            token: Some(token.to_string()),
            username: Some(username.to_string()),
        };
        self.storage.set(AUTH_TOKEN_KEY, token)?;
        self.storage.set(USERNAME_KEY, username)
    }

    /// Forget the session. Both keys are removed even if the first removal
    /// fails; the first error is returned.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.session = Session::default();
        let token_result = self.storage.remove(AUTH_TOKEN_KEY);
        let username_result = self.storage.remove(USERNAME_KEY);
        token_result.and(username_result)
    }
}

fn read_key(storage: &dyn SessionStorage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, error = %err, "Ignoring unreadable stored session");
            None
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .field("username", &self.session.username)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::{FileStorage, MemoryStorage};

    struct FailingRemove(MemoryStorage);

    impl SessionStorage for FailingRemove {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0.set(key, value)
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::NoDataDir)
        }
    }

    #[test]
    fn missing_token_means_logged_out_even_with_username() {
        let storage = MemoryStorage::with_entries([(USERNAME_KEY, "alice")]);
        let store = SessionStore::load(Box::new(storage));
        assert!(!store.is_authenticated());
        assert_eq!(store.username(), None);
    }

    #[test]
    fn load_restores_previous_session() {
        let storage =
            MemoryStorage::with_entries([(AUTH_TOKEN_KEY, "abc123"), (USERNAME_KEY, "alice")]);
        let store = SessionStore::load(Box::new(storage));
        assert!(store.is_authenticated());
        assert_eq!(store.token(), Some("abc123"));
        assert_eq!(store.username(), Some("alice"));
    }

    #[test]
    fn start_and_clear_mirror_to_storage() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::load(Box::new(storage.clone()));

        store.start("abc123", "alice").unwrap();
        assert_eq!(storage.snapshot(AUTH_TOKEN_KEY).as_deref(), Some("abc123"));
        assert_eq!(storage.snapshot(USERNAME_KEY).as_deref(), Some("alice"));

        store.clear().unwrap();
        assert!(!store.is_authenticated());
        assert_eq!(storage.snapshot(AUTH_TOKEN_KEY), None);
        assert_eq!(storage.snapshot(USERNAME_KEY), None);
    }

    #[test]
    fn clear_forgets_memory_even_when_storage_fails() {
        let mut store = SessionStore::load(Box::new(FailingRemove(MemoryStorage::new())));
        store.start("abc123", "alice").unwrap();

        assert!(store.clear().is_err());
        assert!(!store.is_authenticated());
        assert_eq!(store.session(), &Session::default());
    }

    #[test]
    fn corrupt_session_file_loads_logged_out_and_is_replaced() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "auth_token = [").expect("write corrupt file");

        let mut store = SessionStore::load(Box::new(FileStorage::new(path.clone())));
        assert!(!store.is_authenticated());
        assert_eq!(store.username(), None);

        store.start("abc123", "alice").expect("start overwrites corrupt file");
        let reloaded = SessionStore::load(Box::new(FileStorage::new(path)));
        assert_eq!(reloaded.token(), Some("abc123"));
        assert_eq!(reloaded.username(), Some("alice"));
    }

    #[test]
    fn clear_removes_corrupt_session_file() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "auth_token = [").expect("write corrupt file");

        let mut store = SessionStore::load(Box::new(FileStorage::new(path.clone())));
        store.clear().expect("clear");
        assert!(!path.exists());
    }
}
