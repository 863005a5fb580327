//! Persisted user identifier storage.
//!
//! The backend knows a cart owner only by an anonymous token, and the
//! client keeps that token in a single JSON file under the state
//! directory. Storage here is deliberately forgiving: a missing,
//! unreadable, or legacy-format record is replaced with a fresh
//! identifier, and a failed write is logged without interrupting the
//! session (the in-memory value still stands).

use std::fs;
use std::path::{Path, PathBuf};

use cartwright_core::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// File name of the identifier record inside the state directory.
const IDENTITY_FILE: &str = "user_id.json";

/// On-disk shape of the persisted identifier.
#[derive(Debug, Serialize, Deserialize)]
struct IdentityRecord {
    user_id: UserId,
    created_at: DateTime<Utc>,
}

/// File-backed store for the anonymous user identifier.
#[derive(Debug, Clone)]
pub struct UserIdStore {
    path: PathBuf,
}

impl UserIdStore {
    /// Create a store rooted at the given state directory.
    #[must_use]
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(IDENTITY_FILE),
        }
    }

    /// Read the persisted identifier, creating one when absent.
    ///
    /// Never fails: storage read errors are treated as "create new", and a
    /// legacy-format token (weak `user_` prefixed randomness from early
    /// clients) is replaced with a fresh UUID. No network call is made.
    #[must_use]
    pub fn load_or_create(&self) -> UserId {
        match self.read() {
            Some(id) if !id.is_legacy() => id,
            Some(id) => {
                debug!(user_id = %id, "replacing legacy-format identifier");
                self.create()
            }
            None => self.create(),
        }
    }

    /// Overwrite the persisted identifier with a server-issued
    /// replacement.
    ///
    /// A failed write is logged; the caller keeps using the new value
    /// in memory either way.
    pub fn replace(&self, user_id: &UserId) {
        self.write(user_id);
    }

    fn read(&self) -> Option<UserId> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<IdentityRecord>(&raw) {
            Ok(record) => Some(record.user_id),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable identity record");
                None
            }
        }
    }

    fn create(&self) -> UserId {
        let user_id = UserId::generate();
        self.write(&user_id);
        user_id
    }

    fn write(&self, user_id: &UserId) {
        let record = IdentityRecord {
            user_id: user_id.clone(),
            created_at: Utc::now(),
        };

        let result = self
            .path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| {
                let json = serde_json::to_string_pretty(&record)?;
                fs::write(&self.path, json)
            });

        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "failed to persist user identifier");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A state directory that cleans up after itself.
    struct TempStateDir(PathBuf);

    impl TempStateDir {
        fn new() -> Self {
            let dir = std::env::temp_dir().join(format!("cartwright-test-{}", uuid::Uuid::new_v4()));
            Self(dir)
        }

        fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for TempStateDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_identifier_persists_across_loads() {
        let dir = TempStateDir::new();
        let store = UserIdStore::new(dir.path());

        let first = store.load_or_create();
        let second = store.load_or_create();
        assert_eq!(first, second);

        // A separate store over the same directory sees the same value.
        let other = UserIdStore::new(dir.path());
        assert_eq!(other.load_or_create(), first);
    }

    #[test]
    fn test_legacy_identifier_is_replaced() {
        let dir = TempStateDir::new();
        let store = UserIdStore::new(dir.path());
        store.replace(&UserId::from("user_8fk2lq"));

        let replaced = store.load_or_create();
        assert!(!replaced.is_legacy());

        // The replacement is persisted, not regenerated per call.
        assert_eq!(store.load_or_create(), replaced);
    }

    #[test]
    fn test_unreadable_record_is_replaced() {
        let dir = TempStateDir::new();
        fs::create_dir_all(dir.path()).expect("create state dir");
        fs::write(dir.path().join(IDENTITY_FILE), "not json").expect("write garbage");

        let store = UserIdStore::new(dir.path());
        let created = store.load_or_create();
        assert_eq!(store.load_or_create(), created);
    }

    #[test]
    fn test_replace_adopts_server_issued_value() {
        let dir = TempStateDir::new();
        let store = UserIdStore::new(dir.path());
        let _ = store.load_or_create();

        store.replace(&UserId::from("abc"));
        assert_eq!(store.load_or_create(), UserId::from("abc"));
    }
}
