//! Anonymous cart-owner identifier.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix used by early clients whose identifiers came from a
/// non-cryptographic random source.
const LEGACY_PREFIX: &str = "user_";

/// An anonymous per-browser token identifying a cart owner to the backend.
///
/// Identifiers are opaque to the client: they are generated once, persisted,
/// and only ever replaced when the backend explicitly issues a new value
/// during checkout. Fresh identifiers are UUID v4 strings, giving 122 bits
/// of cryptographically seeded randomness.
///
/// The backend may hand back any token it likes as a replacement, so this
/// type accepts arbitrary strings; only *generation* is constrained.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Generate a fresh identifier from cryptographic randomness.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns `true` if the value uses the legacy `user_` weak-random
    /// format.
    ///
    /// Those tokens were derived from a non-cryptographic generator and are
    /// collision-prone; stores replace them with a fresh identifier on
    /// load.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.0.starts_with(LEGACY_PREFIX)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `UserId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
