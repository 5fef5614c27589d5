//! Bearer token store.
//!
//! [`AuthContext`] is handed to everything that needs the token instead of
//! reaching for global storage. It holds no state of its own beyond the
//! injected [`KeyValueStorage`].

use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::storage::KeyValueStorage;

/// Storage key holding the access token.
pub const TOKEN_KEY: &str = "jwt_access";

/// Access to the persisted bearer token.
#[derive(Clone)]
pub struct AuthContext {
    storage: Arc<dyn KeyValueStorage>,
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl AuthContext {
    /// Create a context over the given storage.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// The stored token, if any. Empty values count as absent.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.storage
            .get(TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
    }

    /// Persist a token, replacing any previous one.
    pub fn set_token(&self, token: &SecretString) {
        if let Err(e) = self.storage.set(TOKEN_KEY, token.expose_secret()) {
            tracing::warn!(error = %e, "Failed to persist access token");
        }
    }

    /// Forget the stored token.
    pub fn clear_token(&self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            tracing::warn!(error = %e, "Failed to clear access token");
        }
    }

    /// Whether a token is currently stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn context() -> AuthContext {
        AuthContext::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_token_lifecycle() {
        let auth = context();
        assert!(auth.token().is_none());

        auth.set_token(&SecretString::from("abc.def"));
        assert_eq!(
            auth.token().map(|t| t.expose_secret().to_owned()).as_deref(),
            Some("abc.def")
        );

        auth.clear_token();
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn test_empty_token_is_absent() {
        let auth = context();
        auth.set_token(&SecretString::from(""));
        assert!(auth.token().is_none());
    }

    #[test]
    fn test_clones_share_storage() {
        let auth = context();
        let other = auth.clone();
        auth.set_token(&SecretString::from("t"));
        assert!(other.is_authenticated());
    }

    #[test]
    fn test_debug_hides_token() {
        let auth = context();
        auth.set_token(&SecretString::from("super-secret"));
        let debug = format!("{auth:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("authenticated: true"));
    }
}
