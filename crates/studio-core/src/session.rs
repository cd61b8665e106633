//! The session store: the client's single authentication credential pair.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::tokens::{AccessToken, RefreshToken};

/// Holds at most one credential pair and answers "is there a usable session".
///
/// Handles are cheap to clone and share one underlying slot, so a store
/// injected into a request client observes every `save`/`clear` made through
/// any other handle before the next request is built.
///
/// # Example
///
/// ```
/// use studio_core::SessionStore;
///
/// let store = SessionStore::new();
/// store.save("A1", "R1");
/// assert!(store.is_authenticated());
/// store.clear();
/// assert!(!store.is_authenticated());
/// ```
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<SessionTokens>>>,
}

#[derive(Clone)]
struct SessionTokens {
    access_token: AccessToken,
    refresh_token: RefreshToken,
}

impl SessionStore {
    /// Create an empty, unauthenticated store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any existing session with the given pair.
    ///
    /// Both credentials are replaced together; there is no partial update.
    pub fn save(&self, access: impl Into<String>, refresh: impl Into<String>) {
        let tokens = SessionTokens {
            access_token: AccessToken::new(access),
            refresh_token: RefreshToken::new(refresh),
        };
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let replaced = slot.replace(tokens).is_some();
        info!(replaced, "Session saved");
    }

    /// Seed the store from persisted tokens. Same semantics as [`save`](Self::save).
    pub fn restore(&self, access: AccessToken, refresh: RefreshToken) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(SessionTokens {
            access_token: access,
            refresh_token: refresh,
        });
        debug!("Session restored");
    }

    /// True iff an access credential is stored. Expiry is not checked.
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Remove both credentials.
    pub fn clear(&self) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            info!("Session cleared");
        }
    }

    /// Snapshot of the current access token, if any.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    /// Snapshot of the current refresh token, if any.
    pub fn refresh_token(&self) -> Option<RefreshToken> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|t| t.refresh_token.clone())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_clear() {
        let store = SessionStore::new();
        assert!(!store.is_authenticated());

        store.save("A1", "R1");
        assert!(store.is_authenticated());
        assert_eq!(store.access_token().unwrap().as_str(), "A1");
        assert_eq!(store.refresh_token().unwrap().as_str(), "R1");

        store.clear();
        assert!(!store.is_authenticated());
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn save_replaces_both_credentials() {
        let store = SessionStore::new();
        store.save("A1", "R1");
        store.save("A2", "R2");
        assert_eq!(store.access_token().unwrap().as_str(), "A2");
        assert_eq!(store.refresh_token().unwrap().as_str(), "R2");
    }

    #[test]
    fn clones_share_state() {
        let store = SessionStore::new();
        let handle = store.clone();

        store.save("A1", "R1");
        assert!(handle.is_authenticated());

        handle.clear();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn clear_on_empty_store_is_noop() {
        let store = SessionStore::new();
        store.clear();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn debug_hides_tokens() {
        let store = SessionStore::new();
        store.save("secret-access", "secret-refresh");
        let debug = format!("{:?}", store);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("authenticated: true"));
    }
}
