//! Abstract persistence for the current bearer token.

use std::sync::{Mutex, PoisonError};

/// Key-value persistence holding the single current bearer token.
///
/// The concrete mechanism (cookie jar, secure storage, keychain) lives with
/// the embedding application; the client only reads, replaces, and clears the
/// value. Implementations must be callable from concurrent tasks.
pub trait TokenStore: Send + Sync {
    /// The currently persisted token, if any.
    fn get(&self) -> Option<String>;
    /// Replace the persisted token.
    fn set(&self, token: &str);
    /// Remove the persisted token (logout).
    fn clear(&self);
}

/// Process-local [`TokenStore`] backed by a mutex. The default store, and
/// the one used throughout the test suite.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with a token.
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.lock().clone()
    }

    fn set(&self, token: &str) {
        *self.lock() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.lock() = None;
    }
}
