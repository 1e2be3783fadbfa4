//! Session token store.
//!
//! The token lives in storage scoped to the running client, the terminal
//! counterpart of a browser tab: it is gone when the process exits and is
//! never shared with other instances. Presence of a token is all the client
//! checks; expiry and validity are left to the API.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "user_token";

/// Key/value storage with the shape of the browser's `sessionStorage`.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: String);
    fn remove_item(&self, key: &str);
}

/// In-process storage that dies with the client.
#[derive(Debug, Default)]
pub struct TabStorage {
    items: RwLock<HashMap<String, String>>,
}

impl Storage for TabStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: String) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove_item(&self, key: &str) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Session context, built once at startup and handed to the router, the API
/// client and every screen that needs it.
#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("present", &self.is_present())
            .finish()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Arc::new(TabStorage::default()))
    }
}

impl Session {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn get(&self) -> Option<String> {
        self.storage.get_item(TOKEN_KEY)
    }

    /// Replaces the active token.
    pub fn set(&self, token: impl Into<String>) {
        self.storage.set_item(TOKEN_KEY, token.into());
        tracing::debug!("session token stored");
    }

    /// Drops the active token. A no-op on an empty session.
    pub fn clear(&self) {
        self.storage.remove_item(TOKEN_KEY);
        tracing::debug!("session cleared");
    }

    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }
}
