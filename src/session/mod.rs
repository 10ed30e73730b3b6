// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted session storage.
//!
//! A session is three entries in a key-value store: the access token, the
//! token pair, and the user profile. They are written together and removed
//! together. [`SessionVault`] is the only code that knows the key layout.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::models::{Session, TokenPair, UserProfile};
use std::sync::Arc;

/// Storage key names.
pub mod keys {
    /// Access token string
    pub const TOKEN: &str = "token";
    /// Token pair object (`{"access", "refresh"}`)
    pub const TOKENS: &str = "tokens";
    /// User profile object
    pub const USER: &str = "user";

    pub const ALL: [&str; 3] = [TOKEN, TOKENS, USER];
}

/// Session storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Client-side key-value storage.
///
/// Reads never fail; a store that cannot produce a value reports it absent.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Write several entries. Backends that can commit atomically override this.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Remove several entries, attempting every key even if one fails.
    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut first_err = None;
        for key in keys {
            if let Err(e) = self.remove(key) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// Shared handle to a session store.
pub type SharedStore = Arc<dyn SessionStore>;

/// Typed access to the three-key session bundle.
#[derive(Clone)]
pub struct SessionVault {
    store: SharedStore,
}

impl SessionVault {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Current access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.store.get(keys::TOKEN).filter(|t| !t.is_empty())
    }

    /// Refresh token from the stored token pair.
    ///
    /// `Err` carries the parse error when the stored pair is malformed.
    pub fn refresh_token(&self) -> Result<Option<String>, String> {
        match self.store.get(keys::TOKENS) {
            None => Ok(None),
            Some(raw) => serde_json::from_str::<TokenPair>(&raw)
                .map(|pair| Some(pair.refresh).filter(|r| !r.is_empty()))
                .map_err(|e| e.to_string()),
        }
    }

    /// Stored user profile.
    ///
    /// `Err` carries the parse error when the stored profile is malformed.
    pub fn user(&self) -> Result<Option<UserProfile>, String> {
        match self.store.get(keys::USER) {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| e.to_string()),
        }
    }

    /// Persist a full session. On failure, nothing is left behind.
    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        let tokens = serde_json::to_string(&TokenPair {
            access: session.access_token.clone(),
            refresh: session.refresh_token.clone(),
        })?;
        let user = serde_json::to_string(&session.user)?;

        let entries = [
            (keys::TOKEN, session.access_token.clone()),
            (keys::TOKENS, tokens),
            (keys::USER, user),
        ];

        if let Err(e) = self.store.set_many(&entries) {
            tracing::error!(error = %e, "Failed to persist session, clearing");
            let _ = self.clear();
            return Err(e);
        }
        Ok(())
    }

    /// Overwrite the access token only.
    pub fn replace_access_token(&self, access_token: &str) -> Result<(), StoreError> {
        self.store.set(keys::TOKEN, access_token)
    }

    /// Remove all three keys.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove_many(&keys::ALL)
    }

    /// True when none of the session keys are present.
    pub fn is_empty(&self) -> bool {
        keys::ALL.iter().all(|key| self.store.get(key).is_none())
    }
}
