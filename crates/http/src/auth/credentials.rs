//! Bearer token sources

use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Failure to read the stored credential
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// The backing storage could not be reached
    #[error("credential storage unavailable: {0}")]
    Unavailable(String),

    /// The storage was reached but the lookup itself failed
    #[error("failed to read credential '{key}': {reason}")]
    Read { key: String, reason: String },
}

/// Supplies the current access token for outgoing requests.
///
/// Implementations only read. Writing, rotating and deleting the token is
/// the job of whatever code handles login and logout.
pub trait CredentialProvider: Send + Sync {
    /// Current token, `None` when nobody is signed in
    fn access_token(&self) -> Result<Option<String>, CredentialError>;
}

impl<F> CredentialProvider for F
where
    F: Fn() -> Result<Option<String>, CredentialError> + Send + Sync,
{
    fn access_token(&self) -> Result<Option<String>, CredentialError> {
        self()
    }
}

/// Process-local token store.
///
/// Clones share the same slot, so the login flow can hold one clone and the
/// client another.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCredentials {
    token: Arc<RwLock<Option<String>>>,
}

impl InMemoryCredentials {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `token`
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token.into()))),
        }
    }

    /// Replace the stored token
    pub fn set(&self, token: impl Into<String>) -> Result<(), CredentialError> {
        let mut slot = self.token.write().map_err(|_| poisoned())?;
        *slot = Some(token.into());
        Ok(())
    }

    /// Remove the stored token
    pub fn clear(&self) -> Result<(), CredentialError> {
        let mut slot = self.token.write().map_err(|_| poisoned())?;
        *slot = None;
        Ok(())
    }
}

impl CredentialProvider for InMemoryCredentials {
    fn access_token(&self) -> Result<Option<String>, CredentialError> {
        let slot = self.token.read().map_err(|_| poisoned())?;
        Ok(slot.clone())
    }
}

fn poisoned() -> CredentialError {
    CredentialError::Unavailable("in-memory credential store lock poisoned".into())
}

/// Reads the token from the browser's `localStorage`
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Debug)]
pub struct LocalStorageCredentials {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageCredentials {
    /// Read the token stored under `key`
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Storage key this provider reads
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorageCredentials {
    fn default() -> Self {
        Self::new(super::ACCESS_TOKEN_KEY)
    }
}

#[cfg(target_arch = "wasm32")]
impl CredentialProvider for LocalStorageCredentials {
    fn access_token(&self) -> Result<Option<String>, CredentialError> {
        let window = web_sys::window()
            .ok_or_else(|| CredentialError::Unavailable("no window object".into()))?;
        let storage = window
            .local_storage()
            .map_err(|err| CredentialError::Unavailable(format!("{err:?}")))?
            .ok_or_else(|| CredentialError::Unavailable("localStorage is disabled".into()))?;

        storage
            .get_item(&self.key)
            .map_err(|err| CredentialError::Read {
                key: self.key.clone(),
                reason: format!("{err:?}"),
            })
    }
}
