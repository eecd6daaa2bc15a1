//! Authentication seams used by the client hooks
//!
//! The client never owns the token lifecycle or the re-authentication
//! policy. Both are injected: a [`CredentialProvider`] supplies the bearer
//! token, an [`AuthFailureHandler`] is told when the server answers 401.

pub mod credentials;
pub mod error_handler;

pub use credentials::{CredentialError, CredentialProvider, InMemoryCredentials};
#[cfg(target_arch = "wasm32")]
pub use credentials::LocalStorageCredentials;
pub use error_handler::{AuthFailureHandler, CallbackAuthFailure, LogAuthFailure};

/// Storage key the access token is kept under
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
