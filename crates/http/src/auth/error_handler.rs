//! Auth failure handling
//!
//! The response hook reports 401 answers here. What happens next (sending
//! the user to a login view, refreshing the token) belongs to the
//! application, which plugs in its own handler.

use crate::client::error::ClientError;
use std::fmt;
use std::sync::Arc;

/// Notified once for every request the server rejected with 401
pub trait AuthFailureHandler: Send + Sync {
    fn on_unauthorized(&self, error: &ClientError);
}

/// Default handler: reports the failure on the error log and does nothing else
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAuthFailure;

impl AuthFailureHandler for LogAuthFailure {
    fn on_unauthorized(&self, error: &ClientError) {
        tracing::error!(%error, "Request unauthorized, re-authentication required");
    }
}

/// Handler backed by an application callback
#[derive(Clone)]
pub struct CallbackAuthFailure {
    callback: Arc<dyn Fn(&ClientError) + Send + Sync>,
}

impl CallbackAuthFailure {
    pub fn new(callback: impl Fn(&ClientError) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }
}

impl fmt::Debug for CallbackAuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackAuthFailure").finish_non_exhaustive()
    }
}

impl AuthFailureHandler for CallbackAuthFailure {
    fn on_unauthorized(&self, error: &ClientError) {
        (self.callback)(error);
    }
}
