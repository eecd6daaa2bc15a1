//! Request and response hooks
//!
//! Hooks run inside [`ApiClient::send`](super::ApiClient::send): request hooks
//! immediately before the request goes out, response hooks as soon as the
//! outcome is known. Response hooks only observe. The outcome handed to
//! them is returned to the caller as-is.

use super::ClientError;
use crate::auth::{AuthFailureHandler, CredentialProvider};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Request, Response};
use std::sync::Arc;

/// Runs against every outgoing request
pub trait RequestInterceptor: Send + Sync {
    /// Adjust the request in place. An error aborts the call before anything
    /// is sent.
    fn intercept(&self, request: &mut Request) -> Result<(), ClientError>;
}

/// Observes every completed request
pub trait ResponseInterceptor: Send + Sync {
    fn on_response(&self, _response: &Response) {}

    fn on_error(&self, _error: &ClientError) {}
}

/// Ordered hook chains owned by a client
#[derive(Clone, Default)]
pub struct Interceptors {
    request: Vec<Arc<dyn RequestInterceptor>>,
    response: Vec<Arc<dyn ResponseInterceptor>>,
}

impl Interceptors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request hook; hooks run in registration order
    pub fn add_request(&mut self, interceptor: impl RequestInterceptor + 'static) {
        self.request.push(Arc::new(interceptor));
    }

    /// Append a response hook; hooks run in registration order
    pub fn add_response(&mut self, interceptor: impl ResponseInterceptor + 'static) {
        self.response.push(Arc::new(interceptor));
    }

    /// Append every hook of `other` after the existing ones
    pub fn extend(&mut self, other: Interceptors) {
        self.request.extend(other.request);
        self.response.extend(other.response);
    }

    pub(crate) fn apply_request(&self, request: &mut Request) -> Result<(), ClientError> {
        for interceptor in &self.request {
            interceptor.intercept(request)?;
        }
        Ok(())
    }

    pub(crate) fn observe_response(&self, response: &Response) {
        for interceptor in &self.response {
            interceptor.on_response(response);
        }
    }

    pub(crate) fn observe_error(&self, error: &ClientError) {
        for interceptor in &self.response {
            interceptor.on_error(error);
        }
    }

    pub fn request_len(&self) -> usize {
        self.request.len()
    }

    pub fn response_len(&self) -> usize {
        self.response.len()
    }
}

/// Sets `Authorization: Bearer <token>` when a token is stored
pub struct BearerTokenInterceptor {
    credentials: Arc<dyn CredentialProvider>,
}

impl BearerTokenInterceptor {
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Self {
        Self { credentials }
    }
}

impl RequestInterceptor for BearerTokenInterceptor {
    fn intercept(&self, request: &mut Request) -> Result<(), ClientError> {
        let Some(token) = self.credentials.access_token()? else {
            return Ok(());
        };
        if token.is_empty() {
            return Ok(());
        }

        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            ClientError::Configuration("stored access token is not a valid header value".into())
        })?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);

        tracing::debug!(url = %request.url(), "attached bearer token");
        Ok(())
    }
}

/// Hands 401 failures to an [`AuthFailureHandler`]
pub struct UnauthorizedInterceptor {
    handler: Arc<dyn AuthFailureHandler>,
}

impl UnauthorizedInterceptor {
    pub fn new(handler: Arc<dyn AuthFailureHandler>) -> Self {
        Self { handler }
    }
}

impl ResponseInterceptor for UnauthorizedInterceptor {
    fn on_error(&self, error: &ClientError) {
        if error.is_unauthorized() {
            self.handler.on_unauthorized(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CallbackAuthFailure, CredentialError, InMemoryCredentials};
    use reqwest::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request() -> Request {
        Request::new(
            Method::GET,
            reqwest::Url::parse("http://localhost/api/courses").unwrap(),
        )
    }

    fn counting_handler() -> (Arc<AtomicUsize>, Arc<dyn AuthFailureHandler>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let handler: Arc<dyn AuthFailureHandler> = Arc::new(CallbackAuthFailure::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));
        (calls, handler)
    }

    #[test]
    fn test_bearer_token_attached() {
        let hook = BearerTokenInterceptor::new(Arc::new(InMemoryCredentials::with_token("T")));
        let mut req = request();
        hook.intercept(&mut req).unwrap();
        assert_eq!(req.headers()[AUTHORIZATION], "Bearer T");
    }

    #[test]
    fn test_bearer_token_replaces_existing_header() {
        let hook = BearerTokenInterceptor::new(Arc::new(InMemoryCredentials::with_token("new")));
        let mut req = request();
        req.headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer old"));
        hook.intercept(&mut req).unwrap();
        assert_eq!(req.headers()[AUTHORIZATION], "Bearer new");
        assert_eq!(req.headers().get_all(AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn test_missing_token_leaves_headers_alone() {
        let hook = BearerTokenInterceptor::new(Arc::new(InMemoryCredentials::new()));
        let mut req = request();
        hook.intercept(&mut req).unwrap();
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_empty_token_leaves_headers_alone() {
        let hook = BearerTokenInterceptor::new(Arc::new(InMemoryCredentials::with_token("")));
        let mut req = request();
        hook.intercept(&mut req).unwrap();
        assert!(req.headers().is_empty());
    }

    #[test]
    fn test_credential_failure_propagates() {
        let provider = || -> Result<Option<String>, CredentialError> {
            Err(CredentialError::Unavailable("storage blocked".into()))
        };
        let hook = BearerTokenInterceptor::new(Arc::new(provider));
        let mut req = request();

        let err = hook.intercept(&mut req).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Credential(CredentialError::Unavailable(ref m)) if m == "storage blocked"
        ));
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_unauthorized_notifies_once() {
        let (calls, handler) = counting_handler();
        let hook = UnauthorizedInterceptor::new(handler);

        hook.on_error(&ClientError::AuthenticationFailed("expired".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_other_failures_do_not_notify() {
        let (calls, handler) = counting_handler();
        let hook = UnauthorizedInterceptor::new(handler);

        hook.on_error(&ClientError::Forbidden("no".into()));
        hook.on_error(&ClientError::ServerError {
            status: 500,
            message: "boom".into(),
        });
        hook.on_error(&ClientError::Configuration("bad".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_chain_stops_at_first_failure() {
        struct Fails;
        impl RequestInterceptor for Fails {
            fn intercept(&self, _request: &mut Request) -> Result<(), ClientError> {
                Err(ClientError::Configuration("stop".into()))
            }
        }

        let mut chain = Interceptors::new();
        chain.add_request(Fails);
        chain.add_request(BearerTokenInterceptor::new(Arc::new(
            InMemoryCredentials::with_token("T"),
        )));

        let mut req = request();
        assert!(chain.apply_request(&mut req).is_err());
        assert!(req.headers().get(AUTHORIZATION).is_none());
        assert_eq!(chain.request_len(), 2);
        assert_eq!(chain.response_len(), 0);
    }
}
