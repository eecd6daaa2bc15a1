//! CMS API client
//!
//! [`ApiClient`] is the one handle the application uses to talk to the CMS
//! backend. It joins every path under the configured base path (`/api` by
//! default), fills in default headers, attaches the stored bearer token and
//! reports 401 answers to an [`AuthFailureHandler`]. Construct it once and
//! clone it into whatever needs it; clones share the connection pool and
//! hooks.

pub mod config;
pub mod envelope;
pub mod error;
pub mod interceptor;

pub use config::ClientConfig;
pub use envelope::ApiResponse;
pub use error::ClientError;
pub use interceptor::{
    BearerTokenInterceptor, Interceptors, RequestInterceptor, ResponseInterceptor,
    UnauthorizedInterceptor,
};

pub use reqwest::{Method, StatusCode};

use crate::auth::{AuthFailureHandler, CredentialProvider, LogAuthFailure};
use reqwest::header::{Entry, HeaderMap};
use reqwest::{Client, ClientBuilder, Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = concat!("cms-http/", env!("CARGO_PKG_VERSION"));

/// CMS API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    default_headers: Arc<HeaderMap>,
    interceptors: Arc<Interceptors>,
}

impl ApiClient {
    /// Create a client from configuration with the default hooks
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        Self::builder().config(config).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the resolved base URL (origin plus base path)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers filled in on requests that do not set them
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Absolute URL for a path relative to the base path.
    ///
    /// Paths are always joined under the base path. An absolute URL passed
    /// here is not followed; [`prepare`](Self::prepare) rejects the result.
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Create a request builder for a path under the base path
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.request(Method::DELETE, path)
    }

    /// Build the request and run the request hooks on it without sending.
    pub fn prepare(&self, request: RequestBuilder) -> Result<Request, ClientError> {
        let mut request = request.build()?;

        if request.url().path().contains("://") {
            return Err(ClientError::Configuration(format!(
                "request path must be relative to {}: {}",
                self.base_url,
                request.url()
            )));
        }

        for (name, value) in self.default_headers.iter() {
            if let Entry::Vacant(entry) = request.headers_mut().entry(name) {
                entry.insert(value.clone());
            }
        }

        self.interceptors.apply_request(&mut request)?;
        Ok(request)
    }

    /// Send a request through the hooks.
    ///
    /// Non-2xx answers are turned into errors. Both successes and failures
    /// are shown to the response hooks and then returned unchanged.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let request = self.prepare(request)?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(%method, %url, "sending request");

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                let error = ClientError::Request(err);
                tracing::debug!(%method, %url, %error, "request failed before a response");
                self.interceptors.observe_error(&error);
                return Err(error);
            }
        };

        let status = response.status();
        if status.is_success() {
            self.interceptors.observe_response(&response);
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = envelope::error_message(&body).unwrap_or_else(|| status.to_string());
        let error = ClientError::from_status(status, message);
        tracing::debug!(%method, %url, status = status.as_u16(), "server returned an error");
        self.interceptors.observe_error(&error);
        Err(error)
    }

    /// Execute a request and decode the JSON body
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// Execute a request and unwrap the `data` of the response envelope
    pub async fn execute_envelope<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        self.execute::<ApiResponse<T>>(request).await?.into_data()
    }

    /// Execute a request whose envelope carries no payload, returning its message
    pub async fn execute_ack(&self, request: RequestBuilder) -> Result<Option<String>, ClientError> {
        self.execute::<ApiResponse<serde_json::Value>>(request)
            .await?
            .into_message()
    }
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    config: ClientConfig,
    #[cfg(not(target_arch = "wasm32"))]
    timeout: Option<Duration>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    auth_failure: Option<Arc<dyn AuthFailureHandler>>,
    extra: Interceptors,
}

impl ApiClientBuilder {
    /// Replace the whole configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the origin the base path is resolved against
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.config.origin = Some(origin.into());
        self
    }

    /// Set the base path
    pub fn base_path(mut self, path: impl Into<String>) -> Self {
        self.config.base_path = path.into();
        self
    }

    /// Add or replace a default header
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .default_headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Set the request timeout
    #[cfg(not(target_arch = "wasm32"))]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(agent.into());
        self
    }

    /// Source of the bearer token
    pub fn credentials(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.credentials = Some(Arc::new(provider));
        self
    }

    /// Handler told about 401 answers (defaults to [`LogAuthFailure`])
    pub fn auth_failure_handler(mut self, handler: impl AuthFailureHandler + 'static) -> Self {
        self.auth_failure = Some(Arc::new(handler));
        self
    }

    /// Extra request hook, run after the bearer token hook
    pub fn request_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.extra.add_request(interceptor);
        self
    }

    /// Extra response hook, run after the unauthorized hook
    pub fn response_interceptor(
        mut self,
        interceptor: impl ResponseInterceptor + 'static,
    ) -> Self {
        self.extra.add_response(interceptor);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        self.config.validate()?;
        let base_url = self.config.base_url()?;
        let default_headers = self.config.header_map()?;

        let user_agent = self
            .config
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        #[cfg(not(target_arch = "wasm32"))]
        let client = {
            let mut builder = ClientBuilder::new().user_agent(user_agent);
            if let Some(timeout) = self.timeout.or_else(|| self.config.timeout()) {
                builder = builder.timeout(timeout);
            }
            builder.build()?
        };

        #[cfg(target_arch = "wasm32")]
        let client = ClientBuilder::new().user_agent(user_agent).build()?;

        let credentials = self
            .credentials
            .unwrap_or_else(|| default_credentials(&self.config));
        let auth_failure = self
            .auth_failure
            .unwrap_or_else(|| Arc::new(LogAuthFailure));

        let mut interceptors = Interceptors::new();
        interceptors.add_request(BearerTokenInterceptor::new(credentials));
        interceptors.add_response(UnauthorizedInterceptor::new(auth_failure));
        interceptors.extend(self.extra);

        tracing::debug!(%base_url, "api client configured");

        Ok(ApiClient {
            client,
            base_url,
            default_headers: Arc::new(default_headers),
            interceptors: Arc::new(interceptors),
        })
    }
}

#[cfg(target_arch = "wasm32")]
fn default_credentials(config: &ClientConfig) -> Arc<dyn CredentialProvider> {
    Arc::new(crate::auth::LocalStorageCredentials::new(
        config.credential_key.clone(),
    ))
}

#[cfg(not(target_arch = "wasm32"))]
fn default_credentials(_config: &ClientConfig) -> Arc<dyn CredentialProvider> {
    Arc::new(crate::auth::InMemoryCredentials::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CredentialError, InMemoryCredentials};
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

    fn client_with(credentials: InMemoryCredentials) -> ApiClient {
        ApiClient::builder()
            .origin("http://localhost:5173")
            .credentials(credentials)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_resolves_base_url() {
        let client = client_with(InMemoryCredentials::new());
        assert_eq!(client.base_url(), "http://localhost:5173/api");
        assert_eq!(client.url("/courses"), "http://localhost:5173/api/courses");
        assert_eq!(client.url("courses"), "http://localhost:5173/api/courses");
        assert_eq!(client.url(""), "http://localhost:5173/api");
    }

    #[test]
    fn test_builder_requires_origin_natively() {
        let result = ApiClient::builder().build();
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_prepare_adds_default_content_type() {
        let client = client_with(InMemoryCredentials::new());
        let request = client.prepare(client.get("/courses")).unwrap();
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_prepare_keeps_explicit_content_type() {
        let client = client_with(InMemoryCredentials::new());
        let request = client
            .prepare(
                client
                    .post("/files")
                    .header(CONTENT_TYPE, "text/plain")
                    .body("hello"),
            )
            .unwrap();
        assert_eq!(request.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(request.headers().get_all(CONTENT_TYPE).iter().count(), 1);
    }

    #[test]
    fn test_prepare_attaches_token_from_shared_store() {
        let store = InMemoryCredentials::new();
        let client = client_with(store.clone());

        let request = client.prepare(client.get("/users/me")).unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());

        store.set("abc").unwrap();
        let request = client.prepare(client.get("/users/me")).unwrap();
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer abc");
    }

    #[test]
    fn test_prepare_propagates_credential_failure() {
        let client = ApiClient::builder()
            .origin("http://localhost:5173")
            .credentials(|| -> Result<Option<String>, CredentialError> {
                Err(CredentialError::Unavailable("blocked".into()))
            })
            .build()
            .unwrap();

        let err = client.prepare(client.get("/courses")).unwrap_err();
        assert!(matches!(err, ClientError::Credential(_)));
    }

    #[test]
    fn test_prepare_rejects_absolute_path() {
        let client = client_with(InMemoryCredentials::with_token("T"));
        let err = client
            .prepare(client.get("http://other.example.com/v1/courses"))
            .unwrap_err();
        assert!(matches!(err, ClientError::Configuration(ref m) if m.contains("relative")));
    }

    #[test]
    fn test_prepare_allows_urls_in_query() {
        let client = client_with(InMemoryCredentials::new());
        let request = client
            .prepare(client.get("/v1/auth/login?redirect=http://localhost:5173/home"))
            .unwrap();
        assert_eq!(request.url().path(), "/api/v1/auth/login");
    }

    #[test]
    fn test_custom_default_header() {
        let client = ApiClient::builder()
            .origin("http://localhost:5173")
            .default_header("X-Client", "cms-web")
            .build()
            .unwrap();

        let request = client.prepare(client.get("/health")).unwrap();
        assert_eq!(request.headers()["x-client"], "cms-web");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
    }
}
