//! Client configuration

use super::ClientError;
use crate::auth::ACCESS_TOKEN_KEY;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Path prefix every request is issued under
pub const DEFAULT_BASE_PATH: &str = "/api";

/// Content type sent when a request does not set its own
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Settings for an [`ApiClient`](super::ApiClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme and host the base path is resolved against.
    ///
    /// Inside a browser this may be left unset, the page origin is used.
    pub origin: Option<String>,
    /// Path prefix joined in front of every request path
    pub base_path: String,
    /// Headers added to a request unless it already carries them
    pub default_headers: BTreeMap<String, String>,
    /// Storage key the access token is read from
    pub credential_key: String,
    /// Whole-request timeout in seconds (ignored on wasm)
    pub timeout_secs: Option<u64>,
    /// User agent override
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let mut default_headers = BTreeMap::new();
        default_headers.insert(
            CONTENT_TYPE.as_str().to_string(),
            DEFAULT_CONTENT_TYPE.to_string(),
        );

        Self {
            origin: None,
            base_path: DEFAULT_BASE_PATH.to_string(),
            default_headers,
            credential_key: ACCESS_TOKEN_KEY.to_string(),
            timeout_secs: None,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Config pointing at `origin` with every other field defaulted
    pub fn with_origin(origin: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            ..Self::default()
        }
    }

    /// Load configuration from a file, with `CMS__*` environment overrides
    ///
    /// Header names are lowercased so file and environment entries replace
    /// the defaults regardless of how they are spelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ClientError> {
        Self::load_with_env(
            path.as_ref(),
            config::Environment::with_prefix("CMS")
                .separator("__")
                .try_parsing(true),
        )
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn load_with_env(
        path: &std::path::Path,
        env: config::Environment,
    ) -> Result<Self, ClientError> {
        use config::{Config, File};

        // Headers are seeded after merging, otherwise a differently cased
        // key from the file would sit next to the default instead of replacing it.
        let defaults = Self {
            default_headers: BTreeMap::new(),
            ..Self::default()
        };

        let settings = Config::builder()
            .add_source(Config::try_from(&defaults).map_err(config_error)?)
            .add_source(File::from(path))
            .add_source(env)
            .build()
            .map_err(config_error)?;

        let mut config: Self = settings.try_deserialize().map_err(config_error)?;
        config.default_headers = config
            .default_headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        config
            .default_headers
            .entry(CONTENT_TYPE.as_str().to_string())
            .or_insert_with(|| DEFAULT_CONTENT_TYPE.to_string());

        config.validate()?;
        Ok(config)
    }

    /// Check the settings before a client is built from them
    pub fn validate(&self) -> Result<(), ClientError> {
        if !self.base_path.starts_with('/') {
            return Err(ClientError::Configuration(format!(
                "base_path must start with '/': {:?}",
                self.base_path
            )));
        }

        if self.credential_key.trim().is_empty() {
            return Err(ClientError::Configuration(
                "credential_key must not be empty".into(),
            ));
        }

        if let Some(origin) = &self.origin {
            let url = reqwest::Url::parse(origin).map_err(|e| {
                ClientError::Configuration(format!("invalid origin {origin:?}: {e}"))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ClientError::Configuration(format!(
                    "origin must use http or https: {origin:?}"
                )));
            }
        }

        self.header_map().map(|_| ())
    }

    /// Default headers as a typed header map, `content-type` included
    pub fn header_map(&self) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::with_capacity(self.default_headers.len());
        for (name, value) in &self.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ClientError::Configuration(format!("invalid header name {name:?}: {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ClientError::Configuration(format!("invalid value for header {name}: {e}"))
            })?;
            headers.insert(name, value);
        }
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        }
        Ok(headers)
    }

    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Absolute URL every request path is appended to
    pub fn base_url(&self) -> Result<String, ClientError> {
        let origin = match &self.origin {
            Some(origin) => origin.clone(),
            None => page_origin()?,
        };

        Ok(format!(
            "{}{}",
            origin.trim_end_matches('/'),
            self.base_path.trim_end_matches('/')
        ))
    }
}

#[cfg(target_arch = "wasm32")]
fn page_origin() -> Result<String, ClientError> {
    web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .ok_or_else(|| ClientError::Configuration("unable to read the page origin".into()))
}

#[cfg(not(target_arch = "wasm32"))]
fn page_origin() -> Result<String, ClientError> {
    Err(ClientError::Configuration(
        "origin is required outside the browser".into(),
    ))
}

#[cfg(not(target_arch = "wasm32"))]
fn config_error(err: config::ConfigError) -> ClientError {
    ClientError::Configuration(err.to_string())
}
