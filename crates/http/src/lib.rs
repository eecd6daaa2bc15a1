//! HTTP client for the CMS web frontend
//!
//! A single configured [`ApiClient`] issues every backend call under the
//! `/api` base path, attaches the stored bearer token and reports
//! unauthorized answers to a pluggable handler.

pub mod auth;
pub mod client;

pub use auth::{
    ACCESS_TOKEN_KEY, AuthFailureHandler, CallbackAuthFailure, CredentialError,
    CredentialProvider, InMemoryCredentials, LogAuthFailure,
};
pub use client::{ApiClient, ApiClientBuilder, ApiResponse, ClientConfig, ClientError};
