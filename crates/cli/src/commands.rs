//! CLI commands

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use cms_http::client::Method;
use cms_http::{ApiClient, ClientConfig, InMemoryCredentials};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Send a GET request
    Get {
        /// Path under the base path, e.g. /v1/courses
        path: String,
    },

    /// Send a DELETE request
    Delete {
        /// Path under the base path
        path: String,
    },

    /// Send a POST request
    Post {
        /// Path under the base path
        path: String,

        /// JSON body, or @FILE to read it from a file
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Send a PUT request
    Put {
        /// Path under the base path
        path: String,

        /// JSON body, or @FILE to read it from a file
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Send a PATCH request
    Patch {
        /// Path under the base path
        path: String,

        /// JSON body, or @FILE to read it from a file
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Inspect or generate client configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,

    /// Write a default configuration file
    Init {
        /// Output file path (defaults to the user config directory)
        output: Option<PathBuf>,
    },
}

impl Commands {
    /// Execute the command against the given configuration
    pub async fn execute(self, client_config: ClientConfig, token: Option<String>) -> Result<()> {
        let (method, path, data) = match self {
            Self::Get { path } => (Method::GET, path, None),
            Self::Delete { path } => (Method::DELETE, path, None),
            Self::Post { path, data } => (Method::POST, path, data),
            Self::Put { path, data } => (Method::PUT, path, data),
            Self::Patch { path, data } => (Method::PATCH, path, data),
            Self::Config { command } => return command.execute(&client_config),
        };

        let credentials = match token {
            Some(token) => InMemoryCredentials::with_token(token),
            None => InMemoryCredentials::new(),
        };
        let client = ApiClient::builder()
            .config(client_config)
            .credentials(credentials)
            .build()?;

        let mut request = client.request(method, &path);
        if let Some(data) = data {
            request = request.json(&parse_body(&data)?);
        }

        let response = client.send(request).await?;
        info!(status = response.status().as_u16(), "{}", client.url(&path));

        let body = response.text().await?;
        println!("{}", render_body(&body));
        Ok(())
    }
}

impl ConfigCommands {
    fn execute(self, client_config: &ClientConfig) -> Result<()> {
        match self {
            Self::Show => {
                print!("{}", config::render_config(client_config)?);
            }
            Self::Init { output } => {
                let Some(path) = output.or_else(config::default_config_path) else {
                    bail!("no config directory available, pass an output path");
                };
                if path.exists() {
                    bail!("{} already exists", path.display());
                }
                config::generate_default_config(&path)?;
                println!("Wrote {}", path.display());
            }
        }
        Ok(())
    }
}

/// Parse a `--data` argument as JSON, reading `@FILE` arguments from disk
fn parse_body(data: &str) -> Result<Value> {
    let raw = match data.strip_prefix('@') {
        Some(file) => std::fs::read_to_string(file)
            .with_context(|| format!("failed to read request body from {file}"))?,
        None => data.to_string(),
    };
    serde_json::from_str(&raw).context("request body is not valid JSON")
}

/// Pretty-print JSON bodies, pass anything else through
fn render_body(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inline_body() {
        let value = parse_body(r#"{"name":"Algebra"}"#).unwrap();
        assert_eq!(value["name"], "Algebra");
    }

    #[test]
    fn test_parse_body_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("body.json");
        std::fs::write(&file, r#"{"credits": 3}"#).unwrap();

        let value = parse_body(&format!("@{}", file.display())).unwrap();
        assert_eq!(value["credits"], 3);
    }

    #[test]
    fn test_parse_body_rejects_invalid_json() {
        assert!(parse_body("not json").is_err());
    }

    #[test]
    fn test_render_body() {
        assert_eq!(render_body(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
        assert_eq!(render_body("plain"), "plain");
    }
}
