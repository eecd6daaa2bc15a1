//! CMS CLI - send requests to the CMS API through the shared client

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use tracing::{Level, error};

#[derive(Parser)]
#[command(name = "cms")]
#[command(about = "Talk to the CMS API from the command line")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: LogLevel,

    /// Client configuration file (TOML or YAML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Origin the /api base path is resolved against
    #[arg(short = 'o', long, global = true, env = "CMS_ORIGIN")]
    origin: Option<String>,

    /// Access token sent as a bearer credential
    #[arg(long, global = true, env = "CMS_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.into())?;

    let mut client_config = config::load_client_config(cli.config.as_deref())?;
    if let Some(origin) = cli.origin {
        client_config.origin = Some(origin);
    }
    match cli.timeout {
        Some(0) => client_config.timeout_secs = None,
        Some(secs) => client_config.timeout_secs = Some(secs),
        None => {}
    }

    if let Err(e) = cli.command.execute(client_config, cli.token).await {
        error!("Command failed: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
