//! Configuration
//!
//! Command-line flags with environment fallbacks, validated once at startup
//! into an immutable `SyncConfig`. Nothing is reloaded at runtime.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use reqwest::Url;
use tracing::Level;

use crate::auth::AuthType;
use crate::error::ConfigError;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// mc-router-sync - keeps mc-router routes in sync with a server list API
#[derive(Parser, Debug, Clone)]
#[command(name = "mc-router-sync", version, about)]
pub struct Args {
    /// mc-router API host (e.g. http://localhost:8000)
    #[arg(long, env = "MC_ROUTER_HOST")]
    pub mc_router_host: String,

    /// Server list API endpoint (e.g. http://localhost:3000/api/servers)
    #[arg(long, env = "SERVER_LIST_API")]
    pub server_list_api: String,

    /// Authentication type for the server list API
    #[arg(long, value_enum, default_value_t = AuthType::None, env = "AUTH_TYPE")]
    pub auth_type: AuthType,

    /// Bearer token used when auth-type is apikey
    #[arg(long = "auth-token", env = "API_KEY", hide_env_values = true, default_value = "")]
    pub api_key: String,

    /// Send the same credentials to mc-router
    #[arg(long, env = "MC_ROUTER_AUTH")]
    pub mc_router_auth: bool,

    /// Sync interval in seconds
    #[arg(long, default_value = "30", env = "SYNC_INTERVAL")]
    pub sync_interval: u64,

    /// Timeout for each outbound request in seconds
    #[arg(long, default_value = "15", env = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    /// Bind address of the health endpoint
    #[arg(long, default_value = "0.0.0.0:8080", env = "HEALTH_ADDR")]
    pub health_addr: SocketAddr,

    /// Lowest log level to emit (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "json", env = "LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Run a single reconciliation pass and exit
    #[arg(long, default_value = "false")]
    pub once: bool,

    /// Log planned actions without applying them
    #[arg(long, default_value = "false", env = "DRY_RUN")]
    pub dry_run: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub mc_router_host: Url,
    pub server_list_api: Url,
    pub auth_type: AuthType,
    pub api_key: String,
    pub mc_router_auth: bool,
    pub sync_interval: Duration,
    pub request_timeout: Duration,
    pub health_addr: SocketAddr,
    pub log_level: Level,
    pub log_format: LogFormat,
    pub once: bool,
    pub dry_run: bool,
}

impl Args {
    /// Validate flags into a `SyncConfig`
    pub fn into_config(self) -> Result<SyncConfig, ConfigError> {
        let mc_router_host = parse_http_url("mc-router-host", &self.mc_router_host)?;
        let server_list_api = parse_http_url("server-list-api", &self.server_list_api)?;

        if self.auth_type == AuthType::ApiKey && self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey(self.auth_type));
        }

        if self.sync_interval == 0 {
            return Err(ConfigError::ZeroDuration("sync-interval"));
        }
        if self.request_timeout == 0 {
            return Err(ConfigError::ZeroDuration("request-timeout"));
        }

        Ok(SyncConfig {
            mc_router_host,
            server_list_api,
            auth_type: self.auth_type,
            api_key: self.api_key,
            mc_router_auth: self.mc_router_auth,
            sync_interval: Duration::from_secs(self.sync_interval),
            request_timeout: Duration::from_secs(self.request_timeout),
            health_addr: self.health_addr,
            log_level: resolve_log_level(&self.log_level),
            log_format: self.log_format,
            once: self.once,
            dry_run: self.dry_run,
        })
    }
}

fn parse_http_url(flag: &'static str, value: &str) -> Result<Url, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidUrl {
            flag,
            reason: "required".to_string(),
        });
    }

    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        flag,
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl {
            flag,
            reason: format!("unsupported scheme {}", other),
        }),
    }
}

/// Unknown levels fall back to info
pub fn resolve_log_level(level: &str) -> Level {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
