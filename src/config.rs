use std::env;

use thiserror::Error;
use url::Url;

use crate::models::ContainerExtension;

/// Configuration errors raised while reading the environment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub public_base_url: Option<String>,
    pub server_timezone: String,

    // Upstream sources
    pub user_directory_url: String,
    pub playlist_url: String,
    pub upstream_token: String,
    pub auxiliary_proxy_host: Option<String>,

    // Parsing
    pub container_extension: ContainerExtension,
    pub retain_player_options: bool,

    // Responses
    pub expired_message: String,

    // HTTP client
    pub fetch_timeout_ms: u64,
    pub user_agent: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                reason: format!("'{}' is not a port number", raw),
            })?,
            None => 3001,
        };

        let user_directory_url = required_url(get("USER_DIRECTORY_URL"), "USER_DIRECTORY_URL")?;
        let playlist_url = required_url(get("PLAYLIST_URL"), "PLAYLIST_URL")?;
        let upstream_token = get("UPSTREAM_TOKEN").ok_or(ConfigError::Missing("UPSTREAM_TOKEN"))?;

        let auxiliary_proxy_host = get("AUX_PROXY_HOST")
            .map(|v| origin(&v, "AUX_PROXY_HOST"))
            .transpose()?;
        let public_base_url = get("PUBLIC_BASE_URL")
            .map(|v| origin(&v, "PUBLIC_BASE_URL"))
            .transpose()?;

        let container_extension = match get("CONTAINER_EXTENSION") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                name: "CONTAINER_EXTENSION",
                reason,
            })?,
            None => ContainerExtension::default(),
        };

        let retain_player_options = match get("RETAIN_PLAYER_OPTIONS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "RETAIN_PLAYER_OPTIONS",
                reason: format!("'{}' is not a boolean", raw),
            })?,
            None => true,
        };

        Ok(Self {
            port,
            public_base_url,
            server_timezone: get("SERVER_TIMEZONE").unwrap_or_else(|| "Europe/Istanbul".to_string()),

            user_directory_url,
            playlist_url,
            upstream_token,
            auxiliary_proxy_host,

            container_extension,
            retain_player_options,

            expired_message: get("EXPIRED_MESSAGE")
                .unwrap_or_else(|| "Subscription expired".to_string()),

            fetch_timeout_ms: get("FETCH_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30_000), // 30 seconds

            // Use VLC user agent to avoid IPTV server blocks
            user_agent: get("USER_AGENT")
                .unwrap_or_else(|| "VLC/3.0.20 LibVLC/3.0.20".to_string()),
        })
    }
}

fn required_url(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    let value = value.ok_or(ConfigError::Missing(name))?;
    validate_http_url(&value, name)?;
    Ok(value)
}

/// Normalize an origin-like setting: must be http(s), trailing slashes removed
fn origin(value: &str, name: &'static str) -> Result<String, ConfigError> {
    validate_http_url(value, name)?;
    Ok(value.trim_end_matches('/').to_string())
}

fn validate_http_url(value: &str, name: &'static str) -> Result<(), ConfigError> {
    let parsed = Url::parse(value).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
