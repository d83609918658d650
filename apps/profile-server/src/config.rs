// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup. Invalid
//! values abort startup with a [`ConfigError`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding `profiles.redb` | `./data` |
//! | `AUTH_MS_BASE_URL` | Identity authority base URL | Required |
//! | `AUTH_MS_TIMEOUT_SECS` | Overall timeout of one identity lookup | `30` |
//! | `AUTH_MS_MAX_ATTEMPTS` | Attempts for the identity `GET` | `3` |
//! | `AUTH_MS_BACKOFF_SECS` | Backoff base, doubled per retry | `2` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::auth::RetryPolicy;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Directory for the embedded database file.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Base URL of the identity authority. `{base}/me/` must resolve the
/// bearer token of the current request.
pub const AUTH_MS_BASE_URL_ENV: &str = "AUTH_MS_BASE_URL";
pub const AUTH_MS_TIMEOUT_SECS_ENV: &str = "AUTH_MS_TIMEOUT_SECS";
pub const AUTH_MS_MAX_ATTEMPTS_ENV: &str = "AUTH_MS_MAX_ATTEMPTS";
pub const AUTH_MS_BACKOFF_SECS_ENV: &str = "AUTH_MS_BACKOFF_SECS";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// File name of the database inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "profiles.redb";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err("expected `json` or `pretty`".to_string()),
        }
    }
}

/// Connection settings for the identity authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityConfig {
    /// Fully resolved `{base}/me/` endpoint.
    pub me_url: Url,
    /// Upper bound for one lookup, retries included.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl AuthorityConfig {
    /// Settings for the authority at `base_url`, with default timeout and
    /// retry policy.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            var: AUTH_MS_BASE_URL_ENV,
            value: base_url.to_string(),
            reason,
        };

        let mut base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https".to_string()));
        }
        // `Url::join` replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let me_url = base.join("me/").map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            me_url,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        })
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub authority: AuthorityConfig,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host: IpAddr = parse_or(&lookup, HOST_ENV, DEFAULT_HOST.parse().ok())?;
        let port: u16 = parse_or(&lookup, PORT_ENV, Some(DEFAULT_PORT))?;
        let data_dir = lookup(DATA_DIR_ENV)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let base_url = lookup(AUTH_MS_BASE_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing(AUTH_MS_BASE_URL_ENV))?;
        let mut authority = AuthorityConfig::new(base_url.trim())?;

        let timeout_secs: u64 = parse_or(&lookup, AUTH_MS_TIMEOUT_SECS_ENV, Some(30))?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: AUTH_MS_TIMEOUT_SECS_ENV,
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        authority.timeout = Duration::from_secs(timeout_secs);

        let max_attempts: u32 = parse_or(&lookup, AUTH_MS_MAX_ATTEMPTS_ENV, Some(3))?;
        let backoff_secs: u64 = parse_or(&lookup, AUTH_MS_BACKOFF_SECS_ENV, Some(2))?;
        authority.retry = RetryPolicy::new(max_attempts, Duration::from_secs(backoff_secs));

        let log_format: LogFormat = parse_or(&lookup, LOG_FORMAT_ENV, Some(LogFormat::Pretty))?;

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            data_dir,
            authority,
            log_format,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

/// Parse `var` if set, otherwise fall back to `default`.
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var).filter(|value| !value.trim().is_empty()) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value,
            reason: e.to_string(),
        }),
        None => default.ok_or(ConfigError::Missing(var)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config =
            Config::from_lookup(lookup(&[(AUTH_MS_BASE_URL_ENV, "http://auth:8000")])).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.database_path(), PathBuf::from("./data/profiles.redb"));
        assert_eq!(config.authority.me_url.as_str(), "http://auth:8000/me/");
        assert_eq!(config.authority.timeout, Duration::from_secs(30));
        assert_eq!(config.authority.retry, RetryPolicy::default());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn base_url_is_required() {
        assert_eq!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::Missing(AUTH_MS_BASE_URL_ENV))
        );
    }

    #[test]
    fn base_path_is_kept() {
        let authority = AuthorityConfig::new("https://example.com/api/auth").unwrap();
        assert_eq!(authority.me_url.as_str(), "https://example.com/api/auth/me/");

        let authority = AuthorityConfig::new("https://example.com/api/auth/").unwrap();
        assert_eq!(authority.me_url.as_str(), "https://example.com/api/auth/me/");
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            (AUTH_MS_BASE_URL_ENV, "http://auth:8000"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (DATA_DIR_ENV, "/var/lib/profiles"),
            (AUTH_MS_TIMEOUT_SECS_ENV, "5"),
            (AUTH_MS_MAX_ATTEMPTS_ENV, "1"),
            (AUTH_MS_BACKOFF_SECS_ENV, "0"),
            (LOG_FORMAT_ENV, "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/profiles"));
        assert_eq!(config.authority.timeout, Duration::from_secs(5));
        assert_eq!(config.authority.retry, RetryPolicy::new(1, Duration::ZERO));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_fail() {
        for (var, value) in [
            (PORT_ENV, "eighty"),
            (HOST_ENV, "not a host"),
            (AUTH_MS_TIMEOUT_SECS_ENV, "0"),
            (LOG_FORMAT_ENV, "xml"),
            (AUTH_MS_BASE_URL_ENV, "ftp://auth"),
        ] {
            let mut vars = vec![(AUTH_MS_BASE_URL_ENV, "http://auth:8000")];
            vars.push((var, value));
            let result = Config::from_lookup(lookup(&vars));
            assert!(
                matches!(result, Err(ConfigError::Invalid { .. })),
                "{var}={value} should be rejected, got {result:?}"
            );
        }
    }
}
