// ABOUTME: Environment-based configuration with typed sub-structs and validation
// ABOUTME: Built once in main and threaded through constructors; no globals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

//! # Server Configuration
//!
//! Environment-only configuration. [`ServerConfig::from_env`] reads every
//! setting with a development-friendly default, except the JWT secret, which
//! has no safe default and must be provided.

use std::env;

use crate::errors::{AppError, AppResult};

/// Default HTTP port for the API server
const DEFAULT_HTTP_PORT: u16 = 8081;
/// Default SQLite database location
const DEFAULT_DATABASE_URL: &str = "sqlite:./data/bookit.db";
/// Default access-token lifetime in minutes
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh-token lifetime in minutes (7 days)
const DEFAULT_REFRESH_EXPIRY_MINS: i64 = 7 * 24 * 60;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection URL, e.g. `sqlite:./data/bookit.db` or `sqlite::memory:`
    pub url: String,
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Process-wide HS256 signing secret
    pub jwt_secret: String,
    /// Access-token lifetime in minutes
    pub access_expiry_mins: i64,
    /// Refresh-token lifetime in minutes
    pub refresh_expiry_mins: i64,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
}

/// Complete server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP bind host
    pub http_host: String,
    /// HTTP bind port
    pub http_port: u16,
    /// Database settings
    pub database: DatabaseConfig,
    /// Authentication settings
    pub auth: AuthConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or any numeric variable
    /// fails to parse
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            http_host: env_or("HTTP_HOST", "0.0.0.0"),
            http_port: parse_env("HTTP_PORT", DEFAULT_HTTP_PORT)?,
            database: DatabaseConfig {
                url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET").map_err(|_| {
                    AppError::config("JWT_SECRET must be set; there is no safe default")
                })?,
                access_expiry_mins: parse_env(
                    "ACCESS_TOKEN_EXPIRE_MINUTES",
                    DEFAULT_ACCESS_EXPIRY_MINS,
                )?,
                refresh_expiry_mins: parse_env(
                    "REFRESH_TOKEN_EXPIRE_MINUTES",
                    DEFAULT_REFRESH_EXPIRY_MINS,
                )?,
            },
            logging: LoggingConfig {
                level: env_or("LOG_LEVEL", "info"),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns an error for a weak secret or non-positive token lifetimes
    pub fn validate(&self) -> AppResult<()> {
        if self.auth.jwt_secret.len() < 32 {
            return Err(AppError::config(
                "JWT_SECRET must be at least 32 characters",
            ));
        }
        if self.auth.access_expiry_mins <= 0 || self.auth.refresh_expiry_mins <= 0 {
            return Err(AppError::config("token lifetimes must be positive"));
        }
        if self.auth.refresh_expiry_mins <= self.auth.access_expiry_mins {
            return Err(AppError::config(
                "refresh-token lifetime must exceed access-token lifetime",
            ));
        }
        Ok(())
    }

    /// One-line startup summary; never includes the secret
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "http={}:{} database={} access_expiry={}m refresh_expiry={}m log={}",
            self.http_host,
            self.http_port,
            self.database.url,
            self.auth.access_expiry_mins,
            self.auth.refresh_expiry_mins,
            self.logging.level
        )
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| AppError::config(format!("{key} has an invalid value: {value}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ServerConfig {
        ServerConfig {
            http_host: "127.0.0.1".into(),
            http_port: 8081,
            database: DatabaseConfig {
                url: "sqlite::memory:".into(),
            },
            auth: AuthConfig {
                jwt_secret: "0123456789abcdef0123456789abcdef".into(),
                access_expiry_mins: 15,
                refresh_expiry_mins: 10_080,
            },
            logging: LoggingConfig {
                level: "info".into(),
            },
        }
    }

    #[test]
    fn test_validate_accepts_sane_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let mut config = base_config();
        config.auth.jwt_secret = "short".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_lifetimes() {
        let mut config = base_config();
        config.auth.refresh_expiry_mins = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_omits_secret() {
        let config = base_config();
        assert!(!config.summary().contains(&config.auth.jwt_secret));
    }
}
