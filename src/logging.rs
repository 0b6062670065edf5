// ABOUTME: Structured logging setup built on tracing-subscriber
// ABOUTME: Level comes from configuration; RUST_LOG overrides when present
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 BookIt Contributors

//! Production logging configuration with structured output

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::environment::LoggingConfig;
use crate::errors::{AppError, AppResult};

/// Log output format options
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    /// JSON format for production logging
    Json,
    /// Compact format for development
    Compact,
}

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level so operators can
/// raise verbosity per-module without redeploying.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed
pub fn init(config: &LoggingConfig, format: LogFormat) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let builder = fmt().with_env_filter(filter).with_target(true);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    result.map_err(|e| AppError::config(format!("failed to initialize logging: {e}")))
}

/// Initialize logging from configuration, picking JSON output in production
///
/// # Errors
///
/// Returns an error if a subscriber is already installed
pub fn init_from_config(config: &LoggingConfig) -> AppResult<()> {
    let format = if std::env::var("ENVIRONMENT").as_deref() == Ok("production") {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    init(config, format)
}
