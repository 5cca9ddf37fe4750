// ABOUTME: Logging configuration and structured logging setup for observability
// ABOUTME: Configures log levels, formatters, and env-filter based noise control
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Structured logging configuration
//!
//! Wraps `tracing-subscriber` initialization: level from `RUST_LOG` (falling
//! back to the configured level), output format from `LOG_FORMAT`.

use std::env;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level applied when `RUST_LOG` is not set
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Human-readable format for development
    Full,
    /// Compact format for space-constrained environments
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Full,
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let level = LogLevel::from_str_or_default(
            &env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned()),
        );

        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Full,
        };

        Self { level, format }
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed.
    pub fn init(&self) -> Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string()));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true);

        match self.format {
            LogFormat::Json => builder
                .json()
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}")),
            LogFormat::Compact => builder
                .compact()
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}")),
            LogFormat::Full => builder
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}")),
        }
    }
}
