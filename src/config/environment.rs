// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles tracker credentials, LLM settings, query limits, and story-point field tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Environment-based configuration management
//!
//! All runtime configuration comes from environment variables. Tracker
//! credentials are required; the Gemini API key is optional — without it the
//! translation pipeline runs entirely on the rule-based fallback builder.

use std::env;

use tracing::{info, warn};
use url::Url;

use crate::constants::{cache, limits, tokens};
use crate::errors::{AppError, AppResult, ErrorCode};

/// Environment variable holding the tracker base URL
pub const TRACKER_BASE_URL_ENV: &str = "JIRA_BASE_URL";

/// Environment variable holding the tracker account email
pub const TRACKER_EMAIL_ENV: &str = "JIRA_EMAIL";

/// Environment variable holding the tracker API token
pub const TRACKER_API_TOKEN_ENV: &str = "JIRA_API_TOKEN";

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the story-point field priority list
pub const STORY_POINT_FIELDS_ENV: &str = "STORY_POINT_FIELDS";

/// Default Gemini model for JQL generation
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default story-point field priority order
///
/// Custom field numbering is tenant-specific; this order reflects the
/// deployment the service was first validated against, with the standard
/// field names as fallbacks. Override with `STORY_POINT_FIELDS`.
const DEFAULT_STORY_POINT_FIELDS: &[&str] = &[
    "customfield_10130",
    "customfield_10036",
    "customfield_10037",
    "Story Points",
    "customfield_10016",
    "customfield_10024",
    "customfield_10020",
    "storyPoints",
    "story_points",
    "points",
];

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Standard operational logging
    #[default]
    Info,
    /// Verbose debugging
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback to `Info`
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Deployment environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback to `Development`
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Issue tracker connection settings
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Base URL of the tracker instance (e.g. `https://example.atlassian.net`)
    pub base_url: String,
    /// Account email for basic authentication
    pub email: String,
    /// API token for basic authentication
    pub api_token: String,
}

/// LLM generation settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Gemini API key; `None` disables the LLM path entirely
    pub api_key: Option<String>,
    /// Model identifier to bind the cached handle to
    pub model: String,
    /// Sampling temperature for generation
    pub temperature: f32,
    /// Output token cap per generation
    pub max_output_tokens: u32,
    /// Seconds before the cached model handle is rebuilt
    pub cache_expiry_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_owned(),
            temperature: tokens::GENERATION_TEMPERATURE,
            max_output_tokens: tokens::MAX_OUTPUT_TOKENS,
            cache_expiry_secs: cache::MODEL_CACHE_EXPIRY_SECS,
        }
    }
}

/// Result caps applied to tracker searches
#[derive(Debug, Clone, Copy)]
pub struct QueryLimits {
    /// Cap for general queries
    pub general_max_results: u32,
    /// Cap for aggregation queries
    pub aggregation_max_results: u32,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            general_max_results: limits::GENERAL_MAX_RESULTS,
            aggregation_max_results: limits::AGGREGATION_MAX_RESULTS,
        }
    }
}

/// Prioritized list of issue fields probed for story-point values
#[derive(Debug, Clone)]
pub struct StoryPointFields {
    /// Field identifiers in probe order; first numeric value > 0 wins
    pub fields: Vec<String>,
}

impl Default for StoryPointFields {
    fn default() -> Self {
        Self {
            fields: DEFAULT_STORY_POINT_FIELDS
                .iter()
                .map(|f| (*f).to_owned())
                .collect(),
        }
    }
}

impl StoryPointFields {
    /// Build from a comma-separated override string
    #[must_use]
    pub fn from_override(raw: &str) -> Self {
        let fields: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        if fields.is_empty() {
            Self::default()
        } else {
            Self { fields }
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Log level
    pub log_level: LogLevel,
    /// Tracker connection settings
    pub tracker: TrackerConfig,
    /// LLM generation settings
    pub llm: LlmConfig,
    /// Search result caps
    pub limits: QueryLimits,
    /// Story-point field probe order
    pub story_point_fields: StoryPointFields,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a tracker credential variable is missing or the
    /// tracker base URL is not a valid HTTPS URL. A missing Gemini key is
    /// logged but never an error.
    pub fn from_env() -> AppResult<Self> {
        let tracker = Self::tracker_from_env()?;

        let api_key = env::var(GEMINI_API_KEY_ENV).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!(
                "{} not set - JQL generation will use the rule-based fallback only",
                GEMINI_API_KEY_ENV
            );
        }

        let llm = LlmConfig {
            api_key,
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_owned()),
            ..LlmConfig::default()
        };

        let story_point_fields = env::var(STORY_POINT_FIELDS_ENV)
            .map(|raw| StoryPointFields::from_override(&raw))
            .unwrap_or_default();

        let environment = Environment::from_str_or_default(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_owned()),
        );
        let log_level = LogLevel::from_str_or_default(
            &env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned()),
        );

        let config = Self {
            environment,
            log_level,
            tracker,
            llm,
            limits: QueryLimits::default(),
            story_point_fields,
        };

        info!(
            environment = %config.environment,
            llm_enabled = config.llm.api_key.is_some(),
            "configuration loaded"
        );

        Ok(config)
    }

    /// Read and validate the tracker credential variables
    fn tracker_from_env() -> AppResult<TrackerConfig> {
        let base_url = require_env(TRACKER_BASE_URL_ENV)?;
        let email = require_env(TRACKER_EMAIL_ENV)?;
        let api_token = require_env(TRACKER_API_TOKEN_ENV)?;

        let parsed = Url::parse(&base_url).map_err(|e| {
            AppError::config(format!("{TRACKER_BASE_URL_ENV} is not a valid URL: {e}"))
        })?;
        if parsed.scheme() != "https" {
            return Err(AppError::config(format!(
                "{TRACKER_BASE_URL_ENV} must use https"
            )));
        }

        Ok(TrackerConfig {
            base_url: base_url.trim_end_matches('/').to_owned(),
            email,
            api_token,
        })
    }
}

/// Read a required environment variable
fn require_env(name: &str) -> AppResult<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::ConfigMissing,
                format!("{name} environment variable not set"),
            )
        })
}
