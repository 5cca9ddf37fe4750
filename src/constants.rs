// ABOUTME: System-wide constants and default limits for the JQL assistant
// ABOUTME: Contains query result caps, cache lifetimes, endpoints, and time conversion ratios
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Constants Module
//!
//! Hardcoded defaults shared across the translation pipeline. Values that
//! deployments commonly tune (result caps, story-point fields) are surfaced
//! through [`crate::config`] instead of being read here.

/// Query result limits
pub mod limits {
    /// Result cap for general search queries
    pub const GENERAL_MAX_RESULTS: u32 = 200;

    /// Result cap for worklog and story-point aggregation queries, which need
    /// every matching issue to produce correct totals
    pub const AGGREGATION_MAX_RESULTS: u32 = 1000;

    /// Minimum plausible length of a generated JQL string; anything shorter
    /// is treated as a generation failure
    pub const MIN_JQL_LENGTH: usize = 3;
}

/// LLM model cache behavior
pub mod cache {
    /// Lifetime of the cached model handle before it is rebuilt
    pub const MODEL_CACHE_EXPIRY_SECS: u64 = 60 * 60;
}

/// Token accounting defaults
pub mod tokens {
    /// Approximate characters per token used when the provider returns no
    /// exact counts (English-text heuristic)
    pub const CHARS_PER_TOKEN: usize = 4;

    /// Output token cap for JQL generation; JQL queries are short
    pub const MAX_OUTPUT_TOKENS: u32 = 500;

    /// Low temperature for consistent JQL generation
    pub const GENERATION_TEMPERATURE: f32 = 0.1;
}

/// Work-calendar time conversion ratios
///
/// These approximate a 5-day/8-hour working calendar, not wall-clock time:
/// "1d" logged against an issue means one working day.
pub mod work_time {
    /// Hours in a logged week
    pub const HOURS_PER_WEEK: f64 = 40.0;

    /// Hours in a logged day
    pub const HOURS_PER_DAY: f64 = 8.0;

    /// Hours per minute
    pub const HOURS_PER_MINUTE: f64 = 1.0 / 60.0;

    /// Hours per second
    pub const HOURS_PER_SECOND: f64 = 1.0 / 3600.0;

    /// Seconds per hour, for `timeSpentSeconds` fallbacks
    pub const SECONDS_PER_HOUR: f64 = 3600.0;
}

/// External API endpoints and paths
pub mod endpoints {
    /// Base URL for the Gemini generative language API
    pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Tracker search endpoint path
    pub const TRACKER_SEARCH_PATH: &str = "/rest/api/3/search/jql";

    /// Tracker identity endpoint used for connection probes
    pub const TRACKER_MYSELF_PATH: &str = "/rest/api/3/myself";
}

/// HTTP client timeouts
pub mod timeouts {
    /// Request timeout for tracker search calls, in seconds
    pub const TRACKER_REQUEST_SECS: u64 = 15;

    /// Request timeout for LLM generation calls, in seconds
    pub const LLM_REQUEST_SECS: u64 = 30;

    /// Connection timeout shared by both clients, in seconds
    pub const CONNECT_SECS: u64 = 10;
}

/// Service names for logging and error prefixes
pub mod service_names {
    /// This service
    pub const JQL_ASSISTANT: &str = "jql-assistant";

    /// The issue tracker collaborator
    pub const TRACKER: &str = "tracker";

    /// The LLM collaborator
    pub const GEMINI: &str = "gemini";
}
