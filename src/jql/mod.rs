// ABOUTME: JQL generation pipeline combining extraction, fallback rules, and LLM translation
// ABOUTME: Defines the extracted-entity types and the structural validity check for generated JQL
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # JQL Generation Pipeline
//!
//! Free text goes in, validated JQL comes out:
//!
//! 1. [`generator::JqlGenerator`] sends the query to a cached Gemini handle
//! 2. The raw output is cleaned and checked against the JQL shape pattern
//! 3. [`augment::with_default_sprint_filter`] scopes the query to the current
//!    sprint unless the query opts out
//! 4. On any failure, [`fallback::fallback_jql`] synthesizes a query from an
//!    ordered rule table instead
//!
//! [`extract`] provides the shared entity extraction both the fallback rules
//! and the orchestrator rely on.

/// Default sprint-scope filter augmentation
pub mod augment;

/// Regex-based entity extraction from free text and generated JQL
pub mod extract;

/// Rule-based fallback query builder
pub mod fallback;

/// Cached LLM query generator
pub mod generator;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use augment::with_default_sprint_filter;
pub use extract::{extract_entities, ExtractedEntities};
pub use fallback::fallback_jql;
pub use generator::JqlGenerator;

/// An inclusive ISO date range (`YYYY-MM-DD` bounds)
///
/// Kept as strings: worklog date filtering is a string-prefix comparison on
/// the ISO date portion of timestamps, which sidesteps timezone handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included
    pub start: String,
    /// Last day included
    pub end: String,
}

impl DateRange {
    /// Create a range from start and end dates
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Check whether an ISO timestamp's date portion falls inside the range
    #[must_use]
    pub fn contains_timestamp(&self, timestamp: &str) -> bool {
        let date = timestamp.split('T').next().unwrap_or(timestamp);
        date >= self.start.as_str() && date <= self.end.as_str()
    }
}

/// Minimal structural check for generated JQL
///
/// A query must contain at least one `field operator value` clause to be
/// usable; anything else is treated as a generation failure.
static JQL_SHAPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\w+\s*(=|~|!=|>=|<=|>|<|not\s+in|in)\s*.+").ok()
});

/// Check whether a string has the minimal shape of a JQL query
#[must_use]
pub fn is_valid_jql_shape(jql: &str) -> bool {
    JQL_SHAPE.as_ref().is_some_and(|re| re.is_match(jql))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jql_shape_accepts_field_comparisons() {
        assert!(is_valid_jql_shape("assignee = \"john\""));
        assert!(is_valid_jql_shape("summary ~ \"crash\" ORDER BY updated DESC"));
        assert!(is_valid_jql_shape("key in (\"ABC-1\", \"ABC-2\")"));
        assert!(is_valid_jql_shape("priority >= High"));
    }

    #[test]
    fn test_jql_shape_rejects_prose() {
        assert!(!is_valid_jql_shape(""));
        assert!(!is_valid_jql_shape("sorry, I cannot help"));
        assert!(!is_valid_jql_shape("hello"));
    }

    #[test]
    fn test_date_range_prefix_comparison() {
        let range = DateRange::new("2025-01-01", "2025-01-31");
        assert!(range.contains_timestamp("2025-01-15T08:30:00.000+0000"));
        assert!(range.contains_timestamp("2025-01-01"));
        assert!(range.contains_timestamp("2025-01-31T23:59:59Z"));
        assert!(!range.contains_timestamp("2025-02-01T00:00:00Z"));
        assert!(!range.contains_timestamp("2024-12-31"));
    }
}
