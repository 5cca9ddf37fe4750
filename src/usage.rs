// ABOUTME: Token usage accounting for LLM calls with session-scoped counters
// ABOUTME: Tracks query counts and input/output token totals, estimated or provider-exact
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Token Usage Accounting
//!
//! A single-writer counter component shared by the JQL generator. Exact token
//! counts from the provider win when present; otherwise usage is estimated at
//! roughly 4 characters per token. Counters live for the process lifetime and
//! reset only on restart or an explicit [`UsageTracker::reset`].

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::tokens;
use crate::llm::TokenUsage;

/// Running token usage totals for the current session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsageStats {
    /// Number of LLM calls recorded
    pub total_queries: u64,
    /// Total input tokens across all calls
    pub total_input_tokens: u64,
    /// Total output tokens across all calls
    pub total_output_tokens: u64,
    /// Total tokens across all calls
    pub total_tokens: u64,
    /// When the session started
    pub session_start: DateTime<Utc>,
    /// Timestamp of the most recent call
    pub last_query: DateTime<Utc>,
}

impl TokenUsageStats {
    fn fresh() -> Self {
        let now = Utc::now();
        Self {
            total_queries: 0,
            total_input_tokens: 0,
            total_output_tokens: 0,
            total_tokens: 0,
            session_start: now,
            last_query: now,
        }
    }
}

/// Usage recorded for a single LLM call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Input tokens for this call
    pub input_tokens: u64,
    /// Output tokens for this call
    pub output_tokens: u64,
    /// Total tokens for this call
    pub total_tokens: u64,
    /// Session query count after this call
    pub query_count: u64,
    /// When the call was recorded
    pub timestamp: DateTime<Utc>,
}

/// Tracks token usage across LLM calls
///
/// Counter mutation is guarded by a mutex so concurrent requests cannot lose
/// updates; share across tasks with an `Arc`.
#[derive(Debug)]
pub struct UsageTracker {
    stats: Mutex<TokenUsageStats>,
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageTracker {
    /// Create a tracker with zeroed counters
    #[must_use]
    pub fn new() -> Self {
        Self {
            stats: Mutex::new(TokenUsageStats::fresh()),
        }
    }

    /// Estimate tokens for text (approximation: 1 token per 4 characters)
    #[must_use]
    pub const fn estimate_tokens(text: &str) -> u64 {
        text.len().div_ceil(tokens::CHARS_PER_TOKEN) as u64
    }

    /// Record one LLM call
    ///
    /// Uses exact token counts from the provider when given, otherwise
    /// estimates from the input and output text lengths.
    pub fn record(
        &self,
        input_text: &str,
        output_text: &str,
        exact: Option<&TokenUsage>,
    ) -> UsageRecord {
        let input_tokens = exact.map_or_else(
            || Self::estimate_tokens(input_text),
            |u| u64::from(u.prompt_tokens),
        );
        let output_tokens = exact.map_or_else(
            || Self::estimate_tokens(output_text),
            |u| u64::from(u.completion_tokens),
        );
        let total_tokens = input_tokens + output_tokens;

        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        stats.total_queries += 1;
        stats.total_input_tokens += input_tokens;
        stats.total_output_tokens += output_tokens;
        stats.total_tokens += total_tokens;
        stats.last_query = Utc::now();

        UsageRecord {
            input_tokens,
            output_tokens,
            total_tokens,
            query_count: stats.total_queries,
            timestamp: stats.last_query,
        }
    }

    /// Get a copy of the current totals
    #[must_use]
    pub fn snapshot(&self) -> TokenUsageStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reset all counters and restart the session clock
    pub fn reset(&self) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        *stats = TokenUsageStats::fresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens_rounds_up() {
        assert_eq!(UsageTracker::estimate_tokens(""), 0);
        assert_eq!(UsageTracker::estimate_tokens("abcd"), 1);
        assert_eq!(UsageTracker::estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_record_accumulates_estimates() {
        let tracker = UsageTracker::new();
        let record = tracker.record("12345678", "1234", None);

        assert_eq!(record.input_tokens, 2);
        assert_eq!(record.output_tokens, 1);
        assert_eq!(record.query_count, 1);

        tracker.record("12345678", "1234", None);
        let stats = tracker.snapshot();
        assert_eq!(stats.total_queries, 2);
        assert_eq!(stats.total_tokens, 6);
    }

    #[test]
    fn test_exact_counts_win_over_estimates() {
        let tracker = UsageTracker::new();
        let exact = TokenUsage {
            prompt_tokens: 100,
            completion_tokens: 20,
            total_tokens: 120,
        };
        let record = tracker.record("ab", "cd", Some(&exact));

        assert_eq!(record.input_tokens, 100);
        assert_eq!(record.output_tokens, 20);
    }

    #[test]
    fn test_reset_zeroes_counters() {
        let tracker = UsageTracker::new();
        tracker.record("some input", "output", None);
        tracker.reset();

        let stats = tracker.snapshot();
        assert_eq!(stats.total_queries, 0);
        assert_eq!(stats.total_tokens, 0);
    }
}
