// ABOUTME: Aggregation engines reducing fetched issues into per-user analytics
// ABOUTME: Shares the fuzzy name-matching heuristic between the worklog and story-point reducers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Aggregation Engine
//!
//! Two reducers with the same shape: fetch issues for a JQL query, match
//! records against target names, accumulate per-name totals.
//!
//! Name matching is bidirectional case-insensitive substring containment, so
//! a target of "John" matches a record author of "John Smith" and vice
//! versa. This is a deliberate heuristic to tolerate partial names; it can
//! over-match short targets ("Al" matches both "Alice" and "Albert"), in
//! which case the first target in request order wins.

/// Story-point rollups per assignee
pub mod story_points;

/// Time-spent string parsing
pub mod time;

/// Worklog-hour rollups per user
pub mod worklog;

pub use story_points::{calculate_story_points, IssueRollup, StatusCategory, StoryPointsSummary};
pub use time::{format_hours, parse_time_spent};
pub use worklog::{calculate_worklog_hours, WorklogSummary};

/// Bidirectional case-insensitive substring match between two names
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

/// Find the first target name matching an actual record name
///
/// First match in request order wins on ambiguity.
pub(crate) fn match_target<'a>(actual: &str, targets: &'a [String]) -> Option<&'a str> {
    targets
        .iter()
        .find(|target| names_match(actual, target))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_is_bidirectional() {
        assert!(names_match("John Smith", "john"));
        assert!(names_match("john", "John Smith"));
        assert!(!names_match("alice", "bob"));
    }

    #[test]
    fn test_match_target_first_wins() {
        let targets = vec!["Al".to_owned(), "Albert".to_owned()];
        assert_eq!(match_target("Albert Brooks", &targets), Some("Al"));
        assert_eq!(match_target("Zoe", &targets), None);
    }
}
