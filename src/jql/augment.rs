// ABOUTME: Default-filter augmentation appending current-sprint scoping to generated JQL
// ABOUTME: Skips queries that opt out via scope keywords, issue keys, or an existing sprint clause
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Default Sprint Filter
//!
//! Most dashboard questions are about the current iteration, so generated
//! queries get `AND sprint in openSprints()` appended unless the query opts
//! out. Applying the filter twice is a no-op: the existing-clause check fires
//! on the second pass.

use std::sync::LazyLock;

use regex::Regex;

use super::extract::contains_issue_key;

/// Trailing sort clause; the sprint filter must land before it
static ORDER_BY: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+ORDER BY").ok());

/// Free-text keywords that exempt a query from default sprint scoping
///
/// Worklog queries typically span multiple sprints, and an explicit sprint
/// mention means the generator already handled scoping.
const SCOPE_EXEMPT_KEYWORDS: &[&str] = &[
    "sprint",
    "worklog",
    "hours",
    "time spent",
    "all sprint",
    "any sprint",
];

/// JQL fragments that mean a sprint scope is already present
const EXISTING_SPRINT_CLAUSES: &[&str] = &[
    "sprint in opensprints()",
    "sprint not in opensprints()",
    "sprint is empty",
];

/// Conditionally append the current-sprint scope filter to a JQL query
///
/// The filter is skipped when:
/// - the free text contains a scope-exempt keyword,
/// - the free text contains an issue-key-shaped token (key lookups must not
///   be limited to a sprint),
/// - the JQL already carries a sprint scope clause in any form.
///
/// When a trailing `ORDER BY` is present, the filter is inserted before it.
#[must_use]
pub fn with_default_sprint_filter(jql: &str, user_query: &str) -> String {
    let query = user_query.to_lowercase();
    let jql_lower = jql.to_lowercase();

    let exempt = SCOPE_EXEMPT_KEYWORDS.iter().any(|kw| query.contains(kw))
        || contains_issue_key(user_query)
        || EXISTING_SPRINT_CLAUSES
            .iter()
            .any(|clause| jql_lower.contains(clause));

    if exempt {
        return jql.to_owned();
    }

    ORDER_BY.as_ref().map_or_else(
        || format!("{jql} AND sprint in openSprints()"),
        |re| {
            if re.is_match(jql) {
                re.replace(jql, " AND sprint in openSprints() ORDER BY")
                    .into_owned()
            } else {
                format!("{jql} AND sprint in openSprints()")
            }
        },
    )
}
