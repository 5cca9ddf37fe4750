// ABOUTME: Rule-based fallback JQL builder used when the LLM path is unavailable or invalid
// ABOUTME: Ordered table of pattern rules evaluated top-to-bottom, first producing rule wins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Fallback Query Builder
//!
//! A deterministic approximation of the LLM translation: an ordered table of
//! `(matcher, builder)` rules evaluated top to bottom. The first rule whose
//! matcher fires *and* whose builder produces a query wins; a builder that
//! cannot complete (e.g. no user names extract from a worklog query) yields
//! `None` and the cascade continues. The final default is a free-text search
//! across summary and description.
//!
//! Issue-key lookups short-circuit everything else, and the story-points rule
//! manages its own sprint scoping; every other winning rule is routed through
//! the default sprint filter.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::augment::with_default_sprint_filter;
use super::extract::{
    extract_date_range, extract_issue_keys, extract_sprint_name, extract_story_point_assignees,
    extract_user_names,
};

/// Assignee spans: `assigned to <name>` up to a date range or end of query
static ASSIGNED_TO: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"assigned to ([a-zA-Z\s]+?)(?:\s+between|\s*$)").ok());

/// Assignee spans: `issues for <name>` / `tickets for <name>`
static ISSUES_FOR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?:issues|tickets) for ([a-zA-Z\s]+?)(?:\s+between|\s*$)").ok());

/// Statuses that mean the work is finished, excluded from story-point rollups
const COMPLETED_STATUS_EXCLUSION: &str = r#"status NOT IN ("Done", "Closed", "Resolved", "Cancelled", "Ready for Release", "Released", "Deployed", "In Review")"#;

/// Input shared by all rules
struct RuleContext<'a> {
    /// Query as the user typed it (used in text-search templates)
    raw: &'a str,
    /// Lowercased query (used for keyword and name matching)
    lower: String,
}

/// One entry in the fallback rule table
struct FallbackRule {
    /// Rule name for trace logging
    name: &'static str,
    /// Cheap keyword/shape check
    matches: fn(&RuleContext<'_>) -> bool,
    /// Builds the query; `None` means fall through to the next rule
    build: fn(&RuleContext<'_>) -> Option<String>,
    /// Whether the result goes through the default sprint filter
    augment: bool,
}

/// Ordered rule table; first producing rule wins
static RULES: &[FallbackRule] = &[
    FallbackRule {
        name: "issue-keys",
        matches: |ctx: &RuleContext<'_>| !extract_issue_keys(ctx.raw).is_empty(),
        build: build_issue_key_lookup,
        augment: false,
    },
    FallbackRule {
        name: "backlog",
        matches: |ctx: &RuleContext<'_>| ctx.lower.contains("backlog"),
        build: |_: &RuleContext<'_>| {
            Some(
                r#"status IN ("New", "To Do", "Blocked") AND Sprint not in openSprints()"#
                    .to_owned(),
            )
        },
        augment: true,
    },
    FallbackRule {
        name: "bugs",
        matches: |ctx: &RuleContext<'_>| ctx.lower.contains("bug"),
        build: |ctx: &RuleContext<'_>| Some(text_search_with(ctx.raw, "type = Bug")),
        augment: true,
    },
    FallbackRule {
        name: "high-priority",
        matches: |ctx: &RuleContext<'_>| ctx.lower.contains("high priority"),
        build: |ctx: &RuleContext<'_>| Some(text_search_with(ctx.raw, "priority = High")),
        augment: true,
    },
    FallbackRule {
        name: "open-issues",
        matches: |ctx: &RuleContext<'_>| ctx.lower.contains("open") || ctx.lower.contains("todo"),
        build: |ctx: &RuleContext<'_>| Some(text_search_with(ctx.raw, "status != Done")),
        augment: true,
    },
    FallbackRule {
        name: "worklog",
        matches: |ctx: &RuleContext<'_>| {
            ctx.lower.contains("worklog")
                || ctx.lower.contains("hours")
                || ctx.lower.contains("time spent")
        },
        build: build_worklog_query,
        augment: true,
    },
    FallbackRule {
        name: "assigned-to",
        matches: |ctx: &RuleContext<'_>| ctx.lower.contains("assigned to"),
        build: build_assigned_to_query,
        augment: true,
    },
    FallbackRule {
        name: "story-points",
        matches: |ctx: &RuleContext<'_>| {
            ctx.lower.contains("story point")
                || ctx.lower.contains("points assigned")
                || ctx.lower.contains("points for")
                || ctx.lower.contains("total points")
                || ctx.lower.contains("remaining points")
        },
        build: build_story_points_query,
        augment: false,
    },
    FallbackRule {
        name: "issues-for",
        matches: |ctx: &RuleContext<'_>| ctx.lower.contains("issues for") || ctx.lower.contains("tickets for"),
        build: build_issues_for_query,
        augment: true,
    },
    FallbackRule {
        name: "date-range",
        matches: |ctx: &RuleContext<'_>| extract_date_range(&ctx.lower).is_some(),
        build: |ctx: &RuleContext<'_>| {
            extract_date_range(&ctx.lower).map(|range| {
                format!(
                    r#"created >= "{}" AND created <= "{}" ORDER BY updated DESC"#,
                    range.start, range.end
                )
            })
        },
        augment: true,
    },
];

/// Synthesize a JQL query from free text without calling any external service
///
/// Always returns a usable query: when no rule applies, the default is a
/// free-text search over summary and description.
#[must_use]
pub fn fallback_jql(query: &str) -> String {
    let ctx = RuleContext {
        raw: query.trim(),
        lower: query.to_lowercase().trim().to_owned(),
    };

    debug!(query = ctx.raw, "using fallback JQL generation");

    for rule in RULES {
        if (rule.matches)(&ctx) {
            if let Some(jql) = (rule.build)(&ctx) {
                debug!(rule = rule.name, "fallback rule matched");
                return if rule.augment {
                    with_default_sprint_filter(&jql, ctx.raw)
                } else {
                    jql
                };
            }
        }
    }

    let jql = format!(
        r#"summary ~ "{}" OR description ~ "{}" ORDER BY updated DESC"#,
        ctx.raw, ctx.raw
    );
    with_default_sprint_filter(&jql, ctx.raw)
}

/// Free-text search over summary/description combined with a leading filter
fn text_search_with(raw: &str, filter: &str) -> String {
    format!(r#"{filter} AND (summary ~ "{raw}" OR description ~ "{raw}") ORDER BY updated DESC"#)
}

/// Quote and comma-join a list of values
fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("\"{v}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Exact key lookup, single or multi-value; short-circuits all other rules
fn build_issue_key_lookup(ctx: &RuleContext<'_>) -> Option<String> {
    let keys = extract_issue_keys(ctx.raw);
    match keys.as_slice() {
        [] => None,
        [single] => Some(format!(r#"key = "{single}""#)),
        many => Some(format!("key in ({})", quoted_list(many))),
    }
}

/// Worklog-author-or-assignee filter, date-bounded when a range is present
///
/// Requires extracted user names; a team reference or missing names falls
/// through to later rules.
fn build_worklog_query(ctx: &RuleContext<'_>) -> Option<String> {
    let users = extract_user_names(ctx.raw);
    if users.is_empty() {
        return None;
    }

    let range = extract_date_range(&ctx.lower);
    let jql = match (users.as_slice(), range) {
        ([user], Some(range)) => format!(
            r#"(worklogAuthor = "{user}" AND worklogDate >= "{start}" AND worklogDate <= "{end}") OR (assignee = "{user}" AND updated >= "{start}" AND updated <= "{end}")"#,
            start = range.start,
            end = range.end,
        ),
        (users, Some(range)) => {
            let list = quoted_list(users);
            format!(
                r#"(worklogAuthor in ({list}) AND worklogDate >= "{start}" AND worklogDate <= "{end}") OR (assignee in ({list}) AND updated >= "{start}" AND updated <= "{end}")"#,
                start = range.start,
                end = range.end,
            )
        }
        ([user], None) => format!(r#"worklogAuthor = "{user}" OR assignee = "{user}""#),
        (users, None) => {
            let list = quoted_list(users);
            format!("worklogAuthor in ({list}) OR assignee in ({list})")
        }
    };
    Some(jql)
}

/// Fuzzy assignee filter from `assigned to <name>`, optionally date-bounded
fn build_assigned_to_query(ctx: &RuleContext<'_>) -> Option<String> {
    let caps = ASSIGNED_TO.as_ref()?.captures(&ctx.lower)?;
    let assignee = caps.get(1)?.as_str().trim();
    Some(assignee_query(assignee, ctx))
}

/// Fuzzy assignee filter from `issues for <name>`, optionally date-bounded
fn build_issues_for_query(ctx: &RuleContext<'_>) -> Option<String> {
    let caps = ISSUES_FOR.as_ref()?.captures(&ctx.lower)?;
    let user = caps.get(1)?.as_str().trim();
    Some(assignee_query(user, ctx))
}

/// Shared template for fuzzy assignee queries
fn assignee_query(name: &str, ctx: &RuleContext<'_>) -> String {
    extract_date_range(&ctx.lower).map_or_else(
        || format!(r#"assignee ~ "{name}" ORDER BY updated DESC"#),
        |range| {
            format!(
                r#"assignee ~ "{name}" AND created >= "{}" AND created <= "{}" ORDER BY updated DESC"#,
                range.start, range.end
            )
        },
    )
}

/// Story-point rollup query: assignee filter, optional sprint, points-present
/// filter, completed-status exclusion, sorted output
fn build_story_points_query(ctx: &RuleContext<'_>) -> Option<String> {
    let assignees = extract_story_point_assignees(ctx.raw);
    if assignees.is_empty() {
        return None;
    }

    let mut jql = match assignees.as_slice() {
        [single] => format!(r#"assignee ~ "{single}""#),
        many => format!("assignee in ({})", quoted_list(many)),
    };

    let sprint = extract_sprint_name(ctx.raw, None);
    if let Some(sprint) = &sprint {
        jql.push_str(&format!(r#" AND Sprint = "{sprint}""#));
    }

    jql.push_str(r#" AND "Story Points" is not EMPTY"#);
    jql.push_str(" AND ");
    jql.push_str(COMPLETED_STATUS_EXCLUSION);

    if sprint.is_none() {
        jql.push_str(" AND sprint in openSprints()");
    }

    jql.push_str(r#" ORDER BY assignee, "Story Points" DESC"#);
    Some(jql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_issue_key_short_circuits() {
        assert_eq!(fallback_jql("MSC-12345"), r#"key = "MSC-12345""#);
        assert_eq!(
            fallback_jql("show me bug MSC-12345 please"),
            r#"key = "MSC-12345""#
        );
    }

    #[test]
    fn test_multiple_issue_keys_use_in_form() {
        assert_eq!(
            fallback_jql("compare msc-1 and msc-2"),
            r#"key in ("MSC-1", "MSC-2")"#
        );
    }

    #[test]
    fn test_backlog_rule_excludes_open_sprints() {
        let jql = fallback_jql("show backlog issues");
        assert!(jql.contains(r#"status IN ("New", "To Do", "Blocked")"#));
        assert!(jql.contains("Sprint not in openSprints()"));
        // Already sprint-scoped; the default filter must not stack another clause
        assert!(!jql.contains("sprint in openSprints()"));
    }

    #[test]
    fn test_bug_rule_adds_type_filter_and_default_scope() {
        let jql = fallback_jql("recent bugs");
        assert!(jql.starts_with("type = Bug"));
        assert!(jql.contains(r#"summary ~ "recent bugs""#));
        assert!(jql.contains("sprint in openSprints()"));
        assert!(jql.ends_with("ORDER BY updated DESC"));
    }

    #[test]
    fn test_worklog_rule_requires_names() {
        let jql = fallback_jql(
            "worklog hours of John Smith and Jane Doe between 2025-01-01 and 2025-01-31",
        );
        assert!(jql.contains(r#"worklogAuthor in ("john smith", "jane doe")"#));
        assert!(jql.contains(r#"worklogDate >= "2025-01-01""#));
        assert!(jql.contains(r#"worklogDate <= "2025-01-31""#));
        // Worklog queries span sprints; no default scope
        assert!(!jql.contains("sprint in openSprints()"));
    }

    #[test]
    fn test_worklog_single_user_without_dates() {
        let jql = fallback_jql("worklog of kumar from yesterday onwards");
        // "kumar" extracts but no ISO range is present
        assert_eq!(jql, r#"worklogAuthor = "kumar" OR assignee = "kumar""#);
    }

    #[test]
    fn test_worklog_team_reference_falls_through() {
        // Team references are not user names; rule yields nothing and the
        // cascade lands on the bare date-range rule
        let jql = fallback_jql("worklog hours for the platform team between 2025-01-01 and 2025-01-31");
        assert!(jql.contains(r#"created >= "2025-01-01""#));
        assert!(!jql.contains("worklogAuthor"));
    }

    #[test]
    fn test_assigned_to_with_date_range() {
        let jql = fallback_jql("tickets assigned to mary jones between 2025-03-01 and 2025-03-31");
        assert!(jql.contains(r#"assignee ~ "mary jones""#));
        assert!(jql.contains(r#"created >= "2025-03-01""#));
    }

    #[test]
    fn test_story_points_single_assignee_defaults_to_open_sprints() {
        let jql = fallback_jql("how many story points assigned to alice");
        assert!(jql.contains(r#"assignee ~ "alice""#));
        assert!(jql.contains(r#""Story Points" is not EMPTY"#));
        assert!(jql.contains(r#"status NOT IN ("Done""#));
        assert!(jql.contains("sprint in openSprints()"));
        assert!(jql.ends_with(r#"ORDER BY assignee, "Story Points" DESC"#));
    }

    #[test]
    fn test_story_points_multiple_assignees_with_sprint() {
        let jql = fallback_jql("story points for john and mary in sprint XYZ");
        assert!(jql.contains(r#"assignee in ("john", "mary")"#));
        assert!(jql.contains(r#"Sprint = "XYZ""#));
        assert!(!jql.contains("sprint in openSprints()"));
    }

    #[test]
    fn test_bare_date_range_bounds_creation_date() {
        let jql = fallback_jql("everything between 2025-05-01 and 2025-05-31");
        assert!(jql.starts_with(r#"created >= "2025-05-01""#));
        assert!(jql.contains("sprint in openSprints()"));
    }

    #[test]
    fn test_default_rule_is_text_search() {
        let jql = fallback_jql("payment gateway regression");
        assert!(jql.contains(r#"summary ~ "payment gateway regression""#));
        assert!(jql.contains(r#"description ~ "payment gateway regression""#));
        assert!(jql.contains("sprint in openSprints()"));
    }
}
