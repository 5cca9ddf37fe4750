// ABOUTME: Regex-based entity extraction from free-text queries and generated JQL
// ABOUTME: Pulls user names, team IDs, date ranges, sprint names, and issue keys with JQL-first precedence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Entity Extraction
//!
//! Pure pattern-matching functions with no I/O. Extraction has two sources:
//! the raw free-text query and, when available, the JQL already generated for
//! it. The JQL signal is preferred — it reflects the disambiguation the
//! generator already performed — with free text as the fallback.
//!
//! Every rule is independently optional; an entity that does not extract is
//! simply absent, never an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::DateRange;

/// Issue keys like `MSC-137637`, case-insensitive
static ISSUE_KEY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b([A-Z]+-\d+)\b").ok());

/// User names in free text: `(by|for|of) <names> (between|for the period|from)`
static TEXT_USERS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?:by|for|of)\s+(.+?)\s+(?:between|for the period|from)").ok()
});

/// Date ranges in free text: `between 2025-01-01 and 2025-01-31` and variants
static TEXT_DATE_RANGE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?:between|period of|from)\s+(\d{4}-\d{2}-\d{2})\s+(?:and|to)\s+(\d{4}-\d{2}-\d{2})").ok()
});

/// Separator between multiple names: `and` or comma
static NAME_SEPARATOR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\s+and\s+|\s*,\s*").ok());

/// Worklog author clauses in JQL, single or multi-value
static JQL_WORKLOG_AUTHORS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?i)worklogAuthor\s*=\s*"([^"]+)"|worklogAuthor\s+in\s*\(([^)]+)\)"#).ok()
});

/// Assignee clauses in JQL, single or multi-value
static JQL_ASSIGNEES: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?i)assignee\s*[=~]\s*"([^"]+)"|assignee\s+in\s*\(([^)]+)\)"#).ok()
});

/// Worklog date bounds in JQL: `worklogDate >= "D1" ... worklogDate <= "D2"`
static JQL_WORKLOG_DATES: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?i)worklogDate\s*>=\s*"([^"]+)".*worklogDate\s*<=\s*"([^"]+)""#).ok()
});

/// Team-scoped field clauses in JQL, single or multi-value
static JQL_TEAM_IDS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?i)Team\[Team\]\s*=\s*"([^"]+)"|Team\[Team\]\s+IN\s*\(([^)]+)\)"#).ok()
});

/// Sprint clause in JQL: `Sprint = "Name"`
static JQL_SPRINT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"Sprint\s*=\s*"([^"]+)""#).ok());

/// Sprint names in free text: `(for|in) sprint <name>`
static TEXT_SPRINT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:for|in)\s+(?:the\s+)?sprint\s+([a-zA-Z0-9.\s-]+)").ok()
});

/// Assignee spans in story-point phrasing, stopping before a sprint clause
static POINTS_ASSIGNEES: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:story points?|points)\s+(?:for|of|assigned to)\s+(.+?)(?:\s+(?:for|in)\s+(?:the\s+)?sprint\b|\s*$)",
    )
    .ok()
});

/// Bare `assigned to <names>` spans in story-point phrasing
static POINTS_ASSIGNED_TO: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)assigned to\s+(.+?)(?:\s+(?:for|in)\s+(?:the\s+)?sprint\b|\s*$)").ok()
});

/// Entities extracted from a query and/or its generated JQL
///
/// Built fresh per request; never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedEntities {
    /// Individual user names (worklog authors or assignees)
    pub user_names: Vec<String>,
    /// Team-scoped field identifiers (long UUID-like tokens)
    pub team_ids: Vec<String>,
    /// Inclusive date range
    pub date_range: Option<DateRange>,
    /// Sprint name
    pub sprint_name: Option<String>,
    /// Issue keys, uppercased
    pub issue_keys: Vec<String>,
}

/// Extract issue keys from text, normalized to uppercase
#[must_use]
pub fn extract_issue_keys(text: &str) -> Vec<String> {
    ISSUE_KEY.as_ref().map_or_else(Vec::new, |re| {
        re.captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_uppercase())
            .collect()
    })
}

/// Check whether text contains an issue-key-shaped token
#[must_use]
pub fn contains_issue_key(text: &str) -> bool {
    ISSUE_KEY.as_ref().is_some_and(|re| re.is_match(text))
}

/// Split a captured span into individual names on `and`/comma
fn split_names(span: &str) -> Vec<String> {
    NAME_SEPARATOR.as_ref().map_or_else(
        || vec![span.trim().to_owned()],
        |re| {
            re.split(span)
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        },
    )
}

/// Extract individual user names from free text
///
/// Matches `(by|for|of) <names> (between|for the period|from)` and splits the
/// captured span on `and`/comma. A span containing the word "team" is a team
/// reference, not a list of people, and yields no names.
#[must_use]
pub fn extract_user_names(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let Some(re) = TEXT_USERS.as_ref() else {
        return Vec::new();
    };
    let Some(span) = re.captures(&lower).and_then(|c| c.get(1)) else {
        return Vec::new();
    };

    let span = span.as_str().trim();
    if span.contains("team") {
        return Vec::new();
    }
    split_names(span)
}

/// Extract a date range from free text
#[must_use]
pub fn extract_date_range(text: &str) -> Option<DateRange> {
    let lower = text.to_lowercase();
    let caps = TEXT_DATE_RANGE.as_ref()?.captures(&lower)?;
    Some(DateRange::new(
        caps.get(1)?.as_str(),
        caps.get(2)?.as_str(),
    ))
}

/// Extract the worklog date bounds from generated JQL
#[must_use]
pub fn extract_date_range_from_jql(jql: &str) -> Option<DateRange> {
    let caps = JQL_WORKLOG_DATES.as_ref()?.captures(jql)?;
    Some(DateRange::new(
        caps.get(1)?.as_str(),
        caps.get(2)?.as_str(),
    ))
}

/// Split a JQL `in (...)` value list into cleaned entries
fn split_value_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|v| v.trim().trim_matches('"').trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Extract names from a single-or-multi value capture pair
fn names_from_captures(caps: &regex::Captures<'_>) -> Vec<String> {
    caps.get(1).map_or_else(
        || {
            caps.get(2)
                .map_or_else(Vec::new, |list| split_value_list(list.as_str()))
        },
        |single| vec![single.as_str().to_owned()],
    )
}

/// Extract worklog author names from generated JQL
#[must_use]
pub fn extract_worklog_authors_from_jql(jql: &str) -> Vec<String> {
    JQL_WORKLOG_AUTHORS.as_ref().map_or_else(Vec::new, |re| {
        re.captures(jql)
            .map_or_else(Vec::new, |caps| names_from_captures(&caps))
    })
}

/// Extract assignee names from generated JQL
#[must_use]
pub fn extract_assignees_from_jql(jql: &str) -> Vec<String> {
    JQL_ASSIGNEES.as_ref().map_or_else(Vec::new, |re| {
        re.captures(jql)
            .map_or_else(Vec::new, |caps| names_from_captures(&caps))
    })
}

/// Extract team-scoped field identifiers from generated JQL
#[must_use]
pub fn extract_team_ids_from_jql(jql: &str) -> Vec<String> {
    JQL_TEAM_IDS.as_ref().map_or_else(Vec::new, |re| {
        re.captures(jql)
            .map_or_else(Vec::new, |caps| names_from_captures(&caps))
    })
}

/// Extract assignee names from story-point phrasing in free text
///
/// Matches `story points (for|of|assigned to) <names>` or a bare
/// `assigned to <names>`, stopping before a trailing sprint clause; splits
/// the span on `and`/comma.
#[must_use]
pub fn extract_story_point_assignees(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let span = POINTS_ASSIGNEES
        .as_ref()
        .and_then(|re| re.captures(&lower))
        .or_else(|| {
            POINTS_ASSIGNED_TO
                .as_ref()
                .and_then(|re| re.captures(&lower))
        })
        .and_then(|caps| caps.get(1).map(|m| m.as_str().to_owned()));

    span.map_or_else(Vec::new, |span| split_names(&span))
}

/// Extract a sprint name, preferring the JQL clause over free text
#[must_use]
pub fn extract_sprint_name(text: &str, jql: Option<&str>) -> Option<String> {
    if let Some(jql) = jql {
        if let Some(caps) = JQL_SPRINT.as_ref().and_then(|re| re.captures(jql)) {
            return caps.get(1).map(|m| m.as_str().trim().to_owned());
        }
    }

    TEXT_SPRINT
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|s| !s.is_empty())
}

/// Extract all entities from a query and its generated JQL
///
/// The JQL signal wins for names and dates when present; free text fills the
/// gaps.
#[must_use]
pub fn extract_entities(text: &str, jql: Option<&str>) -> ExtractedEntities {
    let mut user_names = jql
        .map(extract_worklog_authors_from_jql)
        .unwrap_or_default();
    if user_names.is_empty() {
        if let Some(jql) = jql {
            user_names = extract_assignees_from_jql(jql);
        }
    }
    if user_names.is_empty() {
        user_names = extract_user_names(text);
    }

    let date_range = jql
        .and_then(extract_date_range_from_jql)
        .or_else(|| extract_date_range(text));

    ExtractedEntities {
        user_names,
        team_ids: jql.map(extract_team_ids_from_jql).unwrap_or_default(),
        date_range,
        sprint_name: extract_sprint_name(text, jql),
        issue_keys: extract_issue_keys(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_key_extraction_uppercases() {
        assert_eq!(extract_issue_keys("look at msc-137637"), vec!["MSC-137637"]);
        assert_eq!(
            extract_issue_keys("MSC-1 and ABC-22"),
            vec!["MSC-1", "ABC-22"]
        );
        assert!(extract_issue_keys("no keys here").is_empty());
    }

    #[test]
    fn test_user_name_extraction_splits_on_and_and_comma() {
        let names =
            extract_user_names("worklog hours of John Smith and Jane Doe between 2025-01-01 and 2025-01-31");
        assert_eq!(names, vec!["john smith", "jane doe"]);

        let names = extract_user_names("hours for alice, bob from 2025-01-01 to 2025-02-01");
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn test_team_reference_is_not_a_user_name() {
        let names = extract_user_names(
            "worklog hours for the platform team between 2025-01-01 and 2025-01-31",
        );
        assert!(names.is_empty());
    }

    #[test]
    fn test_date_range_extraction_variants() {
        let range = extract_date_range("between 2025-07-01 and 2025-08-01");
        assert_eq!(range, Some(DateRange::new("2025-07-01", "2025-08-01")));

        let range = extract_date_range("for the period of 2025-07-01 to 2025-08-01");
        assert_eq!(range, Some(DateRange::new("2025-07-01", "2025-08-01")));

        assert_eq!(extract_date_range("last week"), None);
    }

    #[test]
    fn test_jql_worklog_author_extraction() {
        assert_eq!(
            extract_worklog_authors_from_jql(r#"worklogAuthor = "john" AND worklogDate >= "2025-01-01""#),
            vec!["john"]
        );
        assert_eq!(
            extract_worklog_authors_from_jql(r#"worklogAuthor in ("john", "jane")"#),
            vec!["john", "jane"]
        );
    }

    #[test]
    fn test_jql_date_range_extraction() {
        let jql = r#"worklogAuthor = "john" AND worklogDate >= "2025-07-01" AND worklogDate <= "2025-08-01""#;
        assert_eq!(
            extract_date_range_from_jql(jql),
            Some(DateRange::new("2025-07-01", "2025-08-01"))
        );
    }

    #[test]
    fn test_team_id_extraction_single_and_multi() {
        assert_eq!(
            extract_team_ids_from_jql(r#"Team[Team] = "24c7b803-dec0-4cd2-8115-513ed000d487-216""#),
            vec!["24c7b803-dec0-4cd2-8115-513ed000d487-216"]
        );
        assert_eq!(
            extract_team_ids_from_jql(r#"Team[Team] IN ("abc-123", "def-456") AND worklogDate >= "2025-07-01""#),
            vec!["abc-123", "def-456"]
        );
    }

    #[test]
    fn test_sprint_name_prefers_jql() {
        let sprint = extract_sprint_name(
            "story points in sprint TEAM 25.3.5",
            Some(r#"Sprint = "TEAM 25.3.6""#),
        );
        assert_eq!(sprint.as_deref(), Some("TEAM 25.3.6"));

        let sprint = extract_sprint_name("story points in sprint TEAM 25.3.5", None);
        assert_eq!(sprint.as_deref(), Some("TEAM 25.3.5"));
    }

    #[test]
    fn test_extract_entities_prefers_jql_signal() {
        let jql = r#"worklogAuthor in ("John Smith") AND worklogDate >= "2025-07-01" AND worklogDate <= "2025-08-01""#;
        let entities = extract_entities("worklog hours of someone else from 2025-01-01 to 2025-02-01", Some(jql));

        assert_eq!(entities.user_names, vec!["John Smith"]);
        assert_eq!(
            entities.date_range,
            Some(DateRange::new("2025-07-01", "2025-08-01"))
        );
    }
}
