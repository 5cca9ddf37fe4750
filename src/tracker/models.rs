// ABOUTME: Typed issue models for tracker search responses with flattened custom fields
// ABOUTME: Provides sprint resolution and prioritized story-point field probing helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Tracker Models
//!
//! Issue records carry open-ended custom fields whose names are
//! tenant-specific. Well-known fields are typed; everything else lands in a
//! flattened key-value map the helpers probe with explicit numeric/string
//! handling, so the aggregation engine never touches raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A page of search results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching issues
    #[serde(default)]
    pub issues: Vec<Issue>,
    /// Total number of matches on the server
    #[serde(default)]
    pub total: u32,
    /// Result cap the server applied
    #[serde(default, rename = "maxResults")]
    pub max_results: u32,
    /// Page offset
    #[serde(default, rename = "startAt")]
    pub start_at: u32,
}

/// A single issue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issue {
    /// Tracker-internal ID
    #[serde(default)]
    pub id: String,
    /// Issue key, e.g. `MSC-137637`
    #[serde(default)]
    pub key: String,
    /// Nested field payload
    #[serde(default)]
    pub fields: IssueFields,
}

/// A field object carrying a name and ID (status, priority, issue type)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedField {
    /// Display name
    pub name: Option<String>,
    /// Tracker-internal ID
    pub id: Option<String>,
}

/// A user reference (assignee, reporter, worklog author)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRef {
    /// Display name
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    /// Email address
    #[serde(rename = "emailAddress")]
    pub email_address: Option<String>,
}

/// A resolved sprint reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
    /// Sprint ID
    pub id: i64,
    /// Sprint name
    pub name: String,
    /// Sprint state (active, closed, future)
    pub state: String,
}

/// A single time log entry on an issue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorklogEntry {
    /// Who logged the time
    pub author: Option<UserRef>,
    /// Human-entered duration, e.g. `"1d 4h 30m"`
    #[serde(rename = "timeSpent")]
    pub time_spent: Option<String>,
    /// Duration in seconds, used when the string form is absent
    #[serde(rename = "timeSpentSeconds")]
    pub time_spent_seconds: Option<f64>,
    /// ISO timestamp the work started
    pub started: Option<String>,
}

/// The worklog container field on an issue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorklogField {
    /// Individual entries
    #[serde(default)]
    pub worklogs: Vec<WorklogEntry>,
    /// Total entry count on the server
    #[serde(default)]
    pub total: u32,
}

/// Issue fields: typed well-known fields plus a flattened custom-field map
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    /// One-line summary
    pub summary: Option<String>,
    /// Rich-text description document
    pub description: Option<Value>,
    /// Workflow status
    pub status: Option<NamedField>,
    /// Priority
    pub priority: Option<NamedField>,
    /// Current assignee
    pub assignee: Option<UserRef>,
    /// Reporter
    pub reporter: Option<UserRef>,
    /// Creation timestamp
    pub created: Option<String>,
    /// Last update timestamp
    pub updated: Option<String>,
    /// Issue type
    #[serde(rename = "issuetype")]
    pub issue_type: Option<NamedField>,
    /// Sprint field as delivered by the server (object or array)
    pub sprint: Option<Value>,
    /// Time log container
    pub worklog: Option<WorklogField>,
    /// Everything else, including tenant-specific custom fields
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

/// Alternative custom-field slots the sprint may live in
const SPRINT_FIELD_CANDIDATES: &[&str] = &["customfield_10020", "customfield_10021"];

impl IssueFields {
    /// Status display name, defaulting to "Unknown"
    #[must_use]
    pub fn status_name(&self) -> &str {
        self.status
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .unwrap_or("Unknown")
    }

    /// Assignee display name, defaulting to "Unassigned"
    #[must_use]
    pub fn assignee_name(&self) -> &str {
        self.assignee
            .as_ref()
            .and_then(|a| a.display_name.as_deref())
            .unwrap_or("Unassigned")
    }

    /// Summary text, defaulting to "No summary"
    #[must_use]
    pub fn summary_text(&self) -> &str {
        self.summary.as_deref().unwrap_or("No summary")
    }

    /// Look up a raw field value by name in the custom-field map
    #[must_use]
    pub fn custom_value(&self, name: &str) -> Option<&Value> {
        self.custom.get(name)
    }

    /// Numeric value of a field, accepting numbers and numeric strings
    #[must_use]
    pub fn numeric_field(&self, name: &str) -> Option<f64> {
        match self.custom.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Resolve the story-point value by probing a prioritized field list
    ///
    /// The first field holding a numeric value greater than zero wins;
    /// issues with no match contribute zero points.
    #[must_use]
    pub fn story_points(&self, field_priority: &[String]) -> f64 {
        field_priority
            .iter()
            .filter_map(|name| self.numeric_field(name))
            .find(|points| *points > 0.0)
            .unwrap_or(0.0)
    }

    /// Resolve the sprint across its possible field locations
    ///
    /// Tries the dedicated field first, then the known custom-field slots.
    /// Arrays hold the sprint history; the last entry is the current one.
    #[must_use]
    pub fn sprint(&self) -> Option<Sprint> {
        let raw = self
            .sprint
            .as_ref()
            .or_else(|| {
                SPRINT_FIELD_CANDIDATES
                    .iter()
                    .find_map(|name| self.custom.get(*name))
            })?
            .clone();

        let obj = match raw {
            Value::Array(entries) => entries.into_iter().last()?,
            other => other,
        };

        let map = obj.as_object()?;
        Some(Sprint {
            id: map.get("id").and_then(Value::as_i64).unwrap_or(0),
            name: map
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("Unknown Sprint")
                .to_owned(),
            state: map
                .get("state")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_owned(),
        })
    }
}
