// ABOUTME: Worklog-hour reducer summing time-log entries per matched user
// ABOUTME: Applies date-prefix filtering, fuzzy author matching, and zero-valued fallbacks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Worklog Aggregation
//!
//! Fetches every issue matching a JQL query and reduces the attached
//! time-log entries into per-user hour totals. An empty target list means
//! "all users": each discovered author gets its own bucket. Requested
//! targets always appear in the output, zero-valued when nothing matched —
//! callers must be able to distinguish "no hours" from "user missing".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{match_target, parse_time_spent};
use crate::constants::work_time;
use crate::jql::DateRange;
use crate::tracker::{SearchClient, WorklogEntry, WORKLOG_FIELDS};

/// Per-user worklog totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorklogSummary {
    /// The requested (or discovered) user name
    pub user: String,
    /// Total hours logged, rounded to 2 decimal places
    #[serde(rename = "totalHours")]
    pub total_hours: f64,
    /// Number of matching log entries
    pub entries: u32,
}

impl WorklogSummary {
    fn zeroed(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            total_hours: 0.0,
            entries: 0,
        }
    }
}

/// Accumulates summaries keyed by user, preserving insertion order
struct SummaryTable {
    order: Vec<String>,
    entries: HashMap<String, WorklogSummary>,
}

impl SummaryTable {
    fn with_targets(targets: &[String]) -> Self {
        let mut table = Self {
            order: Vec::new(),
            entries: HashMap::new(),
        };
        for target in targets {
            table.ensure(target);
        }
        table
    }

    fn ensure(&mut self, user: &str) {
        if !self.entries.contains_key(user) {
            self.order.push(user.to_owned());
            self.entries
                .insert(user.to_owned(), WorklogSummary::zeroed(user));
        }
    }

    fn add(&mut self, user: &str, hours: f64) {
        self.ensure(user);
        if let Some(summary) = self.entries.get_mut(user) {
            summary.total_hours += hours;
            summary.entries += 1;
        }
    }

    fn finish(mut self) -> Vec<WorklogSummary> {
        self.order
            .iter()
            .filter_map(|user| self.entries.remove(user))
            .map(|mut summary| {
                summary.total_hours = (summary.total_hours * 100.0).round() / 100.0;
                summary
            })
            .collect()
    }
}

/// Hours represented by one log entry
///
/// The human-entered string wins over the raw seconds: it reflects the
/// work-calendar units the author meant.
fn entry_hours(entry: &WorklogEntry) -> f64 {
    entry.time_spent.as_deref().map_or_else(
        || {
            entry
                .time_spent_seconds
                .map_or(0.0, |secs| secs / work_time::SECONDS_PER_HOUR)
        },
        parse_time_spent,
    )
}

/// Whether a log entry falls inside the optional date range
///
/// Entries pass when no range is given; an entry with no timestamp cannot be
/// placed and is dropped when a range is requested.
fn entry_in_range(entry: &WorklogEntry, range: Option<&DateRange>) -> bool {
    range.is_none_or(|range| {
        entry
            .started
            .as_deref()
            .is_some_and(|started| range.contains_timestamp(started))
    })
}

/// Calculate per-user worklog hours for all issues matching a query
///
/// Targets are matched against entry authors with bidirectional substring
/// containment. An upstream fetch failure degrades to zero-valued summaries
/// for every requested target rather than an error.
pub async fn calculate_worklog_hours(
    client: &dyn SearchClient,
    jql: &str,
    user_names: &[String],
    date_range: Option<&DateRange>,
    max_results: u32,
) -> Vec<WorklogSummary> {
    debug!(
        jql,
        targets = user_names.len(),
        has_range = date_range.is_some(),
        "calculating worklog hours"
    );

    let page = match client.search(jql, max_results, WORKLOG_FIELDS).await {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, "worklog fetch failed, returning zero-valued summaries");
            return user_names.iter().map(WorklogSummary::zeroed).collect();
        }
    };

    let mut table = SummaryTable::with_targets(user_names);
    let mut processed = 0_u32;
    let mut in_range = 0_u32;

    for issue in &page.issues {
        let Some(worklog) = issue.fields.worklog.as_ref() else {
            continue;
        };
        for entry in &worklog.worklogs {
            processed += 1;
            if !entry_in_range(entry, date_range) {
                continue;
            }
            in_range += 1;

            let Some(author) = entry
                .author
                .as_ref()
                .and_then(|a| a.display_name.as_deref())
            else {
                continue;
            };

            let matched = if user_names.is_empty() {
                Some(author)
            } else {
                match_target(author, user_names)
            };

            if let Some(user) = matched {
                let user = user.to_owned();
                table.add(&user, entry_hours(entry));
            }
        }
    }

    let results = table.finish();
    debug!(
        processed,
        in_range,
        users = results.len(),
        "worklog aggregation complete"
    );
    results
}
