// ABOUTME: Story-point reducer rolling up points per assignee bucketed by status category
// ABOUTME: Probes prioritized custom fields for point values and tracks per-assignee issue lists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Story-Point Aggregation
//!
//! Fetches every issue matching a JQL query, resolves each issue's point
//! value by probing the configured field priority list, and accumulates
//! totals per matched assignee. Status names categorize points into
//! completed / in-progress / todo buckets by substring against known status
//! vocabularies. Issues without points still count toward `issue_count` so
//! the rollup reflects the full workload.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::match_target;
use crate::tracker::{SearchClient, ALL_FIELDS};

/// Where an issue's points land based on its workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    /// Done, closed, or resolved
    Completed,
    /// In progress, in review, or in development
    InProgress,
    /// Everything else: new, to do, open, blocked, ...
    Todo,
}

/// Categorize a status name by substring against known vocabularies
#[must_use]
pub fn categorize_status(status_name: &str) -> StatusCategory {
    let status = status_name.to_lowercase();
    if status.contains("done") || status.contains("closed") || status.contains("resolved") {
        StatusCategory::Completed
    } else if status.contains("progress")
        || status.contains("review")
        || status.contains("development")
    {
        StatusCategory::InProgress
    } else {
        StatusCategory::Todo
    }
}

/// A single issue inside a per-assignee rollup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRollup {
    /// Issue key
    pub key: String,
    /// Issue summary
    pub summary: String,
    /// Resolved point value
    #[serde(rename = "storyPoints")]
    pub story_points: f64,
    /// Status name at fetch time
    pub status: String,
}

/// Per-assignee story-point totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryPointsSummary {
    /// The requested (or discovered) assignee name
    pub assignee: String,
    /// All points across matched issues
    #[serde(rename = "totalStoryPoints")]
    pub total_story_points: f64,
    /// Points on completed issues
    #[serde(rename = "completedStoryPoints")]
    pub completed_story_points: f64,
    /// Points on in-progress issues
    #[serde(rename = "inProgressStoryPoints")]
    pub in_progress_story_points: f64,
    /// Points on todo issues
    #[serde(rename = "todoStoryPoints")]
    pub todo_story_points: f64,
    /// Number of matched issues, with or without points
    #[serde(rename = "issueCount")]
    pub issue_count: u32,
    /// The matched issues themselves
    pub issues: Vec<IssueRollup>,
}

impl StoryPointsSummary {
    fn zeroed(assignee: impl Into<String>) -> Self {
        Self {
            assignee: assignee.into(),
            total_story_points: 0.0,
            completed_story_points: 0.0,
            in_progress_story_points: 0.0,
            todo_story_points: 0.0,
            issue_count: 0,
            issues: Vec::new(),
        }
    }

    fn add(&mut self, rollup: IssueRollup) {
        self.total_story_points += rollup.story_points;
        self.issue_count += 1;
        match categorize_status(&rollup.status) {
            StatusCategory::Completed => self.completed_story_points += rollup.story_points,
            StatusCategory::InProgress => self.in_progress_story_points += rollup.story_points,
            StatusCategory::Todo => self.todo_story_points += rollup.story_points,
        }
        self.issues.push(rollup);
    }
}

/// Calculate per-assignee story points for all issues matching a query
///
/// Targets are matched against issue assignees with bidirectional substring
/// containment; an empty target list buckets by discovered assignee. An
/// upstream fetch failure degrades to zero-valued summaries for every
/// requested target rather than an error. The sprint name is informational —
/// sprint filtering already happened in the JQL.
pub async fn calculate_story_points(
    client: &dyn SearchClient,
    jql: &str,
    assignee_names: &[String],
    sprint_name: Option<&str>,
    field_priority: &[String],
    max_results: u32,
) -> Vec<StoryPointsSummary> {
    debug!(
        jql,
        targets = assignee_names.len(),
        sprint = sprint_name.unwrap_or("-"),
        "calculating story points"
    );

    let page = match client.search(jql, max_results, ALL_FIELDS).await {
        Ok(page) => page,
        Err(e) => {
            warn!(error = %e, "story point fetch failed, returning zero-valued summaries");
            return assignee_names
                .iter()
                .map(StoryPointsSummary::zeroed)
                .collect();
        }
    };

    let mut order: Vec<String> = Vec::new();
    let mut summaries: std::collections::HashMap<String, StoryPointsSummary> =
        std::collections::HashMap::new();
    for name in assignee_names {
        order.push(name.clone());
        summaries.insert(name.clone(), StoryPointsSummary::zeroed(name));
    }

    let mut with_points = 0_u32;

    for issue in &page.issues {
        let assignee = issue.fields.assignee_name();
        let status = issue.fields.status_name().to_owned();
        let points = issue.fields.story_points(field_priority);

        let matched = if assignee_names.is_empty() {
            Some(assignee)
        } else {
            match_target(assignee, assignee_names)
        };

        let Some(matched) = matched.map(ToOwned::to_owned) else {
            continue;
        };

        if !summaries.contains_key(&matched) {
            order.push(matched.clone());
            summaries.insert(matched.clone(), StoryPointsSummary::zeroed(&matched));
        }

        if points > 0.0 {
            with_points += 1;
        }

        if let Some(summary) = summaries.get_mut(&matched) {
            summary.add(IssueRollup {
                key: issue.key.clone(),
                summary: issue.fields.summary_text().to_owned(),
                story_points: points,
                status,
            });
        }
    }

    let results: Vec<StoryPointsSummary> = order
        .iter()
        .filter_map(|name| summaries.remove(name))
        .collect();

    debug!(
        issues = page.issues.len(),
        with_points,
        assignees = results.len(),
        "story point aggregation complete"
    );
    results
}
