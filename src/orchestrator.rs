// ABOUTME: Query orchestrator classifying free-text queries and assembling full responses
// ABOUTME: Wires the generator, tracker client, and aggregation engines behind one entry point
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Query Orchestrator
//!
//! The request handler behind the search endpoint, minus the HTTP wiring:
//!
//! 1. Reject empty queries
//! 2. Translate free text to JQL (never fails)
//! 3. Classify as worklog-related, story-points-related, or general
//! 4. Extract names/dates/sprint from both the raw text and the generated
//!    JQL — the JQL signal wins, it already reflects disambiguation
//! 5. Run the matching aggregation and the issue fetch
//! 6. Assemble the outcome with timing metadata

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{QueryLimits, ServerConfig, StoryPointFields};
use crate::errors::{AppError, AppResult};
use crate::intelligence::{
    calculate_story_points, calculate_worklog_hours, StoryPointsSummary, WorklogSummary,
};
use crate::jql::extract::{
    extract_assignees_from_jql, extract_date_range, extract_date_range_from_jql,
    extract_sprint_name, extract_story_point_assignees, extract_user_names,
    extract_worklog_authors_from_jql,
};
use crate::jql::{DateRange, JqlGenerator};
use crate::tracker::{Issue, JiraClient, SearchClient, GENERAL_FIELDS};
use crate::usage::{TokenUsageStats, UsageTracker};

/// Request metadata attached to every outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMetadata {
    /// The original free-text query
    pub query: String,
    /// Whether the worklog reducer ran
    #[serde(rename = "isWorklogQuery")]
    pub is_worklog_query: bool,
    /// Whether the story-point reducer ran
    #[serde(rename = "isStoryPointsQuery")]
    pub is_story_points_query: bool,
    /// Start of the extracted date range, when present
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    /// End of the extracted date range, when present
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    /// Wall-clock processing time
    #[serde(rename = "processingTimeMs")]
    pub processing_time_ms: u64,
    /// When the request completed
    pub timestamp: DateTime<Utc>,
}

/// Everything a caller needs to render a query response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// The generated JQL
    pub jql: String,
    /// Fetched issues
    pub issues: Vec<Issue>,
    /// Total matches on the server
    pub total: u32,
    /// Per-user worklog totals, for worklog-classified queries
    #[serde(rename = "worklogSummary")]
    pub worklog_summary: Option<Vec<WorklogSummary>>,
    /// Per-assignee story-point totals, for story-point-classified queries
    #[serde(rename = "storyPointsSummary")]
    pub story_points_summary: Option<Vec<StoryPointsSummary>>,
    /// Request metadata
    pub metadata: QueryMetadata,
}

/// Connection health of the external collaborators
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Whether the tracker identity probe succeeded
    pub tracker_connected: bool,
    /// Whether an LLM API key is configured
    pub llm_configured: bool,
}

/// Orchestrates translation, classification, aggregation, and fetching
pub struct QueryOrchestrator {
    generator: JqlGenerator,
    client: Arc<dyn SearchClient>,
    limits: QueryLimits,
    story_point_fields: StoryPointFields,
}

impl QueryOrchestrator {
    /// Build an orchestrator with the real tracker client
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker client cannot be constructed from the
    /// configuration.
    pub fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let client = Arc::new(JiraClient::from_config(&config.tracker)?);
        Ok(Self::with_client(config, client))
    }

    /// Build an orchestrator with an injected search backend
    #[must_use]
    pub fn with_client(config: &ServerConfig, client: Arc<dyn SearchClient>) -> Self {
        let usage = Arc::new(UsageTracker::new());
        Self {
            generator: JqlGenerator::new(config.llm.clone(), usage),
            client,
            limits: config.limits,
            story_point_fields: config.story_point_fields.clone(),
        }
    }

    /// Translate free text to JQL; always succeeds
    pub async fn translate(&self, query: &str) -> String {
        self.generator.generate(query).await
    }

    /// Force the cached model handle to rebuild on the next call
    pub async fn invalidate_cache(&self) {
        self.generator.invalidate().await;
    }

    /// Session token usage totals
    #[must_use]
    pub fn usage_snapshot(&self) -> TokenUsageStats {
        self.generator.usage_snapshot()
    }

    /// Probe the external collaborators
    pub async fn connection_status(&self) -> ConnectionStatus {
        let tracker_connected = self.client.health_check().await.unwrap_or(false);
        ConnectionStatus {
            tracker_connected,
            llm_configured: self.generator.llm_configured(),
        }
    }

    /// Handle a free-text query end to end
    ///
    /// # Errors
    ///
    /// Returns a client error for an empty query and an external-service
    /// error when the issue fetch itself fails. Aggregation failures degrade
    /// to zero-valued summaries instead of erroring.
    pub async fn handle_query(&self, query: &str) -> AppResult<QueryOutcome> {
        let started = Instant::now();

        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::invalid_input(
                "query parameter is required and must be a non-empty string",
            ));
        }

        let jql = self.generator.generate(query).await;
        info!(query, jql = %jql, "translated query");

        let lower = query.to_lowercase();
        let jql_lower = jql.to_lowercase();

        let is_worklog_query = lower.contains("worklog")
            || lower.contains("hours")
            || lower.contains("time spent");
        let is_story_points_query = lower.contains("story point")
            || jql_lower.contains(r#""story points" is not empty"#);

        let mut date_range: Option<DateRange> = None;

        let worklog_summary = if is_worklog_query {
            let (summary, range) = self.run_worklog(query, &jql).await;
            date_range = range;
            summary
        } else {
            None
        };

        let story_points_summary = if is_story_points_query {
            self.run_story_points(query, &jql).await
        } else {
            None
        };

        // Aggregation classes need every matching issue; general queries get
        // a generous page
        let max_results = if is_worklog_query || is_story_points_query {
            self.limits.aggregation_max_results
        } else {
            self.limits.general_max_results
        };

        let page = self.client.search(&jql, max_results, GENERAL_FIELDS).await?;

        Ok(QueryOutcome {
            jql,
            issues: page.issues,
            total: page.total,
            worklog_summary,
            story_points_summary,
            metadata: QueryMetadata {
                query: query.to_owned(),
                is_worklog_query,
                is_story_points_query,
                start_date: date_range.as_ref().map(|r| r.start.clone()),
                end_date: date_range.as_ref().map(|r| r.end.clone()),
                processing_time_ms: started.elapsed().as_millis() as u64,
                timestamp: Utc::now(),
            },
        })
    }

    /// Worklog branch: extract users and dates, then reduce
    ///
    /// The JQL date bounds win over free text. Users extracted without a
    /// date range skip the reduction — an unbounded per-user scan over every
    /// sprint produces misleading totals.
    async fn run_worklog(
        &self,
        query: &str,
        jql: &str,
    ) -> (Option<Vec<WorklogSummary>>, Option<DateRange>) {
        debug!("worklog query detected, extracting filters");

        let mut user_names: Vec<String> = Vec::new();
        let mut date_range: Option<DateRange> = None;

        if let Some(range) = extract_date_range_from_jql(jql) {
            date_range = Some(range);
            user_names = extract_worklog_authors_from_jql(jql);
            if user_names.is_empty() {
                debug!("team or project scoped worklog query, using date range only");
            }
        } else if let (users, Some(range)) =
            (extract_user_names(query), extract_date_range(query))
        {
            user_names = users;
            date_range = Some(range);
        } else {
            debug!("worklog query without user or date filters, showing all entries");
        }

        // Users without a date range means extraction was partial; skip
        if !user_names.is_empty() && date_range.is_none() {
            warn!(query, "could not extract a date range for user-scoped worklog query");
            return (None, None);
        }

        let summary = calculate_worklog_hours(
            self.client.as_ref(),
            jql,
            &user_names,
            date_range.as_ref(),
            self.limits.aggregation_max_results,
        )
        .await;

        (Some(summary), date_range)
    }

    /// Story-point branch: extract assignees and sprint, then reduce
    async fn run_story_points(&self, query: &str, jql: &str) -> Option<Vec<StoryPointsSummary>> {
        debug!("story points query detected, extracting filters");

        let mut assignees = extract_assignees_from_jql(jql);
        if assignees.is_empty() {
            assignees = extract_story_point_assignees(query);
        }

        let sprint = extract_sprint_name(query, Some(jql));

        if assignees.is_empty() && sprint.is_none() {
            warn!(query, "could not extract assignees or sprint for story points query");
            return None;
        }

        let summary = calculate_story_points(
            self.client.as_ref(),
            jql,
            &assignees,
            sprint.as_deref(),
            &self.story_point_fields.fields,
            self.limits.aggregation_max_results,
        )
        .await;

        Some(summary)
    }
}

impl std::fmt::Debug for QueryOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryOrchestrator")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}
