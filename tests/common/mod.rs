// ABOUTME: Shared test fixtures: a mock search backend and issue builders
// ABOUTME: Lets aggregation and orchestrator tests run against canned tracker pages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};

use jql_assistant::config::{LlmConfig, QueryLimits, ServerConfig, StoryPointFields, TrackerConfig};
use jql_assistant::config::{Environment, LogLevel};
use jql_assistant::errors::{AppError, AppResult};
use jql_assistant::tracker::{Issue, SearchClient, SearchResponse};

/// A search backend serving one canned page, or failing on demand
pub struct MockSearchClient {
    pub page: SearchResponse,
    pub fail: bool,
}

impl MockSearchClient {
    pub fn with_issues(issues: Vec<Issue>) -> Self {
        let total = issues.len() as u32;
        Self {
            page: SearchResponse {
                issues,
                total,
                max_results: 1000,
                start_at: 0,
            },
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            page: SearchResponse::default(),
            fail: true,
        }
    }
}

#[async_trait]
impl SearchClient for MockSearchClient {
    async fn search(
        &self,
        _jql: &str,
        _max_results: u32,
        _fields: &str,
    ) -> AppResult<SearchResponse> {
        if self.fail {
            Err(AppError::external_service("tracker", "connection refused"))
        } else {
            Ok(self.page.clone())
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.fail)
    }
}

/// Build an issue from a JSON fields payload
pub fn issue(key: &str, fields: Value) -> Issue {
    serde_json::from_value(json!({
        "id": "10000",
        "key": key,
        "fields": fields
    }))
    .unwrap()
}

/// Build an issue carrying worklog entries: `(author, time_spent, started)`
pub fn issue_with_worklogs(key: &str, entries: &[(&str, Value, &str)]) -> Issue {
    let worklogs: Vec<Value> = entries
        .iter()
        .map(|(author, time, started)| {
            let mut entry = json!({
                "author": {"displayName": author, "emailAddress": "dev@example.com"},
                "started": started
            });
            if let Some(obj) = entry.as_object_mut() {
                if time.is_string() {
                    obj.insert("timeSpent".to_owned(), time.clone());
                } else {
                    obj.insert("timeSpentSeconds".to_owned(), time.clone());
                }
            }
            entry
        })
        .collect();

    issue(
        key,
        json!({
            "summary": "logged work",
            "worklog": {"worklogs": worklogs, "total": worklogs.len()}
        }),
    )
}

/// Build an issue carrying a story-point value in the given field
pub fn issue_with_points(
    key: &str,
    assignee: &str,
    status: &str,
    field: &str,
    points: f64,
) -> Issue {
    issue(
        key,
        json!({
            "summary": format!("work for {assignee}"),
            "assignee": {"displayName": assignee, "emailAddress": "dev@example.com"},
            "status": {"name": status, "id": "1"},
            field: points
        }),
    )
}

/// A server configuration with dummy tracker credentials and no LLM key
pub fn offline_config() -> ServerConfig {
    ServerConfig {
        environment: Environment::Testing,
        log_level: LogLevel::Info,
        tracker: TrackerConfig {
            base_url: "https://example.atlassian.net".to_owned(),
            email: "dev@example.com".to_owned(),
            api_token: "token".to_owned(),
        },
        llm: LlmConfig::default(),
        limits: QueryLimits::default(),
        story_point_fields: StoryPointFields::default(),
    }
}
