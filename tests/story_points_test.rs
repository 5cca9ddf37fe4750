// ABOUTME: Tests for the story-point reducer: status bucketing, field priority probing,
// ABOUTME: and zero-valued fallbacks for missing assignees and failed fetches
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{issue, issue_with_points, MockSearchClient};
use serde_json::json;

use jql_assistant::config::StoryPointFields;
use jql_assistant::intelligence::calculate_story_points;

const JQL: &str = r#"assignee ~ "alice" AND "Story Points" is not EMPTY"#;

fn fields() -> Vec<String> {
    StoryPointFields::default().fields
}

#[tokio::test]
async fn in_review_counts_as_in_progress_not_completed() {
    let client = MockSearchClient::with_issues(vec![issue_with_points(
        "MSC-1",
        "Alice Jones",
        "In Review",
        "customfield_10016",
        5.0,
    )]);

    let targets = vec!["alice".to_owned()];
    let summary =
        calculate_story_points(&client, JQL, &targets, None, &fields(), 1000).await;

    assert_eq!(summary.len(), 1);
    assert!((summary[0].in_progress_story_points - 5.0).abs() < f64::EPSILON);
    assert!(summary[0].completed_story_points.abs() < f64::EPSILON);
    assert!((summary[0].total_story_points - 5.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn status_vocabulary_buckets_points() {
    let client = MockSearchClient::with_issues(vec![
        issue_with_points("MSC-1", "Alice", "Done", "customfield_10016", 3.0),
        issue_with_points("MSC-2", "Alice", "In Progress", "customfield_10016", 5.0),
        issue_with_points("MSC-3", "Alice", "New", "customfield_10016", 8.0),
        issue_with_points("MSC-4", "Alice", "Blocked", "customfield_10016", 2.0),
    ]);

    let targets = vec!["alice".to_owned()];
    let summary =
        calculate_story_points(&client, JQL, &targets, None, &fields(), 1000).await;

    let alice = &summary[0];
    assert!((alice.completed_story_points - 3.0).abs() < f64::EPSILON);
    assert!((alice.in_progress_story_points - 5.0).abs() < f64::EPSILON);
    assert!((alice.todo_story_points - 10.0).abs() < f64::EPSILON);
    assert!((alice.total_story_points - 18.0).abs() < f64::EPSILON);
    assert_eq!(alice.issue_count, 4);
    assert_eq!(alice.issues.len(), 4);
}

#[tokio::test]
async fn preferred_field_beats_fallback_fields() {
    // Both slots carry values; the prioritized field must win
    let client = MockSearchClient::with_issues(vec![issue(
        "MSC-1",
        json!({
            "summary": "dual-slot issue",
            "assignee": {"displayName": "Alice"},
            "status": {"name": "New"},
            "customfield_10130": 8,
            "customfield_10016": 3
        }),
    )]);

    let targets = vec!["alice".to_owned()];
    let summary =
        calculate_story_points(&client, JQL, &targets, None, &fields(), 1000).await;

    assert!((summary[0].total_story_points - 8.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn unpointed_issues_still_count() {
    let client = MockSearchClient::with_issues(vec![issue(
        "MSC-1",
        json!({
            "summary": "no estimate yet",
            "assignee": {"displayName": "Alice"},
            "status": {"name": "New"}
        }),
    )]);

    let targets = vec!["alice".to_owned()];
    let summary =
        calculate_story_points(&client, JQL, &targets, None, &fields(), 1000).await;

    assert_eq!(summary[0].issue_count, 1);
    assert!(summary[0].total_story_points.abs() < f64::EPSILON);
    assert_eq!(summary[0].issues[0].key, "MSC-1");
}

#[tokio::test]
async fn requested_assignees_always_get_an_entry() {
    let client = MockSearchClient::with_issues(vec![issue_with_points(
        "MSC-1",
        "Somebody Else",
        "New",
        "customfield_10016",
        5.0,
    )]);

    let targets = vec!["ghost".to_owned()];
    let summary =
        calculate_story_points(&client, JQL, &targets, None, &fields(), 1000).await;

    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].assignee, "ghost");
    assert_eq!(summary[0].issue_count, 0);
}

#[tokio::test]
async fn fetch_failure_degrades_to_zero_summaries() {
    let client = MockSearchClient::failing();

    let targets = vec!["alice".to_owned(), "bob".to_owned()];
    let summary =
        calculate_story_points(&client, JQL, &targets, None, &fields(), 1000).await;

    assert_eq!(summary.len(), 2);
    for entry in &summary {
        assert!(entry.total_story_points.abs() < f64::EPSILON);
        assert!(entry.issues.is_empty());
    }
}

#[tokio::test]
async fn empty_targets_bucket_every_assignee() {
    let client = MockSearchClient::with_issues(vec![
        issue_with_points("MSC-1", "Alice", "New", "customfield_10016", 5.0),
        issue_with_points("MSC-2", "Bob", "Done", "customfield_10016", 3.0),
        issue(
            "MSC-3",
            json!({"summary": "orphan", "status": {"name": "New"}, "customfield_10016": 1}),
        ),
    ]);

    let summary = calculate_story_points(&client, JQL, &[], None, &fields(), 1000).await;

    assert_eq!(summary.len(), 3);
    let unassigned = summary.iter().find(|s| s.assignee == "Unassigned").unwrap();
    assert!((unassigned.total_story_points - 1.0).abs() < f64::EPSILON);
}
