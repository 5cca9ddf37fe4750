// ABOUTME: Issue tracker integration: typed search models and the REST search client
// ABOUTME: Exposes the SearchClient trait so aggregation logic can run against mock backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Issue Tracker Integration
//!
//! The tracker is an external collaborator: the pipeline sends it a JQL
//! string, a result cap, and a field selection, and gets back a page of
//! issues with nested field objects. [`SearchClient`] is the seam — the
//! aggregation engine depends on the trait, not on the HTTP implementation.

/// REST search client implementation
pub mod client;

/// Typed issue models with open-ended custom field support
pub mod models;

pub use client::{JiraClient, SearchClient};
pub use models::{
    Issue, IssueFields, NamedField, SearchResponse, Sprint, UserRef, WorklogEntry, WorklogField,
};

/// Field selection for general search queries
pub const GENERAL_FIELDS: &str = "summary,description,status,priority,assignee,reporter,created,updated,issuetype,project,sprint,worklog,customfield_10020,customfield_10021,customfield_10016,Story Points";

/// Field selection for worklog aggregation queries
pub const WORKLOG_FIELDS: &str = "worklog,key,summary";

/// Field selection for story-point aggregation queries
///
/// Point values live in varying custom-field slots depending on tracker
/// configuration, so these queries fetch every field and probe.
pub const ALL_FIELDS: &str = "*all";
