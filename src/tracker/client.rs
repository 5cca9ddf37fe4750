// ABOUTME: REST search client for Jira-compatible trackers with basic authentication
// ABOUTME: Implements the SearchClient seam used by the aggregation engine and orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Tracker Search Client
//!
//! A thin `reqwest` wrapper over the tracker's search endpoint. Credentials
//! come from [`TrackerConfig`]; authentication is HTTP basic with the account
//! email and API token. The client applies explicit request and connect
//! timeouts — the tracker is on every request path, so a hung upstream must
//! not hang the service.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder};
use tracing::{debug, error};

use super::models::SearchResponse;
use crate::config::TrackerConfig;
use crate::constants::{endpoints, service_names, timeouts};
use crate::errors::{AppError, AppResult, ErrorCode};

/// Contract for issue search backends
///
/// The aggregation engine and orchestrator depend on this trait so tests can
/// substitute canned responses for the HTTP client.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Run a JQL search
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker is unreachable or rejects the query.
    async fn search(
        &self,
        jql: &str,
        max_results: u32,
        fields: &str,
    ) -> AppResult<SearchResponse>;

    /// Check tracker reachability and credential validity
    ///
    /// # Errors
    ///
    /// Returns an error if the probe request cannot be sent.
    async fn health_check(&self) -> AppResult<bool>;
}

/// REST client for Jira-compatible trackers
pub struct JiraClient {
    base_url: String,
    client: Client,
}

impl JiraClient {
    /// Build a client from tracker configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the credential header or HTTP client cannot be
    /// constructed.
    pub fn from_config(config: &TrackerConfig) -> AppResult<Self> {
        let token = BASE64.encode(format!("{}:{}", config.email, config.api_token));
        let mut auth_value = HeaderValue::from_str(&format!("Basic {token}"))
            .map_err(|e| AppError::config(format!("invalid tracker credentials: {e}")))?;
        auth_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = ClientBuilder::new()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeouts::TRACKER_REQUEST_SECS))
            .connect_timeout(Duration::from_secs(timeouts::CONNECT_SECS))
            .build()
            .map_err(|e| AppError::config(format!("failed to build tracker client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }
}

#[async_trait]
impl SearchClient for JiraClient {
    async fn search(
        &self,
        jql: &str,
        max_results: u32,
        fields: &str,
    ) -> AppResult<SearchResponse> {
        let url = format!("{}{}", self.base_url, endpoints::TRACKER_SEARCH_PATH);

        debug!(jql, max_results, "running tracker search");

        let max_results = max_results.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("jql", jql),
                ("maxResults", max_results.as_str()),
                ("fields", fields),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "tracker request failed");
                AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("unable to connect to tracker: {e}"),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "tracker search rejected");
            return Err(AppError::external_service(
                service_names::TRACKER,
                format!("search failed with status {status}: {body}"),
            ));
        }

        let page: SearchResponse = response.json().await.map_err(|e| {
            AppError::new(
                ErrorCode::SerializationError,
                format!("failed to parse tracker response: {e}"),
            )
        })?;

        debug!(issues = page.issues.len(), total = page.total, "tracker search complete");
        Ok(page)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let url = format!("{}{}", self.base_url, endpoints::TRACKER_MYSELF_PATH);

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!("tracker health probe failed: {e}"),
            )
        })?;

        Ok(response.status().is_success())
    }
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
