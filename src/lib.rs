// ABOUTME: Main library entry point for the JQL assistant translation service
// ABOUTME: Turns natural-language tracker queries into validated JQL plus worklog/story-point analytics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # JQL Assistant
//!
//! A natural-language-to-JQL translation layer in front of a Jira-compatible
//! REST API, with worklog-hour and story-point aggregation.
//!
//! ## Features
//!
//! - **LLM translation**: Google Gemini generates JQL from free text against a
//!   cached, system-instruction-bound model handle
//! - **Rule-based fallback**: a deterministic pattern cascade approximates the
//!   same translation when the LLM is unavailable or returns malformed output
//! - **Default scope filter**: generated queries are scoped to the current
//!   sprint unless the query opts out
//! - **Aggregation**: per-user worklog hours and per-assignee story points,
//!   bucketed by status category
//!
//! ## Architecture
//!
//! - **`jql`**: entity extraction, fallback rule table, default-filter
//!   augmentation, and the cached LLM generator
//! - **`llm`**: provider abstraction and the Gemini client
//! - **`tracker`**: typed issue models and the search client
//! - **`intelligence`**: worklog and story-point reducers
//! - **`orchestrator`**: query classification and response assembly
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use jql_assistant::config::environment::ServerConfig;
//! use jql_assistant::errors::AppResult;
//! use jql_assistant::orchestrator::QueryOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     let orchestrator = QueryOrchestrator::from_config(&config)?;
//!     let outcome = orchestrator.handle_query("bugs for john").await?;
//!     println!("{}", outcome.jql);
//!     Ok(())
//! }
//! ```

/// Configuration management and environment parsing
pub mod config;

/// Application-wide constants and limits
pub mod constants;

/// Unified error handling types
pub mod errors;

/// Worklog-hour and story-point aggregation engines
pub mod intelligence;

/// JQL generation pipeline: extraction, fallback rules, augmentation, caching
pub mod jql;

/// LLM provider abstraction and the Gemini client
pub mod llm;

/// Structured logging configuration
pub mod logging;

/// Query classification and response assembly
pub mod orchestrator;

/// Issue tracker REST client and typed models
pub mod tracker;

/// Token usage accounting for LLM calls
pub mod usage;
