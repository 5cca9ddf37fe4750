// ABOUTME: Configuration module grouping environment parsing and typed settings
// ABOUTME: Re-exports the server configuration used by the orchestrator and clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Configuration management for the JQL assistant

/// Environment-based configuration parsing
pub mod environment;

pub use environment::{
    Environment, LlmConfig, LogLevel, QueryLimits, ServerConfig, StoryPointFields, TrackerConfig,
};
