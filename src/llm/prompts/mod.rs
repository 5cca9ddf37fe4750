// ABOUTME: System prompts for LLM interactions loaded at compile time
// ABOUTME: Provides the JQL generation system instruction bound to the cached Gemini handle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # System Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy
//! maintenance. The JQL instruction is bound once to the cached model handle,
//! so each generation call only pays for the user query.

/// JQL generation system instruction
///
/// Contains the translation rules the model must follow:
/// - Field and operator vocabulary
/// - Status, priority, and type value sets
/// - Default sprint scoping and backlog handling
/// - Worklog and story-point query conventions
/// - Worked examples
pub const JQL_SYSTEM_PROMPT: &str = include_str!("jql_system.md");

/// Get the system instruction for JQL generation
#[must_use]
pub const fn jql_system_prompt() -> &'static str {
    JQL_SYSTEM_PROMPT
}
