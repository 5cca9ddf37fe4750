// ABOUTME: LLM provider abstraction layer for pluggable generative model integration
// ABOUTME: Defines the chat message types and the provider contract used by the JQL generator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # LLM Provider Interface
//!
//! This module defines the contract an LLM provider must implement to plug
//! into the JQL generation pipeline.
//!
//! ## Key Concepts
//!
//! - **`LlmProvider`**: async trait for chat completion
//! - **`ChatMessage`**: role-based message structure
//! - **`ChatRequest`**: request configuration including model and temperature
//!
//! ## Example: Using a Provider
//!
//! ```rust,no_run
//! use jql_assistant::llm::{ChatMessage, ChatRequest, LlmProvider};
//!
//! async fn example(provider: &dyn LlmProvider) {
//!     let request = ChatRequest::new(vec![ChatMessage::user("Query: \"bugs for john\"\nJQL:")]);
//!     let response = provider.complete(&request).await;
//! }
//! ```

mod gemini;

/// System instruction text for JQL generation
pub mod prompts;

pub use gemini::GeminiProvider;
pub use prompts::jql_system_prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction
    System,
    /// End-user input
    User,
    /// Model output
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role
    pub role: MessageRole,
    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// A chat completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Model override; `None` uses the provider default
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a request with the given messages
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Token usage statistics reported by a provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

/// A chat completion response
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Generated message content
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Token usage, when the provider reports it
    pub usage: Option<TokenUsage>,
    /// Finish reason (stop, length, etc.)
    pub finish_reason: Option<String>,
}

/// Contract for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Machine-readable provider name
    fn name(&self) -> &'static str;

    /// Human-readable provider name
    fn display_name(&self) -> &'static str;

    /// Default model identifier
    fn default_model(&self) -> &str;

    /// Perform a chat completion
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails or the response is malformed.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError>;

    /// Check provider reachability and credential validity
    ///
    /// # Errors
    ///
    /// Returns an error if the health check request cannot be sent.
    async fn health_check(&self) -> Result<bool, AppError>;
}
