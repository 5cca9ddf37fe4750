// ABOUTME: Cached LLM query generator translating free text to JQL with a never-fails contract
// ABOUTME: Owns the hourly-refreshed Gemini handle, token accounting, and fallback delegation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # JQL Generator
//!
//! Owns the cached Gemini model handle: created lazily on first use, bound
//! once to the JQL system instruction, rebuilt after an hour, and cleared by
//! [`JqlGenerator::invalidate`] (done once at process startup so deployed
//! instruction updates take effect immediately).
//!
//! The external contract of [`JqlGenerator::generate`] is *always returns a
//! usable JQL string, never errors*: a missing API key, a malformed model
//! response, or any transport failure degrades to the rule-based fallback
//! builder.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::augment::with_default_sprint_filter;
use super::fallback::fallback_jql;
use super::is_valid_jql_shape;
use crate::config::LlmConfig;
use crate::constants::limits;
use crate::errors::{AppError, AppResult};
use crate::llm::{jql_system_prompt, ChatMessage, ChatRequest, GeminiProvider, LlmProvider};
use crate::usage::{TokenUsageStats, UsageTracker};

/// A model handle bound to the JQL system instruction, with its creation time
struct CachedModel {
    provider: Arc<GeminiProvider>,
    created_at: Instant,
}

/// Natural-language-to-JQL generator with a cached model handle
pub struct JqlGenerator {
    config: LlmConfig,
    handle: RwLock<Option<CachedModel>>,
    usage: Arc<UsageTracker>,
}

impl JqlGenerator {
    /// Create a generator from LLM settings and a shared usage tracker
    #[must_use]
    pub fn new(config: LlmConfig, usage: Arc<UsageTracker>) -> Self {
        Self {
            config,
            handle: RwLock::new(None),
            usage,
        }
    }

    /// Translate a free-text query into JQL
    ///
    /// Never errors: any failure along the LLM path falls back to the
    /// rule-based builder, which always produces a query.
    pub async fn generate(&self, query: &str) -> String {
        match self.generate_via_model(query).await {
            Ok(jql) => jql,
            Err(e) => {
                warn!(error = %e, "LLM generation unavailable, using rule-based fallback");
                fallback_jql(query)
            }
        }
    }

    /// Drop the cached handle so the next call rebuilds it
    ///
    /// Called once at process startup to guarantee freshly-deployed system
    /// instructions take effect, and exposed as an operator action.
    pub async fn invalidate(&self) {
        let mut guard = self.handle.write().await;
        *guard = None;
        info!("model cache invalidated - next query will create a fresh handle");
    }

    /// Get a snapshot of the session token usage totals
    #[must_use]
    pub fn usage_snapshot(&self) -> TokenUsageStats {
        self.usage.snapshot()
    }

    /// Whether the LLM path is configured at all
    #[must_use]
    pub const fn llm_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Full LLM path: cached handle, generation, cleanup, validation, scoping
    async fn generate_via_model(&self, query: &str) -> AppResult<String> {
        let provider = self.cached_model().await?;

        // The system instruction is bound to the handle; only the user query
        // is sent per call.
        let user_prompt = format!("Query: \"{query}\"\nJQL:");
        let request = ChatRequest::new(vec![ChatMessage::user(user_prompt.clone())])
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_output_tokens);

        let response = provider.complete(&request).await?;

        let jql = strip_markdown_fences(&response.content);

        let record = self
            .usage
            .record(&user_prompt, &jql, response.usage.as_ref());
        debug!(
            input_tokens = record.input_tokens,
            output_tokens = record.output_tokens,
            "recorded token usage"
        );

        if jql.len() < limits::MIN_JQL_LENGTH {
            return Err(AppError::invalid_input(
                "generated JQL is too short or empty",
            ));
        }
        if !is_valid_jql_shape(&jql) {
            return Err(AppError::invalid_input(
                "generated JQL does not match the expected structure",
            ));
        }

        debug!(jql = %jql, "generated JQL via LLM");
        Ok(with_default_sprint_filter(&jql, query))
    }

    /// Get the cached model handle, rebuilding it when absent or expired
    ///
    /// The expiry check and rebuild happen under one write lock so concurrent
    /// requests cannot race two rebuilds.
    async fn cached_model(&self) -> AppResult<Arc<GeminiProvider>> {
        let expiry = Duration::from_secs(self.config.cache_expiry_secs);

        {
            let guard = self.handle.read().await;
            if let Some(cached) = guard.as_ref() {
                if cached.created_at.elapsed() < expiry {
                    debug!(
                        age_secs = cached.created_at.elapsed().as_secs(),
                        "using cached model handle"
                    );
                    return Ok(Arc::clone(&cached.provider));
                }
            }
        }

        let mut guard = self.handle.write().await;
        // Another request may have rebuilt the handle while we waited
        if let Some(cached) = guard.as_ref() {
            if cached.created_at.elapsed() < expiry {
                return Ok(Arc::clone(&cached.provider));
            }
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::config("no LLM API key configured"))?;

        info!(
            refreshing = guard.is_some(),
            model = %self.config.model,
            "creating cached model handle"
        );

        let provider = Arc::new(
            GeminiProvider::new(api_key)
                .with_default_model(self.config.model.clone())
                .with_system_instruction(jql_system_prompt()),
        );

        *guard = Some(CachedModel {
            provider: Arc::clone(&provider),
            created_at: Instant::now(),
        });

        Ok(provider)
    }
}

/// Remove markdown code-fence artifacts from raw model output
fn strip_markdown_fences(raw: &str) -> String {
    raw.replace("```jql", "").replace("```", "").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_generator() -> JqlGenerator {
        JqlGenerator::new(LlmConfig::default(), Arc::new(UsageTracker::new()))
    }

    #[test]
    fn test_strip_markdown_fences() {
        assert_eq!(
            strip_markdown_fences("```jql\nassignee = \"john\"\n```"),
            "assignee = \"john\""
        );
        assert_eq!(strip_markdown_fences("type = Bug"), "type = Bug");
    }

    #[tokio::test]
    async fn test_generate_without_api_key_uses_fallback() {
        let generator = offline_generator();
        let jql = generator.generate("MSC-12345").await;
        assert_eq!(jql, r#"key = "MSC-12345""#);
    }

    #[tokio::test]
    async fn test_generate_never_returns_empty() {
        let generator = offline_generator();
        for query in ["", "weird input !!!", "show bugs", "random words"] {
            let jql = generator.generate(query).await;
            assert!(!jql.is_empty());
        }
    }

    #[tokio::test]
    async fn test_invalidate_is_safe_when_absent() {
        let generator = offline_generator();
        generator.invalidate().await;
        assert!(!generator.llm_configured());
    }
}
