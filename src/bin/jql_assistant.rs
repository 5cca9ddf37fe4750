// ABOUTME: Command-line entry point for translating queries and operating the service
// ABOUTME: Provides translate/query/cache/stats/health subcommands over the orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! JQL assistant CLI
//!
//! `translate` runs the generation pipeline alone (works without tracker
//! credentials, degrading to the rule-based fallback when no LLM key is
//! set). `query` runs the full pipeline against the configured tracker.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use jql_assistant::config::environment::ServerConfig;
use jql_assistant::config::LlmConfig;
use jql_assistant::jql::JqlGenerator;
use jql_assistant::logging::LoggingConfig;
use jql_assistant::orchestrator::QueryOrchestrator;
use jql_assistant::usage::UsageTracker;

#[derive(Parser)]
#[command(name = "jql-assistant", version, about = "Natural language to JQL translation service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a free-text query to JQL without fetching anything
    Translate {
        /// The free-text query
        query: String,
    },
    /// Run the full pipeline: translate, classify, aggregate, fetch
    Query {
        /// The free-text query
        query: String,
    },
    /// Manage the cached model handle
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Print the token usage counter shape (counters are per-process; the
    /// `query` command reports live totals on stderr)
    Stats,
    /// Probe tracker and LLM connectivity
    Health,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Drop the cached model handle so the next query rebuilds it
    Clear,
    /// Describe the cache refresh behavior
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    LoggingConfig::from_env()
        .init()
        .context("failed to initialize logging")?;

    let cli = Cli::parse();

    match cli.command {
        Command::Translate { query } => {
            // Translation needs no tracker; build the generator directly so
            // the command works with nothing but an optional LLM key
            let llm = ServerConfig::from_env()
                .map(|config| config.llm)
                .unwrap_or_else(|_| LlmConfig {
                    api_key: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
                    ..LlmConfig::default()
                });
            let generator = JqlGenerator::new(llm, Arc::new(UsageTracker::new()));
            generator.invalidate().await;
            let jql = generator.generate(&query).await;
            println!("{jql}");
        }
        Command::Query { query } => {
            let config = ServerConfig::from_env().context("configuration error")?;
            let orchestrator =
                QueryOrchestrator::from_config(&config).context("failed to build orchestrator")?;
            // Invalidate at startup so deployed instruction updates apply
            orchestrator.invalidate_cache().await;

            let outcome = orchestrator.handle_query(&query).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);

            let stats = orchestrator.usage_snapshot();
            eprintln!(
                "tokens: {} in / {} out across {} queries",
                stats.total_input_tokens, stats.total_output_tokens, stats.total_queries
            );
        }
        Command::Cache { action } => match action {
            CacheAction::Clear => {
                let generator =
                    JqlGenerator::new(LlmConfig::default(), Arc::new(UsageTracker::new()));
                generator.invalidate().await;
                println!("model cache cleared - next query will load the current system instruction");
            }
            CacheAction::Status => {
                println!("cache status:");
                println!("- the model handle is cached per process and rebuilt hourly");
                println!("- the next query after a clear loads the current system instruction");
            }
        },
        Command::Stats => {
            let tracker = UsageTracker::new();
            let stats = tracker.snapshot();
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Health => {
            let config = ServerConfig::from_env().context("configuration error")?;
            let orchestrator =
                QueryOrchestrator::from_config(&config).context("failed to build orchestrator")?;
            let status = orchestrator.connection_status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}
