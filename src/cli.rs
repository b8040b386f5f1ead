//! CLI interface for petrel: command parsing and user-visible invocations.
//!
//! All pipeline logic (parsing, linting, mapping, staging) lives in
//! `petrel-core`. This module only wires configuration, platform clients
//! and input files into it, and prints results to stdout.
//!
//! For programmatic and integration use, call [`run`] with a constructed [`Cli`].
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use petrel_core::contract::MarkdownParser;
use petrel_core::flatten::flatten_block_tree;
use petrel_core::lint::MarkdownLinter;
use petrel_core::manuscript::ManuscriptService;
use petrel_core::mapper::BlockMapper;
use petrel_core::models::{CreateDraftRequest, StagingStatus};
use petrel_core::parser::{ParsedDocument, PulldownParser};
use petrel_core::platform::{Platform, PlatformRegistry, NOTION};
use uuid::Uuid;

use crate::directory::WorkspaceDirectory;
use crate::load_config::load_config;
use crate::notion::NotionClient;

/// CLI for petrel: write markdown once, stage it as drafts everywhere.
#[derive(Parser)]
#[clap(
    name = "petrel",
    version,
    about = "Lint markdown and stage it as draft pages in knowledge-base workspaces"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stage a draft request (JSON) to every destination it names
    Stage {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Id of the user the request is staged for
        #[clap(long)]
        user: Uuid,
        /// Path to the draft request JSON file
        #[clap(long)]
        request: PathBuf,
    },
    /// Print lint warnings for a markdown file
    Lint {
        /// Markdown file to check
        file: PathBuf,
    },
    /// Print the native blocks a markdown file maps to, as JSON
    Preview {
        /// Markdown file to convert
        file: PathBuf,
    },
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Stage {
            config,
            user,
            request,
        } => stage(&config, user, &request).await,
        Commands::Lint { file } => lint(&file),
        Commands::Preview { file } => preview(&file),
    }
}

async fn stage(config_path: &Path, user: Uuid, request_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    tracing::info!(command = "stage", %user, "Starting draft staging");

    let raw = fs::read_to_string(request_path)
        .with_context(|| format!("Failed to read draft request {}", request_path.display()))?;
    let request: CreateDraftRequest = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse draft request {}", request_path.display()))?;

    let directory = WorkspaceDirectory::from_entries(NOTION, &config.integrations)?;
    let notion = NotionClient::new(&config.notion).context("Failed to build Notion client")?;
    let registry = PlatformRegistry::new()
        .register(NOTION, Platform::new(Arc::new(directory), Arc::new(notion)));

    let service = ManuscriptService::new(registry, config.staging);
    let response = service.stage_draft(user, &request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    match response.status {
        StagingStatus::Fail => {
            let reason = response
                .error
                .unwrap_or_else(|| "every destination failed".to_owned());
            tracing::error!(command = "stage", error = %reason, "Staging failed");
            Err(anyhow::anyhow!("staging failed: {reason}"))
        }
        status => {
            tracing::info!(command = "stage", ?status, "Staging complete");
            Ok(())
        }
    }
}

fn read_document(file: &Path) -> Result<ParsedDocument> {
    let markdown = fs::read_to_string(file)
        .with_context(|| format!("Failed to read markdown file {}", file.display()))?;
    PulldownParser
        .parse(&markdown)
        .with_context(|| format!("Failed to parse markdown file {}", file.display()))
}

fn lint(file: &Path) -> Result<()> {
    let doc = read_document(file)?;
    let warnings = MarkdownLinter.lint(&doc.tree, &doc.source)?;
    tracing::info!(command = "lint", warnings = warnings.len(), "Lint complete");
    if warnings.is_empty() {
        println!("{}: no warnings", file.display());
    }
    for warning in &warnings {
        println!("{}:{}: {}", file.display(), warning.line, warning.message);
    }
    Ok(())
}

fn preview(file: &Path) -> Result<()> {
    let doc = read_document(file)?;
    let blocks = flatten_block_tree(&BlockMapper.map(&doc.tree, &doc.source)?);
    tracing::info!(command = "preview", blocks = blocks.len(), "Preview complete");
    println!("{}", serde_json::to_string_pretty(&blocks)?);
    Ok(())
}
