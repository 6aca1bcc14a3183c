//! revanchor — anchors AI review comments to reviewable diff lines.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use revanchor::cli::args::{AnnotateArgs, Cli, Command, ResolveArgs};
use revanchor::config::Config;
use revanchor::dedup::{Candidate, CommentDeduplicator, DedupConfig};
use revanchor::diff::{load_diff, render};
use revanchor::env::Env;
use revanchor::models::issue::{ExistingComment, Issue};
use revanchor::output::ResolutionReport;
use revanchor::providers::http::HttpEmbeddingProvider;
use revanchor::providers::{EmbeddingProvider, NoopEmbedding};
use revanchor::resolve::snippet::SnippetOptions;
use revanchor::resolve::{resolve_issues, ResolveOptions};
use uuid::Uuid;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Annotate(args) => run_annotate(args).await,
        Command::Resolve(args) => run_resolve(*args).await,
        Command::Version => run_version(),
    }
}

/// Print version information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        revanchor::constants::APP_NAME.bold(),
        env!("CARGO_PKG_VERSION").green().bold()
    );
    Ok(())
}

/// Print the diff annotated with explicit new-file line numbers.
async fn run_annotate(args: AnnotateArgs) -> Result<()> {
    let input = match args.input.validate_input() {
        Ok(mode) => mode,
        Err(msg) => bail!(msg),
    };

    let diff = load_diff(&input, &args.input.path, "local", BTreeMap::new())
        .await
        .context("failed to load diff")?;

    println!("{}", render::render(&diff));
    Ok(())
}

/// Resolve reported issues into publishable comments.
async fn run_resolve(args: ResolveArgs) -> Result<()> {
    let input = match args.input.validate_input() {
        Ok(mode) => mode,
        Err(msg) => bail!(msg),
    };

    let env = Env::real();
    let mut config = Config::load(Some(&args.input.path), &env)
        .context("failed to load configuration")?;

    // Layer 1: CLI flag overrides.
    if let Some(distance) = args.max_search_distance {
        config.resolver.max_search_distance = distance;
    }
    if let Some(threshold) = args.similarity_threshold {
        config.dedup.similarity_threshold = threshold;
    }

    let diff = load_diff(&input, &args.input.path, &args.revision, BTreeMap::new())
        .await
        .context("failed to load diff")?;

    let issues = read_issues(&args.issues).await?;
    let existing = match &args.existing_comments {
        Some(path) => read_existing_comments(path).await?,
        None => Vec::new(),
    };

    let opts = ResolveOptions {
        max_search_distance: config.resolver.max_search_distance,
        snippet: SnippetOptions {
            fuzzy: !args.no_fuzzy,
            ..SnippetOptions::default()
        },
    };
    let (comments, dropped) = resolve_issues(&diff, &issues, &opts);

    let confidences: HashMap<Uuid, f32> =
        issues.iter().map(|i| (i.id, i.confidence)).collect();
    let candidates: Vec<Candidate> = comments
        .into_iter()
        .map(|comment| Candidate {
            confidence: confidences.get(&comment.issue_id).copied().unwrap_or(1.0),
            comment,
        })
        .collect();

    let provider: Arc<dyn EmbeddingProvider> = match &config.embedding.base_url {
        Some(base_url) => Arc::new(HttpEmbeddingProvider::new(
            base_url.clone(),
            config.embedding.model.clone(),
            config.embedding.api_key.clone(),
        )),
        None => Arc::new(NoopEmbedding),
    };
    let deduplicator = CommentDeduplicator::new(
        provider,
        DedupConfig {
            signature_prefix_len: config.dedup.signature_prefix_len,
            similarity_threshold: config.dedup.similarity_threshold,
        },
    );
    let outcome = deduplicator.partition(&existing, candidates).await;

    let report = ResolutionReport {
        comments: outcome.unique,
        dropped,
        duplicates: outcome.duplicates,
    };

    println!("{}", args.format.render(&report));
    Ok(())
}

/// Read the reported issues from a JSON file.
async fn read_issues(path: &Path) -> Result<Vec<Issue>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse issues from {}", path.display()))
}

/// Read already-published comments from a JSON file.
async fn read_existing_comments(path: &Path) -> Result<Vec<ExistingComment>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse comments from {}", path.display()))
}
