//! guidecheck: style-guide grounded pull request reviews.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use guidecheck::config;
use guidecheck::constants;
use guidecheck::corpus;
use guidecheck::env;
use guidecheck::github;
use guidecheck::orchestrator;
use guidecheck::providers;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;

use cli::args::{ChunksArgs, Cli, Command, RelevantArgs, ReviewArgs};
use config::Config;
use corpus::{ChunkExtractor, CorpusOptions};
use env::Env;
use github::{CommentPublisher, DiffSource, DryRunPublisher, GitHubClient, GitHubError, GitHubPublisher};
use orchestrator::{ReviewOrchestrator, ReviewSettings};
use providers::EmbeddingProvider;
use providers::rig::RigProvider;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    match cli.command {
        Command::Review(args) => run_review(*args).await,
        Command::Chunks(args) => run_chunks(args).await,
        Command::Relevant(args) => run_relevant(args).await,
        Command::Version => run_version(),
    }
}

/// Print version and build information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}

fn load_config(dir: &Path) -> Result<Config> {
    Config::load(Some(dir), &Env::real()).context("failed to load configuration")
}

/// The `--guide` flag wins over `[guide] path`.
fn guide_path(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    flag.or_else(|| config.guide.path.clone())
        .context("no style guide configured; pass --guide or set [guide] path")
}

fn rig_provider(config: &Config) -> Result<Arc<RigProvider>> {
    let provider = RigProvider::new(config.provider.clone(), config.embedding.clone())
        .context("failed to set up model provider")?;
    Ok(Arc::new(provider))
}

/// Print the passages a style guide splits into.
async fn run_chunks(args: ChunksArgs) -> Result<()> {
    let config = load_config(&args.path)?;
    let path = guide_path(args.guide, &config)?;

    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let extractor = ChunkExtractor::new(&config.guide.selectors, config.guide.min_chunk_chars)?;
    let chunks = extractor
        .extract_bytes(&bytes)
        .with_context(|| format!("failed to chunk {}", path.display()))?;

    for (i, chunk) in chunks.iter().enumerate() {
        println!("{:>4}  {}", i + 1, chunk.text());
    }
    eprintln!("{} passage(s) from {}", chunks.len(), path.display());
    Ok(())
}

/// Print the passages most similar to a diff, with scores.
async fn run_relevant(args: RelevantArgs) -> Result<()> {
    let config = load_config(&args.path)?;
    let path = guide_path(args.guide, &config)?;
    let top_k = args.top_k.unwrap_or(config.review.top_k);

    let diff = tokio::fs::read_to_string(&args.diff_file)
        .await
        .with_context(|| format!("failed to read {}", args.diff_file.display()))?;

    let provider = rig_provider(&config)?;
    let options = CorpusOptions::from_config(&config.guide, &config.embedding);
    let index = corpus::load_corpus_index(&path, provider.clone(), &options)
        .await
        .context("failed to build style guide corpus")?;

    let query = provider.embed(&diff).await.context("failed to embed diff")?;
    if let Some(dim) = index.dimension() {
        if dim != query.len() {
            bail!(
                "diff embedding has {} dimensions but the style guide has {dim}",
                query.len()
            );
        }
    }

    for scored in index.top_k(&query, top_k) {
        println!("{:>7.4}  {}", scored.score, scored.chunk.text());
    }
    Ok(())
}

/// Fetch, review, and comment on every matching file of a pull request.
async fn run_review(args: ReviewArgs) -> Result<()> {
    let config = load_config(&args.path)?;
    let pr = args.pull_request();
    let guide = guide_path(args.guide.clone(), &config)?;

    // CLI flags take priority over config
    let mut review_config = config.review.clone();
    if !args.extensions.is_empty() {
        review_config.extensions = args.extensions.clone();
    }
    if let Some(n) = args.max_concurrent {
        review_config.max_concurrent_files = n;
    }

    if !args.dry_run && config.github.token.is_none() {
        bail!(GitHubError::MissingToken);
    }
    let github = GitHubClient::new(&config.github).context("failed to create GitHub client")?;

    let listed = github
        .fetch_changed_files(&pr)
        .await
        .with_context(|| format!("failed to list changed files for {pr}"))?;
    let listed_count = listed.len();
    let files: Vec<_> = listed
        .into_iter()
        .filter(|f| f.matches_extension(&review_config.extensions))
        .collect();
    if files.len() < listed_count {
        tracing::info!(
            skipped = listed_count - files.len(),
            extensions = ?review_config.extensions,
            "skipped files by extension"
        );
    }

    if files.is_empty() {
        eprintln!("No matching files to review in {pr}.");
        return Ok(());
    }

    // The corpus is built once, before any file is reviewed
    let provider = rig_provider(&config)?;
    let options = CorpusOptions::from_config(&config.guide, &config.embedding);
    let index = corpus::load_corpus_index(&guide, provider.clone(), &options)
        .await
        .context("failed to build style guide corpus")?;

    let publisher: Arc<dyn CommentPublisher> = if args.dry_run {
        Arc::new(DryRunPublisher)
    } else {
        Arc::new(GitHubPublisher::new(github, pr.clone()))
    };

    let orchestrator = ReviewOrchestrator::new(
        provider.clone(),
        provider,
        publisher,
        ReviewSettings::from(&review_config),
    );
    let report = orchestrator
        .review_changed_files(files, Arc::new(index), &review_config.prompt)
        .await;

    print!("{}", args.format.render(&report));

    let summary = report.summary();
    if summary.failed > 0 && !args.allow_partial {
        bail!(
            "{} of {} file(s) could not be reviewed or posted",
            summary.failed,
            summary.total,
        );
    }

    Ok(())
}
