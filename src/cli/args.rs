//! Clap argument types and output format selection.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use guidecheck::models::{PullRequestRef, ReviewReport};

/// Style-guide grounded pull request reviews.
#[derive(Parser, Debug)]
#[command(
    name = "guidecheck",
    version = guidecheck::constants::VERSION,
    about = "Review pull requests against your team's style guide"
)]
pub struct Cli {
    /// Increase log verbosity (-v for info, -vv for debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Review a pull request and post one comment per changed file.
    Review(Box<ReviewArgs>),

    /// Print the passages extracted from a style guide.
    Chunks(ChunksArgs),

    /// Show the style guide passages most relevant to a diff.
    Relevant(RelevantArgs),

    /// Print version and build information.
    Version,
}

/// Arguments for the `review` subcommand.
#[derive(Parser, Debug)]
pub struct ReviewArgs {
    // --- Pull request ---
    /// Repository owner (user or organisation).
    #[arg(long)]
    pub owner: String,

    /// Repository name.
    #[arg(long)]
    pub repo: String,

    /// Pull request number.
    #[arg(long)]
    pub pr: u64,

    // --- Inputs ---
    /// HTML style guide (overrides `[guide] path`).
    #[arg(long)]
    pub guide: Option<PathBuf>,

    /// Directory to read `.guidecheck.toml` from.
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Only review files ending in one of these suffixes, e.g. `.go,.rs`.
    #[arg(long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    // --- Behaviour ---
    /// Print comments instead of posting them.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Exit zero even when some files could not be reviewed or posted.
    #[arg(long, default_value_t = false)]
    pub allow_partial: bool,

    /// Max files reviewed concurrently (overrides `[review] max_concurrent_files`).
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    // --- Output ---
    /// Output format.
    #[arg(long, default_value = "terminal")]
    pub format: OutputFormat,
}

impl ReviewArgs {
    pub fn pull_request(&self) -> PullRequestRef {
        PullRequestRef {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            number: self.pr,
        }
    }
}

/// Arguments for the `chunks` subcommand.
#[derive(Parser, Debug)]
pub struct ChunksArgs {
    /// HTML style guide (overrides `[guide] path`).
    #[arg(long)]
    pub guide: Option<PathBuf>,

    /// Directory to read `.guidecheck.toml` from.
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}

/// Arguments for the `relevant` subcommand.
#[derive(Parser, Debug)]
pub struct RelevantArgs {
    /// Unified diff to match against the style guide.
    #[arg(long)]
    pub diff_file: PathBuf,

    /// HTML style guide (overrides `[guide] path`).
    #[arg(long)]
    pub guide: Option<PathBuf>,

    /// Number of passages to show (overrides `[review] top_k`).
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Directory to read `.guidecheck.toml` from.
    #[arg(long, default_value = ".")]
    pub path: PathBuf,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl OutputFormat {
    /// Render a report using the renderer for this format.
    pub fn render(&self, report: &ReviewReport) -> String {
        use guidecheck::output::OutputRenderer;
        match self {
            OutputFormat::Terminal => guidecheck::output::terminal::TerminalRenderer.render(report),
            OutputFormat::Json => guidecheck::output::json::JsonRenderer.render(report),
        }
    }
}
