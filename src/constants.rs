//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and policy values so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "guidecheck";

/// Crate version baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Target triple the binary was built for.
pub const TARGET: &str = env!("TARGET");

/// Local config filename (e.g. `.guidecheck.toml` in the working directory).
pub const CONFIG_FILENAME: &str = ".guidecheck.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "guidecheck";

/// Default GitHub REST API root.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// User-Agent sent on every GitHub request.
pub const USER_AGENT: &str = concat!("guidecheck/", env!("CARGO_PKG_VERSION"));

/// GitHub REST API version header value.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

// ── Retrieval policy ────────────────────────────────────────────────

/// Passages shorter than this (in characters) are discarded as noise.
pub const MIN_CHUNK_CHARS: usize = 30;

/// Maximum concurrent embedding requests while building the corpus.
pub const EMBED_WORKERS: usize = 10;

/// Number of style-guide passages cited per review.
pub const TOP_K: usize = 3;

/// Page size when listing pull request files.
pub const GITHUB_PAGE_SIZE: usize = 100;

/// GitHub stops listing pull request files after this many entries.
pub const GITHUB_MAX_FILES: usize = 3000;

/// Element selectors whose text becomes a passage.
pub const DEFAULT_SELECTORS: &[&str] = &["p", "li", "h2", "h3"];

/// Instruction placed at the top of every review prompt.
pub const DEFAULT_PROMPT: &str = "You are a senior software engineer reviewing a pull request. \
Review the code diff below against the style guide excerpts provided. \
Point out concrete violations, cite the relevant guideline, and suggest a fix. \
Keep the feedback concise and actionable.";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_PROVIDER: &str = "GUIDECHECK_PROVIDER";
pub const ENV_MODEL: &str = "GUIDECHECK_MODEL";
pub const ENV_API_KEY: &str = "GUIDECHECK_API_KEY";
pub const ENV_BASE_URL: &str = "GUIDECHECK_BASE_URL";
pub const ENV_EMBEDDING_MODEL: &str = "GUIDECHECK_EMBEDDING_MODEL";
pub const ENV_GITHUB_TOKEN: &str = "GUIDECHECK_GITHUB_TOKEN";
pub const ENV_GITHUB_API_URL: &str = "GUIDECHECK_GITHUB_API_URL";
pub const ENV_PROMPT: &str = "GUIDECHECK_PROMPT";
pub const ENV_LOG: &str = "GUIDECHECK_LOG";
