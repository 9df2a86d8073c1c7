//! GitHub pull request integration: fetching changed files and posting
//! review comments.

pub mod client;
pub mod dry_run;
pub mod metadata;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ChangedFile, CommentRequest, PullRequestRef};

pub use client::{GitHubClient, GitHubPublisher};
pub use dry_run::DryRunPublisher;
pub use metadata::{MetadataError, commit_ref_from_contents_url};

/// Errors from the GitHub API.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("GitHub request failed: {0}")]
    Request(String),

    #[error("GitHub API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode GitHub response: {0}")]
    Decode(String),

    #[error("no GitHub token configured. Set {} or GITHUB_TOKEN.", crate::constants::ENV_GITHUB_TOKEN)]
    MissingToken,
}

/// Lists the files changed by a pull request.
#[async_trait]
pub trait DiffSource: Send + Sync {
    async fn fetch_changed_files(&self, pr: &PullRequestRef)
    -> Result<Vec<ChangedFile>, GitHubError>;
}

/// Posts one review comment.
///
/// Implementations are not expected to retry; the caller records the
/// failure against the file and moves on.
#[async_trait]
pub trait CommentPublisher: Send + Sync {
    async fn publish(&self, comment: &CommentRequest) -> Result<(), GitHubError>;
}
