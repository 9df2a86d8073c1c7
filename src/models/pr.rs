//! Pull request types exchanged with the code host.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a single pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// One entry of a pull request's changed-file listing.
///
/// Mirrors the GitHub "list pull request files" payload. Only `filename`,
/// `patch` and `contents_url` drive the review; the rest is carried for
/// reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    /// Unified diff hunk text. Absent for binary or oversized files.
    #[serde(default)]
    pub patch: Option<String>,
    /// API URL for the file contents; its `ref` query parameter is the head commit.
    #[serde(default)]
    pub contents_url: String,
}

impl ChangedFile {
    /// Whether the filename ends with any of `extensions`. An empty list matches everything.
    pub fn matches_extension(&self, extensions: &[String]) -> bool {
        extensions.is_empty()
            || extensions
                .iter()
                .any(|ext| self.filename.ends_with(ext.as_str()))
    }
}

/// Body of a pull request review comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRequest {
    pub body: String,
    pub commit_id: String,
    pub path: String,
    /// Line offset into the file's diff hunk.
    pub position: u32,
}
