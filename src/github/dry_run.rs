//! Publisher that prints comments instead of posting them.

use async_trait::async_trait;
use colored::Colorize;

use crate::models::CommentRequest;

use super::{CommentPublisher, GitHubError};

/// Writes each comment to stderr and reports it as posted.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunPublisher;

#[async_trait]
impl CommentPublisher for DryRunPublisher {
    async fn publish(&self, comment: &CommentRequest) -> Result<(), GitHubError> {
        eprintln!(
            "{} {} @ {} (position {})",
            "[dry-run]".yellow().bold(),
            comment.path.bold(),
            short_sha(&comment.commit_id).dimmed(),
            comment.position,
        );
        eprintln!("{}\n", comment.body);
        Ok(())
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_sha_truncates() {
        assert_eq!(short_sha("6dcb09b5b57875f334f61aebed695e2e4193db5e"), "6dcb09b");
        assert_eq!(short_sha("abc"), "abc");
    }

    #[tokio::test]
    async fn dry_run_always_succeeds() {
        let comment = CommentRequest {
            body: "Looks fine.".into(),
            commit_id: "abc".into(),
            path: "main.go".into(),
            position: 1,
        };
        assert!(DryRunPublisher.publish(&comment).await.is_ok());
    }
}
