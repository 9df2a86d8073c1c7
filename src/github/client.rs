//! GitHub REST client for pull request files and review comments.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};

use crate::config::GitHubConfig;
use crate::constants::{GITHUB_API_VERSION, GITHUB_MAX_FILES, GITHUB_PAGE_SIZE, USER_AGENT};
use crate::models::{ChangedFile, CommentRequest, PullRequestRef};

use super::{CommentPublisher, DiffSource, GitHubError};

/// Thin wrapper over the two pull request endpoints the review needs.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GitHubError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn pulls_url(&self, pr: &PullRequestRef, endpoint: &str) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}/{endpoint}",
            self.api_url, pr.owner, pr.repo, pr.number
        )
    }

    fn with_headers(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    /// List every changed file, following pagination.
    ///
    /// GitHub caps this listing at 3000 files; anything past that is not
    /// returned by the API at all.
    pub async fn list_files(&self, pr: &PullRequestRef) -> Result<Vec<ChangedFile>, GitHubError> {
        let url = self.pulls_url(pr, "files");
        let mut files: Vec<ChangedFile> = Vec::new();
        let mut page = 1usize;

        loop {
            let response = self
                .with_headers(self.http.get(&url))
                .query(&[("per_page", GITHUB_PAGE_SIZE), ("page", page)])
                .send()
                .await
                .map_err(|e| GitHubError::Request(e.to_string()))?;

            if !response.status().is_success() {
                return Err(status_error(response).await);
            }

            let batch: Vec<ChangedFile> = response
                .json()
                .await
                .map_err(|e| GitHubError::Decode(e.to_string()))?;
            let count = batch.len();
            files.extend(batch);
            tracing::debug!(pr = %pr, page, count, "fetched changed files page");

            if count < GITHUB_PAGE_SIZE || files.len() >= GITHUB_MAX_FILES {
                break;
            }
            page += 1;
        }

        files.truncate(GITHUB_MAX_FILES);
        tracing::info!(pr = %pr, files = files.len(), "fetched changed files");
        Ok(files)
    }

    /// Post a single review comment. Only HTTP 201 counts as success.
    pub async fn post_comment(
        &self,
        pr: &PullRequestRef,
        comment: &CommentRequest,
    ) -> Result<(), GitHubError> {
        if self.token.is_none() {
            return Err(GitHubError::MissingToken);
        }

        let response = self
            .with_headers(self.http.post(self.pulls_url(pr, "comments")))
            .json(comment)
            .send()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        if response.status() != StatusCode::CREATED {
            return Err(status_error(response).await);
        }

        tracing::info!(pr = %pr, path = %comment.path, "posted review comment");
        Ok(())
    }
}

async fn status_error(response: reqwest::Response) -> GitHubError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    GitHubError::Status { status, body }
}

#[async_trait]
impl DiffSource for GitHubClient {
    async fn fetch_changed_files(
        &self,
        pr: &PullRequestRef,
    ) -> Result<Vec<ChangedFile>, GitHubError> {
        self.list_files(pr).await
    }
}

/// Publishes comments onto one specific pull request.
pub struct GitHubPublisher {
    client: GitHubClient,
    pr: PullRequestRef,
}

impl GitHubPublisher {
    pub fn new(client: GitHubClient, pr: PullRequestRef) -> Self {
        Self { client, pr }
    }
}

#[async_trait]
impl CommentPublisher for GitHubPublisher {
    async fn publish(&self, comment: &CommentRequest) -> Result<(), GitHubError> {
        self.client.post_comment(&self.pr, comment).await
    }
}
