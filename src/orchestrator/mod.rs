//! Review orchestrator: concurrent per-file review, from diff to posted comment.
//!
//! Each changed file moves through
//! `Pending → MetadataExtracted → Embedded → Ranked → PromptBuilt → Generated → Published`.
//! A failure at any step is recorded against that file only; the other
//! files carry on.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::ReviewConfig;
use crate::corpus::CorpusIndex;
use crate::github::{CommentPublisher, GitHubError, MetadataError, commit_ref_from_contents_url};
use crate::models::{ChangedFile, CommentRequest, PublishOutcome, ReviewReport, ReviewResult, ReviewStage};
use crate::prompt::{self, PromptError};
use crate::providers::rig::{RetryPolicy, classify_error, is_retryable};
use crate::providers::{ChatProvider, EmbeddingProvider, ProviderError};

/// Why a single file's review stopped.
#[derive(Error, Debug)]
pub enum ReviewFailure {
    #[error("no patch available")]
    NoPatch,

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("failed to embed diff: {0}")]
    Embedding(#[source] ProviderError),

    #[error("diff embedding has {actual} dimensions but the corpus has {expected}")]
    Dimension { expected: usize, actual: usize },

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("review generation failed: {0}")]
    Generation(#[source] ProviderError),

    #[error("failed to publish comment: {0}")]
    Publish(#[from] GitHubError),
}

impl ReviewFailure {
    /// The last stage the file completed before this failure.
    pub fn stage(&self) -> ReviewStage {
        match self {
            ReviewFailure::NoPatch | ReviewFailure::Metadata(_) => ReviewStage::Pending,
            ReviewFailure::Embedding(_) => ReviewStage::MetadataExtracted,
            ReviewFailure::Dimension { .. } => ReviewStage::Embedded,
            ReviewFailure::Prompt(_) => ReviewStage::Ranked,
            ReviewFailure::Generation(_) => ReviewStage::PromptBuilt,
            ReviewFailure::Publish(_) => ReviewStage::Generated,
        }
    }
}

/// One file's unit of work.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub changed_file: ChangedFile,
    pub corpus: Arc<CorpusIndex>,
    pub prompt_template: String,
}

/// Tuning knobs for a review run.
#[derive(Debug, Clone, Copy)]
pub struct ReviewSettings {
    pub max_concurrent: usize,
    pub top_k: usize,
    pub comment_position: u32,
    pub allow_ungrounded: bool,
}

impl From<&ReviewConfig> for ReviewSettings {
    fn from(config: &ReviewConfig) -> Self {
        Self {
            max_concurrent: config.max_concurrent_files,
            top_k: config.top_k,
            comment_position: config.comment_position,
            allow_ungrounded: config.allow_ungrounded,
        }
    }
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self::from(&ReviewConfig::default())
    }
}

/// What a file produced before it finished or failed.
#[derive(Default)]
struct Artifacts {
    prompt: Option<String>,
    generated_text: Option<String>,
}

/// Runs the retrieval-augmented review for every changed file of a pull request.
#[derive(Clone)]
pub struct ReviewOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    chat: Arc<dyn ChatProvider>,
    publisher: Arc<dyn CommentPublisher>,
    settings: ReviewSettings,
    retry: RetryPolicy,
}

impl ReviewOrchestrator {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatProvider>,
        publisher: Arc<dyn CommentPublisher>,
        settings: ReviewSettings,
    ) -> Self {
        Self {
            embedder,
            chat,
            publisher,
            settings,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the backoff schedule for transient generation errors.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Review every file concurrently and return one result per file, in input order.
    ///
    /// Never fails as a whole: each file ends up either posted or failed
    /// with the stage it reached.
    pub async fn review_changed_files(
        &self,
        files: Vec<ChangedFile>,
        corpus: Arc<CorpusIndex>,
        template: &str,
    ) -> ReviewReport {
        let total = files.len();
        tracing::info!(
            files = total,
            passages = corpus.len(),
            max_concurrent = self.settings.max_concurrent,
            "starting review"
        );

        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrent.max(1)));
        let mut join_set = JoinSet::new();
        let filenames: Vec<String> = files.iter().map(|f| f.filename.clone()).collect();

        for (index, changed_file) in files.into_iter().enumerate() {
            let this = self.clone();
            let sem = Arc::clone(&semaphore);
            let request = ReviewRequest {
                changed_file,
                corpus: Arc::clone(&corpus),
                prompt_template: template.to_string(),
            };

            join_set.spawn(async move {
                let Ok(_permit) = sem.acquire_owned().await else {
                    return (index, None);
                };
                (index, Some(this.review(request).await))
            });
        }

        let mut slots: Vec<Option<ReviewResult>> = vec![None; total];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = result,
                Err(e) => tracing::warn!(error = %e, "review task panicked"),
            }
        }

        let results = slots
            .into_iter()
            .zip(filenames)
            .map(|(slot, filename)| {
                slot.unwrap_or_else(|| ReviewResult {
                    filename,
                    generated_text: None,
                    prompt: None,
                    outcome: PublishOutcome::Failed {
                        stage: ReviewStage::Pending,
                        reason: "review task did not complete".to_string(),
                    },
                })
            })
            .collect();

        let report = ReviewReport { results };
        let summary = report.summary();
        tracing::info!(
            posted = summary.posted,
            failed = summary.failed,
            "review finished"
        );
        report
    }

    /// Review a single file.
    pub async fn review(&self, request: ReviewRequest) -> ReviewResult {
        let filename = request.changed_file.filename.clone();
        let mut artifacts = Artifacts::default();

        let outcome = match self.run_stages(&request, &mut artifacts).await {
            Ok(()) => {
                let outcome = PublishOutcome::Posted;
                tracing::info!(file = %filename, stage = %outcome.stage(), "review posted");
                outcome
            }
            Err(failure) => {
                let stage = failure.stage();
                tracing::warn!(file = %filename, %stage, error = %failure, "review failed");
                PublishOutcome::Failed {
                    stage,
                    reason: failure.to_string(),
                }
            }
        };

        ReviewResult {
            filename,
            generated_text: artifacts.generated_text,
            prompt: artifacts.prompt,
            outcome,
        }
    }

    async fn run_stages(
        &self,
        request: &ReviewRequest,
        artifacts: &mut Artifacts,
    ) -> Result<(), ReviewFailure> {
        let file = &request.changed_file;

        let diff = file
            .patch
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or(ReviewFailure::NoPatch)?;
        let commit_id = commit_ref_from_contents_url(&file.contents_url)?;

        let query = self
            .embedder
            .embed(diff)
            .await
            .map_err(ReviewFailure::Embedding)?;
        if let Some(expected) = request.corpus.dimension() {
            if expected != query.len() {
                return Err(ReviewFailure::Dimension {
                    expected,
                    actual: query.len(),
                });
            }
        }

        let ranked = request.corpus.top_k(&query, self.settings.top_k);
        tracing::debug!(
            file = %file.filename,
            scores = ?ranked.iter().map(|s| s.score).collect::<Vec<_>>(),
            "ranked style guide passages"
        );
        // NaN means no similarity at all, so it never grounds a review
        let passages: Vec<&str> = ranked
            .iter()
            .filter(|s| !s.score.is_nan())
            .map(|s| s.chunk.text())
            .collect();

        let prompt = match prompt::build_review_prompt(&request.prompt_template, &passages, diff) {
            Ok(prompt) => prompt,
            Err(PromptError::InsufficientContext) if self.settings.allow_ungrounded => {
                tracing::warn!(file = %file.filename, "no style guide passages, reviewing ungrounded");
                prompt::build_ungrounded_prompt(&request.prompt_template, diff)
            }
            Err(e) => return Err(e.into()),
        };
        artifacts.prompt = Some(prompt.clone());

        let text = self
            .generate_with_retry(&file.filename, &prompt)
            .await
            .map_err(ReviewFailure::Generation)?;
        artifacts.generated_text = Some(text.clone());

        let comment = CommentRequest {
            body: text,
            commit_id,
            path: file.filename.clone(),
            position: self.settings.comment_position,
        };
        self.publisher.publish(&comment).await?;
        Ok(())
    }

    async fn generate_with_retry(&self, file: &str, prompt: &str) -> Result<String, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.chat.generate(prompt).await {
                Ok(text) => return Ok(text),
                Err(ref e) if is_retryable(e) && attempt < self.retry.max_retries => {
                    let backoff = self.retry.backoff(attempt);
                    tracing::warn!(
                        file,
                        attempt = attempt + 1,
                        max = self.retry.max_retries + 1,
                        reason = classify_error(e).unwrap_or("Transient error"),
                        backoff_secs = backoff.as_secs(),
                        "retrying review generation"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
