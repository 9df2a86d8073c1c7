//! Bounded-concurrency embedding of many passages.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::models::Vector;
use crate::providers::EmbeddingProvider;

use super::CorpusError;

/// Embeds a batch of texts with at most `workers` requests in flight.
#[derive(Clone)]
pub struct EmbeddingPool {
    provider: Arc<dyn EmbeddingProvider>,
    workers: usize,
}

impl EmbeddingPool {
    /// A worker count of zero is treated as one.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, workers: usize) -> Self {
        Self {
            provider,
            workers: workers.max(1),
        }
    }

    /// Embed every text, returning vectors index-aligned with `texts`.
    ///
    /// All-or-nothing: if any text fails, the first error observed is
    /// returned and every computed vector is dropped. Remaining tasks are
    /// still awaited, and tasks that have not started yet skip their
    /// request once a failure has been seen.
    pub async fn embed_all(&self, texts: &[String]) -> Result<Vec<Vector>, CorpusError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::info!(chunks = texts.len(), workers = self.workers, "embedding style guide");

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let failed = Arc::new(AtomicBool::new(false));
        let mut join_set = JoinSet::new();

        for (index, text) in texts.iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let sem = Arc::clone(&semaphore);
            let failed = Arc::clone(&failed);
            let text = text.clone();

            join_set.spawn(async move {
                let Ok(_permit) = sem.acquire_owned().await else {
                    return (index, None);
                };
                if failed.load(Ordering::Acquire) {
                    return (index, None);
                }
                let result = provider.embed(&text).await;
                if result.is_err() {
                    failed.store(true, Ordering::Release);
                }
                (index, Some(result))
            });
        }

        let mut slots: Vec<Option<Vector>> = vec![None; texts.len()];
        let mut first_error: Option<CorpusError> = None;

        while let Some(joined) = join_set.join_next().await {
            let err = match joined {
                Ok((index, Some(Ok(vector)))) => {
                    slots[index] = Some(vector);
                    continue;
                }
                // skipped after an earlier failure
                Ok((_, None)) => continue,
                Ok((index, Some(Err(source)))) => CorpusError::Embedding { index, source },
                Err(e) => CorpusError::Task(e.to_string()),
            };
            if first_error.is_none() {
                tracing::warn!(error = %err, "style guide embedding failed");
                first_error = Some(err);
            } else {
                tracing::debug!(error = %err, "additional embedding failure");
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        let mut vectors = Vec::with_capacity(slots.len());
        for (index, slot) in slots.into_iter().enumerate() {
            let vector = slot.ok_or_else(|| {
                CorpusError::Task(format!("no embedding recorded for chunk {index}"))
            })?;
            if let Some(first) = vectors.first().map(Vec::len) {
                if vector.len() != first {
                    return Err(CorpusError::DimensionMismatch {
                        index,
                        expected: first,
                        actual: vector.len(),
                    });
                }
            }
            vectors.push(vector);
        }

        tracing::info!(vectors = vectors.len(), "embedding complete");
        Ok(vectors)
    }
}
