//! Style guide corpus: chunking, embedding, and relevance ranking.
//!
//! A [`CorpusIndex`] is built once per run by [`build_corpus_index`] and then
//! shared read-only (behind an `Arc`) by every concurrent file review.

pub mod extract;
pub mod pool;
pub mod rank;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::config::{EmbeddingConfig, GuideConfig};
use crate::models::{Chunk, ScoredChunk, Vector};
use crate::providers::{EmbeddingProvider, ProviderError};

pub use extract::ChunkExtractor;
pub use pool::EmbeddingPool;

/// Errors while building the corpus. All of them are fatal for a run.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("failed to read style guide {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse style guide: {0}")]
    Parse(String),

    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error("failed to embed chunk {index}: {source}")]
    Embedding {
        index: usize,
        #[source]
        source: ProviderError,
    },

    #[error("chunk {index} embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{chunks} chunks but {vectors} vectors")]
    Misaligned { chunks: usize, vectors: usize },

    #[error("embedding task failed: {0}")]
    Task(String),
}

/// Passages and their embeddings, index-aligned.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    chunks: Vec<Chunk>,
    vectors: Vec<Vector>,
}

impl CorpusIndex {
    /// Pair passages with their vectors; `vectors[i]` must embed `chunks[i]`.
    pub fn new(chunks: Vec<Chunk>, vectors: Vec<Vector>) -> Result<Self, CorpusError> {
        if chunks.len() != vectors.len() {
            return Err(CorpusError::Misaligned {
                chunks: chunks.len(),
                vectors: vectors.len(),
            });
        }
        Ok(Self { chunks, vectors })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Embedding dimensionality, or `None` for an empty corpus.
    pub fn dimension(&self) -> Option<usize> {
        self.vectors.first().map(Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Chunk, &Vector)> {
        self.chunks.iter().zip(&self.vectors)
    }

    /// The `k` passages most similar to `query`. See [`rank::top_k`].
    pub fn top_k(&self, query: &[f64], k: usize) -> Vec<ScoredChunk> {
        rank::top_k(query, self, k)
    }
}

/// Chunking and embedding settings for [`build_corpus_index`].
#[derive(Debug, Clone)]
pub struct CorpusOptions {
    pub selectors: Vec<String>,
    pub min_chunk_chars: usize,
    pub workers: usize,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self::from_config(&GuideConfig::default(), &EmbeddingConfig::default())
    }
}

impl CorpusOptions {
    pub fn from_config(guide: &GuideConfig, embedding: &EmbeddingConfig) -> Self {
        Self {
            selectors: guide.selectors.clone(),
            min_chunk_chars: guide.min_chunk_chars,
            workers: embedding.workers,
        }
    }
}

/// Chunk an HTML style guide and embed every passage.
///
/// Fails on the first parse or embedding error; a partially embedded
/// corpus is never returned.
pub async fn build_corpus_index(
    html: &str,
    provider: Arc<dyn EmbeddingProvider>,
    options: &CorpusOptions,
) -> Result<CorpusIndex, CorpusError> {
    let extractor = ChunkExtractor::new(&options.selectors, options.min_chunk_chars)?;
    let chunks = extractor.extract(html)?;
    if chunks.is_empty() {
        tracing::warn!("style guide produced no passages");
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.text().to_string()).collect();
    let vectors = EmbeddingPool::new(provider, options.workers)
        .embed_all(&texts)
        .await?;

    CorpusIndex::new(chunks, vectors)
}

/// Read a style guide from disk and build its corpus.
pub async fn load_corpus_index(
    path: &Path,
    provider: Arc<dyn EmbeddingProvider>,
    options: &CorpusOptions,
) -> Result<CorpusIndex, CorpusError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| CorpusError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let html = std::str::from_utf8(&bytes)
        .map_err(|e| CorpusError::Parse(format!("{} is not valid UTF-8: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "loading style guide");
    build_corpus_index(html, provider, options).await
}
