//! Embedding and chat provider traits and the LLM integration.
//!
//! Provides an abstraction layer over rig-core so the retrieval and review
//! pipeline can be driven by mock providers in tests.

pub mod rig;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Vector;

/// Errors from an embedding or chat provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),

    #[error("model returned no usable text")]
    EmptyGeneration,

    #[error("embedding response contained no vector")]
    EmptyEmbedding,
}

/// Converts text into a fixed-length vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vector, ProviderError>;
}

/// Produces review text for a prompt.
///
/// Implementations must return [`ProviderError::EmptyGeneration`] rather
/// than an empty string when the model produced no candidate text.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}
