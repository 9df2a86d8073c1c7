//! Style-guide passage types.

use serde::{Deserialize, Serialize};

/// An embedding vector. Dimensionality is fixed by the embedding model.
pub type Vector = Vec<f64>;

/// A short, independently retrievable passage of style-guide text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    text: String,
}

impl Chunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A passage paired with its cosine similarity to a query.
///
/// `score` lies in `[-1, 1]`, or is NaN when either vector had zero magnitude.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f64,
}
