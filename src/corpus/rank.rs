//! Cosine-similarity ranking of passages against a query vector.

use std::cmp::Ordering;

use crate::models::ScoredChunk;

use super::CorpusIndex;

/// Cosine similarity `dot(a, b) / (|a| * |b|)`.
///
/// Returns NaN when either vector has zero magnitude.
///
/// # Panics
///
/// Panics if the vectors differ in length; vectors from different
/// embedding models must never be compared.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(
        a.len(),
        b.len(),
        "cosine similarity of vectors with different dimensions"
    );

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Descending by score with NaN sorted after every real score.
fn by_score_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Return the `k` passages most similar to `query`, best first.
///
/// Every passage is scored; the sort is stable so equal scores keep
/// document order. Returns `min(k, index.len())` results.
pub fn top_k(query: &[f64], index: &CorpusIndex, k: usize) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = index
        .iter()
        .map(|(chunk, vector)| ScoredChunk {
            chunk: chunk.clone(),
            score: cosine_similarity(query, vector),
        })
        .collect();

    scored.sort_by(|a, b| by_score_desc(a.score, b.score));
    scored.truncate(k);
    scored
}
