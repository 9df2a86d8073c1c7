//! Style guide chunking: HTML in, short citable passages out.

use scraper::{Html, Selector};

use crate::constants;
use crate::models::Chunk;

use super::CorpusError;

/// Splits an HTML style guide into passages.
///
/// Text is taken from every element matching the configured selectors, in
/// document order, trimmed at both ends. Passages shorter than
/// `min_chars` characters (headings like "Naming", stray labels) are dropped.
#[derive(Debug, Clone)]
pub struct ChunkExtractor {
    selector: Selector,
    min_chars: usize,
}

impl Default for ChunkExtractor {
    fn default() -> Self {
        let selectors: Vec<String> = constants::DEFAULT_SELECTORS
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self::new(&selectors, constants::MIN_CHUNK_CHARS).expect("default selectors are valid")
    }
}

impl ChunkExtractor {
    /// Build an extractor for a list of CSS selectors such as `["p", "li"]`.
    pub fn new(selectors: &[String], min_chars: usize) -> Result<Self, CorpusError> {
        let joined = selectors.join(", ");
        let selector = Selector::parse(&joined).map_err(|e| CorpusError::Selector {
            selector: joined.clone(),
            reason: format!("{e:?}"),
        })?;
        Ok(Self {
            selector,
            min_chars,
        })
    }

    /// Extract passages from raw document bytes, which must be UTF-8.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<Vec<Chunk>, CorpusError> {
        let html = std::str::from_utf8(bytes)
            .map_err(|e| CorpusError::Parse(format!("document is not valid UTF-8: {e}")))?;
        self.extract(html)
    }

    /// Extract passages from an HTML document.
    ///
    /// Returns an empty list when the document has markup but nothing that
    /// qualifies; fails only when the input is not markup at all.
    pub fn extract(&self, html: &str) -> Result<Vec<Chunk>, CorpusError> {
        if html.trim().is_empty() {
            return Err(CorpusError::Parse("document is empty".to_string()));
        }
        if !html.contains('<') {
            return Err(CorpusError::Parse(
                "document contains no markup".to_string(),
            ));
        }

        let document = Html::parse_document(html);
        if !document.errors.is_empty() {
            tracing::debug!(
                count = document.errors.len(),
                "recovered from HTML parse errors"
            );
        }

        let chunks: Vec<Chunk> = document
            .select(&self.selector)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|text| text.chars().count() >= self.min_chars)
            .map(Chunk::new)
            .collect();

        tracing::debug!(chunks = chunks.len(), "extracted style guide passages");
        Ok(chunks)
    }
}
