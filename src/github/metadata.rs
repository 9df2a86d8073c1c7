//! Commit reference extraction from GitHub file metadata.

use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MetadataError {
    #[error("contents_url '{url}' is not a valid URL: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("contents_url '{url}' has no ref query parameter")]
    MissingRef { url: String },
}

/// Return the commit SHA carried in the `ref` query parameter of a
/// changed file's `contents_url`.
///
/// ```
/// # use guidecheck::github::commit_ref_from_contents_url;
/// let url = "https://api.github.com/repos/o/r/contents/main.go?ref=6dcb09b";
/// assert_eq!(commit_ref_from_contents_url(url).unwrap(), "6dcb09b");
/// ```
pub fn commit_ref_from_contents_url(contents_url: &str) -> Result<String, MetadataError> {
    let url = Url::parse(contents_url).map_err(|e| MetadataError::InvalidUrl {
        url: contents_url.to_string(),
        reason: e.to_string(),
    })?;

    url.query_pairs()
        .find(|(key, _)| key == "ref")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| MetadataError::MissingRef {
            url: contents_url.to_string(),
        })
}
