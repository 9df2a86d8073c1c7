//! Per-file review outcomes and their aggregate.

use std::fmt;

use serde::Serialize;

/// Progress of a single file through the review pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStage {
    Pending,
    MetadataExtracted,
    Embedded,
    Ranked,
    PromptBuilt,
    Generated,
    Published,
}

impl fmt::Display for ReviewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReviewStage::Pending => "pending",
            ReviewStage::MetadataExtracted => "metadata extracted",
            ReviewStage::Embedded => "embedded",
            ReviewStage::Ranked => "ranked",
            ReviewStage::PromptBuilt => "prompt built",
            ReviewStage::Generated => "generated",
            ReviewStage::Published => "published",
        };
        f.write_str(name)
    }
}

/// Whether the generated comment made it onto the pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// The comment was accepted; the file reached [`ReviewStage::Published`].
    Posted,
    /// `stage` is the last stage the file completed before failing.
    Failed { stage: ReviewStage, reason: String },
}

impl PublishOutcome {
    /// The furthest stage the file completed.
    pub fn stage(&self) -> ReviewStage {
        match self {
            PublishOutcome::Posted => ReviewStage::Published,
            PublishOutcome::Failed { stage, .. } => *stage,
        }
    }
}

/// Final artifact for one changed file.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResult {
    pub filename: String,
    /// The model's review text, when generation got that far.
    pub generated_text: Option<String>,
    /// The prompt sent to the model, when assembly got that far.
    #[serde(skip)]
    pub prompt: Option<String>,
    #[serde(flatten)]
    pub outcome: PublishOutcome,
}

impl ReviewResult {
    pub fn is_posted(&self) -> bool {
        self.outcome == PublishOutcome::Posted
    }
}

/// Counts derived from a [`ReviewReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub posted: usize,
    pub failed: usize,
}

/// Outcome of reviewing a whole changeset, one entry per input file in input order.
///
/// The report never collapses into a single flag; callers derive whatever
/// aggregate status they need.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReviewReport {
    pub results: Vec<ReviewResult>,
}

impl ReviewReport {
    pub fn posted(&self) -> impl Iterator<Item = &ReviewResult> {
        self.results.iter().filter(|r| r.is_posted())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ReviewResult> {
        self.results.iter().filter(|r| !r.is_posted())
    }

    /// True when every file was posted. Vacuously true for an empty changeset.
    pub fn all_posted(&self) -> bool {
        self.results.iter().all(ReviewResult::is_posted)
    }

    pub fn summary(&self) -> Summary {
        let posted = self.posted().count();
        Summary {
            total: self.results.len(),
            posted,
            failed: self.results.len() - posted,
        }
    }
}
