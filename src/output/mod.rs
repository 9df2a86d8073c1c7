//! Output renderers for review reports: terminal and JSON.

pub mod json;
pub mod terminal;

use crate::models::ReviewReport;

/// Trait for rendering a review report to an output format.
pub trait OutputRenderer {
    /// Render the report to a string.
    fn render(&self, report: &ReviewReport) -> String;
}
