//! JSON output renderer.
//!
//! Outputs `{"results": [...], "summary": {...}}` format.

use crate::models::ReviewReport;
use crate::output::OutputRenderer;

/// JSON output renderer.
pub struct JsonRenderer;

impl OutputRenderer for JsonRenderer {
    fn render(&self, report: &ReviewReport) -> String {
        let output = serde_json::json!({
            "results": report.results,
            "summary": report.summary(),
        });

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}
