//! Terminal renderer: one block per file, in review order.

use colored::Colorize;

use crate::models::{PublishOutcome, ReviewReport};
use crate::output::OutputRenderer;

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

impl OutputRenderer for TerminalRenderer {
    fn render(&self, report: &ReviewReport) -> String {
        if report.results.is_empty() {
            return format!("{}", "  ✔ No files to review.\n".green());
        }

        let mut output = String::new();

        for result in &report.results {
            match &result.outcome {
                PublishOutcome::Posted => {
                    output.push_str(&format!(
                        " {} {} {}\n",
                        "✔".green().bold(),
                        result.filename.bold(),
                        "posted".green()
                    ));
                }
                PublishOutcome::Failed { stage, reason } => {
                    output.push_str(&format!(
                        " {} {} {} after {}\n",
                        "✖".red().bold(),
                        result.filename.bold(),
                        "failed".red().bold(),
                        stage.to_string().dimmed()
                    ));
                    output.push_str(&format!("   {} {}\n", "→".cyan(), reason));
                }
            }

            if let Some(ref text) = result.generated_text {
                for line in text.lines() {
                    output.push_str(&format!("   {line}\n"));
                }
            }
            output.push('\n');
        }

        let summary = report.summary();
        output.push_str(&format!("{}\n", "───────────────────────────────────".dimmed()));
        output.push_str(&format!(
            " {} {}: {} posted, {} failed\n",
            summary.total.to_string().bold(),
            if summary.total == 1 { "file" } else { "files" },
            summary.posted.to_string().green().bold(),
            summary.failed.to_string().red().bold(),
        ));

        output
    }
}
