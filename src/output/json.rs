//! JSON output renderer.
//!
//! Outputs `{"comments": [...], "dropped": [...], "duplicates": [...],
//! "summary": {...}}` for machine consumers.

use crate::output::{OutputRenderer, ResolutionReport, Summary};

/// JSON output renderer.
pub struct JsonRenderer;

impl OutputRenderer for JsonRenderer {
    fn render(&self, report: &ResolutionReport) -> String {
        let summary = Summary::from_report(report);

        let output = serde_json::json!({
            "comments": report.comments,
            "dropped": report.dropped,
            "duplicates": report.duplicates,
            "summary": summary,
        });

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}
