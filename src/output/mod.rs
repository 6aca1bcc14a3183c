//! Output renderers: terminal and JSON.

pub mod json;
pub mod terminal;

use serde::{Deserialize, Serialize};

use crate::dedup::DuplicateComment;
use crate::models::issue::ResolvedComment;
use crate::resolve::DroppedIssue;

/// Everything a resolution run produced, ready for rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// Comments anchored to a reviewable line and surviving dedup.
    pub comments: Vec<ResolvedComment>,
    /// Issues that could not be anchored, with reasons.
    pub dropped: Vec<DroppedIssue>,
    /// Comments filtered as duplicates of existing or earlier ones.
    pub duplicates: Vec<DuplicateComment>,
}

/// Counts for the summary line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub comments: usize,
    pub dropped: usize,
    pub duplicates: usize,
}

impl Summary {
    pub fn from_report(report: &ResolutionReport) -> Self {
        Self {
            comments: report.comments.len(),
            dropped: report.dropped.len(),
            duplicates: report.duplicates.len(),
        }
    }
}

/// Trait for rendering a resolution report to an output format.
pub trait OutputRenderer {
    /// Render the report to a string.
    fn render(&self, report: &ResolutionReport) -> String;
}
