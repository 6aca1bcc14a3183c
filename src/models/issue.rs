//! Issue and comment types flowing through the resolution pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational suggestion.
    Info,
    /// Potential issue that should be addressed.
    Warning,
    /// Critical issue that must be fixed.
    Error,
}

/// Custom deserializer for Severity that accepts common LLM variations.
///
/// Models sometimes report "Critical", "Major", "Minor", "High", "Medium",
/// "Low", or "Note" instead of the expected "error"/"warning"/"info".
impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "info" | "note" | "suggestion" | "low" | "minor" | "trivial" | "style"
                => Ok(Severity::Info),
            "warning" | "warn" | "medium" | "moderate" | "major"
                => Ok(Severity::Warning),
            "error" | "critical" | "high" | "severe" | "blocker" | "fatal"
                => Ok(Severity::Error),
            _ => {
                // Fall back to warning for unrecognised severities rather than failing
                Ok(Severity::Warning)
            }
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

fn default_confidence() -> f32 {
    1.0
}

/// A single issue reported by an upstream review agent.
///
/// Arrives by reference, is consumed exactly once by the resolution
/// pipeline, and is either promoted to a [`ResolvedComment`] or dropped
/// with a logged reason. The location hints are both optional: `line`
/// may be absent or slightly wrong, and `code_snippet` is a fallback
/// for locating the line by content.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Issue {
    /// Stable identifier threaded through to the published comment.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// File path as reported by the model.
    pub file: String,
    /// New-file line number the issue refers to, if the model gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Verbatim code excerpt the issue refers to, if the model gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    /// The review comment text.
    pub message: String,
    /// Severity of the issue.
    pub severity: Severity,
    /// Upstream confidence in `[0, 1]`; used to pick a winner among
    /// semantic duplicates.
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

/// A comment whose location has been confirmed against the diff.
///
/// The only output type handed to the publishing side; `line` is
/// guaranteed to be a reviewable line of `file`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedComment {
    /// File path (normalized, as it appears in the diff).
    pub file: String,
    /// Reviewable new-file line number.
    pub line: u32,
    /// The comment text.
    pub message: String,
    /// Identifier of the originating issue.
    pub issue_id: Uuid,
}

/// A comment already published on the review platform.
///
/// Used only as deduplication input; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingComment {
    pub file: String,
    pub line: u32,
    pub content: String,
}
