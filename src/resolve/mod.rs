//! Line resolution: reviewable-line computation, old→new mapping, line
//! validation with bounded auto-correction, and the issue resolution
//! pipeline that turns model-reported issues into publishable comments.
//!
//! Everything here is a pure function over an immutable [`DiffFile`];
//! there is no shared state and calls are safe to run concurrently.

pub mod snippet;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_MAX_SEARCH_DISTANCE;
use crate::models::diff::{ChangeType, Diff, DiffFile, LineKind, ReviewableLineDetail};
use crate::models::issue::{Issue, ResolvedComment};
use snippet::SnippetOptions;

/// All reviewable lines of a file, in new-file order.
///
/// A line is reviewable iff it exists in the new version (added or
/// unchanged context); removed lines never appear. Counters are walked
/// per hunk from `new_start`, never across hunk boundaries.
pub fn reviewable_line_details(file: &DiffFile) -> Vec<ReviewableLineDetail> {
    let mut details = Vec::new();

    for hunk in &file.hunks {
        let mut new_line = hunk.new_start;
        for line in &hunk.lines {
            match line.kind {
                LineKind::Added | LineKind::Context => {
                    details.push(ReviewableLineDetail {
                        line: new_line,
                        kind: line.kind,
                        content: line.content().trim().to_string(),
                        raw: line.raw.clone(),
                    });
                    new_line += 1;
                }
                LineKind::Removed | LineKind::NoNewline => {}
            }
        }
    }

    details
}

/// The set of new-file line numbers a comment may legally attach to.
pub fn reviewable_lines(file: &DiffFile) -> BTreeSet<u32> {
    reviewable_line_details(file)
        .into_iter()
        .map(|d| d.line)
        .collect()
}

/// Map an old-file line number to its new-file line number.
///
/// Returns `None` when the old line was deleted or falls outside every
/// hunk. For fully added files, lines outside hunks map to themselves
/// since old and new numbering coincide (there is no old file).
pub fn map_old_line_to_new_line(file: &DiffFile, old_line: u32) -> Option<u32> {
    for hunk in &file.hunks {
        if !hunk.old_range_contains(old_line) {
            continue;
        }

        let mut old = hunk.old_start;
        let mut new = hunk.new_start;
        for line in &hunk.lines {
            match line.kind {
                LineKind::Removed => {
                    if old == old_line {
                        return None;
                    }
                    old += 1;
                }
                LineKind::Added => {
                    new += 1;
                }
                LineKind::Context => {
                    if old == old_line {
                        return Some(new);
                    }
                    old += 1;
                    new += 1;
                }
                LineKind::NoNewline => {}
            }
        }
        return None;
    }

    if file.change_type == ChangeType::Added {
        return Some(old_line);
    }
    None
}

/// Confirm that `target_line` exists in some hunk's new range and does
/// not correspond to a deleted position.
///
/// For fully added files any target is accepted; the file has no old
/// version to contradict it.
pub fn find_new_line_number(file: &DiffFile, target_line: u32) -> Option<u32> {
    if file.change_type == ChangeType::Added {
        return Some(target_line);
    }

    for hunk in &file.hunks {
        if !hunk.new_range_contains(target_line) {
            continue;
        }

        let mut new = hunk.new_start;
        for line in &hunk.lines {
            match line.kind {
                LineKind::Added | LineKind::Context => {
                    if new == target_line {
                        return Some(target_line);
                    }
                    new += 1;
                }
                LineKind::Removed | LineKind::NoNewline => {}
            }
        }
        return None;
    }
    None
}

/// Outcome of validating a candidate line number.
///
/// An invalid result without a `suggestion` means the issue must be
/// dropped, never guessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineValidation {
    /// Whether the candidate was already a reviewable line.
    pub valid: bool,
    /// The confirmed line when `valid` is true.
    pub line: Option<u32>,
    /// Human-readable rejection reason when `valid` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Nearest reviewable line within the same hunk, if one exists
    /// inside the search radius.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<u32>,
}

impl LineValidation {
    fn ok(line: u32) -> Self {
        Self {
            valid: true,
            line: Some(line),
            reason: None,
            suggestion: None,
        }
    }

    fn rejected(reason: String, suggestion: Option<u32>) -> Self {
        Self {
            valid: false,
            line: None,
            reason: Some(reason),
            suggestion,
        }
    }
}

/// Validate a candidate line number, auto-correcting within a bounded
/// radius when it points at a deleted position.
///
/// The outward search checks `target + d` before `target - d` for each
/// distance (new code tends to be appended just after the reported
/// position) and never leaves the originating hunk's new range: a
/// numerically closer reviewable line in an adjacent hunk belongs to
/// unrelated code and would silently misattribute the comment.
pub fn validate_and_correct_line_number(
    file: &DiffFile,
    target_line: u32,
    max_search_distance: u32,
) -> LineValidation {
    let reviewable = reviewable_lines(file);
    if reviewable.contains(&target_line) {
        return LineValidation::ok(target_line);
    }

    let Some(hunk) = file
        .hunks
        .iter()
        .find(|h| h.new_range_contains(target_line))
    else {
        return LineValidation::rejected(
            format!("line {target_line} is not in any hunk of {}", file.path),
            None,
        );
    };

    // Inside a hunk's new range but not reviewable: the line was
    // deleted at this position. Search outward for the nearest
    // reviewable line, forward first.
    for d in 1..=max_search_distance {
        let forward = target_line + d;
        if hunk.new_range_contains(forward) && reviewable.contains(&forward) {
            return LineValidation::rejected(
                format!("line {target_line} was deleted; nearest reviewable line is {forward}"),
                Some(forward),
            );
        }
        if let Some(backward) = target_line.checked_sub(d) {
            if hunk.new_range_contains(backward) && reviewable.contains(&backward) {
                return LineValidation::rejected(
                    format!(
                        "line {target_line} was deleted; nearest reviewable line is {backward}"
                    ),
                    Some(backward),
                );
            }
        }
    }

    LineValidation::rejected(
        format!(
            "line {target_line} was deleted and no reviewable line exists within {max_search_distance} lines"
        ),
        None,
    )
}

/// Why an issue could not be promoted to a comment.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropReason {
    #[error("file not present in diff: {path}")]
    FileNotInDiff { path: String },

    #[error("no line number and no matching snippet")]
    NoLocation,

    #[error("line {line} is not reviewable: {detail}")]
    Unresolvable { line: u32, detail: String },
}

/// An issue that was dropped, with the reason, for operator logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroppedIssue {
    pub issue: Issue,
    pub reason: DropReason,
}

/// Tuning knobs for the resolution pipeline.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub max_search_distance: u32,
    pub snippet: SnippetOptions,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_search_distance: DEFAULT_MAX_SEARCH_DISTANCE,
            snippet: SnippetOptions::default(),
        }
    }
}

/// Resolve a single issue against its file.
///
/// Ordered fallback: snippet match when a snippet is present, then the
/// model-reported line with validation and bounded correction. A line
/// produced by the snippet locator is reviewable by construction but is
/// still confirmed, so every returned number went through the same
/// final gate.
pub fn resolve_issue(
    file: &DiffFile,
    issue: &Issue,
    opts: &ResolveOptions,
) -> Result<u32, DropReason> {
    if let Some(snippet_text) = issue.code_snippet.as_deref() {
        if let Some(line) = snippet::find_line_number_by_code_snippet(file, snippet_text, &opts.snippet)
        {
            if find_new_line_number(file, line).is_some() {
                return Ok(line);
            }
        }
    }

    let Some(target) = issue.line else {
        return Err(DropReason::NoLocation);
    };

    let validation = validate_and_correct_line_number(file, target, opts.max_search_distance);
    if validation.valid {
        return Ok(validation.line.unwrap_or(target));
    }
    if let Some(suggested) = validation.suggestion {
        if find_new_line_number(file, suggested).is_some() {
            return Ok(suggested);
        }
    }

    Err(DropReason::Unresolvable {
        line: target,
        detail: validation
            .reason
            .unwrap_or_else(|| "no reviewable line found".to_string()),
    })
}

/// Resolve a batch of issues against a diff.
///
/// Issues that cannot be anchored to a reviewable line are returned in
/// the dropped list with their reason; they are never guessed at and
/// never surface as hard errors.
pub fn resolve_issues(
    diff: &Diff,
    issues: &[Issue],
    opts: &ResolveOptions,
) -> (Vec<ResolvedComment>, Vec<DroppedIssue>) {
    let mut comments = Vec::new();
    let mut dropped = Vec::new();

    for issue in issues {
        let Some(file) = diff.file(&issue.file) else {
            dropped.push(DroppedIssue {
                issue: issue.clone(),
                reason: DropReason::FileNotInDiff {
                    path: issue.file.clone(),
                },
            });
            continue;
        };

        match resolve_issue(file, issue, opts) {
            Ok(line) => comments.push(ResolvedComment {
                file: file.path.clone(),
                line,
                message: issue.message.clone(),
                issue_id: issue.id,
            }),
            Err(reason) => dropped.push(DroppedIssue {
                issue: issue.clone(),
                reason,
            }),
        }
    }

    (comments, dropped)
}
