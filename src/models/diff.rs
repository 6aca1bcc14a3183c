//! Diff-related types: parsed diffs, file diffs, hunks, and raw lines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::Display;

/// How a file changed in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChangeType {
    /// File exists only in the new version.
    Added,
    /// File exists only in the old version.
    Deleted,
    /// File content changed in place.
    Modified,
    /// File was moved (possibly with content changes).
    Renamed,
}

/// Classification of a single raw diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    /// Line exists only in the new version (`+` prefix).
    Added,
    /// Line exists only in the old version (`-` prefix).
    Removed,
    /// Line is unchanged (space prefix or empty).
    Context,
    /// `\ No newline at end of file` marker.
    NoNewline,
}

/// A single line of a hunk, kept verbatim with its `+`/`-`/space prefix.
///
/// Line numbers are not stored here; every consumer recomputes them by
/// walking the hunk from its recorded start positions, which keeps the
/// old/new counter invariant in one place instead of trusting cached
/// values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLine {
    /// The classification of this line.
    pub kind: LineKind,
    /// The literal diff text, prefix included.
    pub raw: String,
}

impl RawLine {
    /// The line text with the diff prefix stripped.
    ///
    /// Empty context lines (no leading space in the diff) yield "".
    pub fn content(&self) -> &str {
        match self.kind {
            LineKind::NoNewline => &self.raw,
            _ if self.raw.is_empty() => "",
            _ => &self.raw[1..],
        }
    }

    /// Whether this line exists in the new version of the file.
    pub fn in_new_file(&self) -> bool {
        matches!(self.kind, LineKind::Added | LineKind::Context)
    }

    /// Whether this line advances the old-file counter.
    pub fn in_old_file(&self) -> bool {
        matches!(self.kind, LineKind::Removed | LineKind::Context)
    }
}

/// A contiguous hunk within a file diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hunk {
    /// Starting line in the old file.
    pub old_start: u32,
    /// Number of old-file lines covered by this hunk.
    pub old_lines: u32,
    /// Starting line in the new file.
    pub new_start: u32,
    /// Number of new-file lines covered by this hunk.
    pub new_lines: u32,
    /// Optional hunk header text (e.g., enclosing function name).
    pub header: Option<String>,
    /// The lines in this hunk, in diff order.
    pub lines: Vec<RawLine>,
}

impl Hunk {
    /// The half-open old-file range `[old_start, old_start + old_lines)`.
    pub fn old_range_contains(&self, line: u32) -> bool {
        line >= self.old_start && line < self.old_start + self.old_lines
    }

    /// The half-open new-file range `[new_start, new_start + new_lines)`.
    pub fn new_range_contains(&self, line: u32) -> bool {
        line >= self.new_start && line < self.new_start + self.new_lines
    }
}

/// A diff for a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffFile {
    /// Path in the new version (old path for deletions).
    pub path: String,
    /// Path in the old version (differs from `path` for renames).
    pub old_path: String,
    /// How the file changed.
    pub change_type: ChangeType,
    /// Count of `+` lines (excluding `+++` headers).
    pub additions: u32,
    /// Count of `-` lines (excluding `---` headers).
    pub deletions: u32,
    /// Whether this is a binary file (no hunks).
    pub is_binary: bool,
    /// The hunks in this diff.
    pub hunks: Vec<Hunk>,
}

/// One parsed code-change unit: a revision, commit, or merge request.
///
/// Immutable once built; everything downstream reads from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diff {
    /// Per-file diffs, in input order.
    pub files: Vec<DiffFile>,
    /// The original diff text, untouched.
    pub raw: String,
    /// Opaque identifier of the reviewed revision.
    pub revision_id: String,
    /// Free-form caller metadata, passed through unmodified.
    pub metadata: BTreeMap<String, String>,
}

impl Diff {
    /// Look up a file by path, accepting either the new or old path.
    ///
    /// Leading `./` and git-style `a/`/`b/` prefixes on the query are
    /// tolerated since upstream models are sloppy about them.
    pub fn file(&self, path: &str) -> Option<&DiffFile> {
        let wanted = normalize_path(path);
        self.files
            .iter()
            .find(|f| f.path == wanted || f.old_path == wanted)
    }
}

/// Strip the decorations that commonly pollute model-reported paths.
pub fn normalize_path(path: &str) -> &str {
    let p = path.trim();
    let p = p.strip_prefix("./").unwrap_or(p);
    let p = p.strip_prefix("a/").unwrap_or(p);
    p.strip_prefix("b/").unwrap_or(p)
}

/// One reviewable line of a file, derived on demand from its hunks.
///
/// A line is reviewable iff it exists in the new version of the file;
/// removed lines never produce a detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewableLineDetail {
    /// New-file line number (1-based).
    pub line: u32,
    /// Whether the line was added or is unchanged context.
    pub kind: LineKind,
    /// Line text with the diff prefix and surrounding whitespace stripped.
    pub content: String,
    /// The literal diff text, prefix included.
    pub raw: String,
}
