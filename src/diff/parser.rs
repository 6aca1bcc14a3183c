//! Unified diff format parser.
//!
//! Parses `git diff` output (or a platform diff export) into a [`Diff`].
//! Each input line is classified into a token first, then a single fold
//! over the token stream maintains the current file/hunk state. Parsing
//! never fails: a file with a malformed hunk header is recorded with
//! whatever hunks were recovered, so one broken file cannot block the
//! rest of the change.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::diff::{ChangeType, Diff, DiffFile, Hunk, LineKind, RawLine};

/// `@@ -old_start[,old_lines] +new_start[,new_lines] @@ [header]`.
/// Missing counts default to 1 per unified-diff convention.
static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@ ?(.*)$").expect("valid hunk regex")
});

/// Parse a unified diff string into an immutable [`Diff`].
pub fn parse(
    raw: &str,
    revision_id: impl Into<String>,
    metadata: BTreeMap<String, String>,
) -> Diff {
    let mut files: Vec<DiffFile> = Vec::new();
    let mut current: Option<FileBuilder> = None;

    for line in raw.lines() {
        let in_hunk = current
            .as_ref()
            .is_some_and(|f| f.current_hunk.is_some());

        match classify(line, in_hunk) {
            Token::FileHeader { old_path, new_path } => {
                if let Some(file) = current.take() {
                    files.push(file.build());
                }
                current = Some(FileBuilder::new(old_path, new_path));
            }
            Token::NewFileMode => {
                if let Some(f) = current.as_mut() {
                    f.is_new = true;
                }
            }
            Token::DeletedFileMode => {
                if let Some(f) = current.as_mut() {
                    f.is_deleted = true;
                }
            }
            Token::Rename => {
                if let Some(f) = current.as_mut() {
                    f.is_rename = true;
                }
            }
            Token::Binary => {
                if let Some(f) = current.as_mut() {
                    f.is_binary = true;
                }
            }
            Token::HunkHeader(hunk) => {
                if let Some(f) = current.as_mut() {
                    f.flush_hunk();
                    f.current_hunk = Some(hunk);
                }
            }
            Token::Body(raw_line) => {
                if let Some(f) = current.as_mut() {
                    f.push_line(raw_line);
                }
            }
            Token::Meta => {}
        }
    }

    if let Some(file) = current.take() {
        files.push(file.build());
    }

    Diff {
        files,
        raw: raw.to_string(),
        revision_id: revision_id.into(),
        metadata,
    }
}

/// One classified input line.
enum Token<'a> {
    FileHeader { old_path: &'a str, new_path: &'a str },
    NewFileMode,
    DeletedFileMode,
    Rename,
    Binary,
    HunkHeader(Hunk),
    Body(RawLine),
    /// Header noise we recognise but don't need (index lines, mode
    /// changes, `---`/`+++` path lines, similarity scores).
    Meta,
}

/// Classify a single raw line.
///
/// `in_hunk` disambiguates body lines from extended headers: while a
/// hunk is open, classification goes strictly by the first character,
/// so a removed line whose content starts with `--` (rendered `--- a`)
/// or an added line rendered `+++i;` stays in the hunk buffer and the
/// old/new counter invariant holds. `---`/`+++` path headers and
/// `Binary files` markers only occur between hunks.
fn classify(line: &str, in_hunk: bool) -> Token<'_> {
    if let Some(rest) = line.strip_prefix("diff --git ") {
        let (old_path, new_path) = split_header_paths(rest);
        return Token::FileHeader { old_path, new_path };
    }
    if let Some(caps) = HUNK_HEADER.captures(line) {
        return Token::HunkHeader(hunk_from_captures(&caps));
    }

    if in_hunk {
        if line.starts_with('+') {
            return Token::Body(RawLine {
                kind: LineKind::Added,
                raw: line.to_string(),
            });
        }
        if line.starts_with('-') {
            return Token::Body(RawLine {
                kind: LineKind::Removed,
                raw: line.to_string(),
            });
        }
        if line.starts_with('\\') {
            // "\ No newline at end of file"
            return Token::Body(RawLine {
                kind: LineKind::NoNewline,
                raw: line.to_string(),
            });
        }
        if line.starts_with(' ') || line.is_empty() {
            return Token::Body(RawLine {
                kind: LineKind::Context,
                raw: line.to_string(),
            });
        }
        return Token::Meta;
    }

    if line.starts_with("new file mode") {
        return Token::NewFileMode;
    }
    if line.starts_with("deleted file mode") {
        return Token::DeletedFileMode;
    }
    if line.starts_with("rename from") || line.starts_with("rename to") {
        return Token::Rename;
    }
    if line.contains("Binary files") {
        return Token::Binary;
    }

    Token::Meta
}

fn hunk_from_captures(caps: &regex::Captures<'_>) -> Hunk {
    let num = |i: usize, default: u32| -> u32 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(default)
    };
    let header = caps
        .get(5)
        .map(|m| m.as_str().trim())
        .filter(|h| !h.is_empty())
        .map(String::from);

    Hunk {
        old_start: num(1, 0),
        old_lines: num(2, 1),
        new_start: num(3, 0),
        new_lines: num(4, 1),
        header,
        lines: Vec::new(),
    }
}

/// Accumulates one file while its lines stream past.
struct FileBuilder {
    old_path: String,
    new_path: String,
    is_new: bool,
    is_deleted: bool,
    is_rename: bool,
    is_binary: bool,
    additions: u32,
    deletions: u32,
    hunks: Vec<Hunk>,
    current_hunk: Option<Hunk>,
}

impl FileBuilder {
    fn new(old_path: &str, new_path: &str) -> Self {
        Self {
            old_path: old_path.to_string(),
            new_path: new_path.to_string(),
            is_new: false,
            is_deleted: false,
            is_rename: false,
            is_binary: false,
            additions: 0,
            deletions: 0,
            hunks: Vec::new(),
            current_hunk: None,
        }
    }

    fn push_line(&mut self, line: RawLine) {
        match line.kind {
            LineKind::Added => self.additions += 1,
            LineKind::Removed => self.deletions += 1,
            LineKind::Context | LineKind::NoNewline => {}
        }
        if let Some(h) = self.current_hunk.as_mut() {
            h.lines.push(line);
        }
    }

    fn flush_hunk(&mut self) {
        if let Some(h) = self.current_hunk.take() {
            self.hunks.push(h);
        }
    }

    fn build(mut self) -> DiffFile {
        self.flush_hunk();

        let change_type = if self.is_new {
            ChangeType::Added
        } else if self.is_deleted {
            ChangeType::Deleted
        } else if self.is_rename {
            ChangeType::Renamed
        } else {
            ChangeType::Modified
        };

        // Deletions keep the old path as the file's identity.
        let path = if self.is_deleted {
            self.old_path.clone()
        } else {
            self.new_path
        };

        DiffFile {
            path,
            old_path: self.old_path,
            change_type,
            additions: self.additions,
            deletions: self.deletions,
            is_binary: self.is_binary,
            hunks: self.hunks,
        }
    }
}

/// Split the paths out of a `diff --git a/path b/path` remainder.
///
/// Paths may contain spaces, so the split point is the second prefix
/// separator (` X/` where X is a known single-letter prefix) rather
/// than the first space.
fn split_header_paths(rest: &str) -> (&str, &str) {
    if let Some(b_idx) = find_second_prefix(rest) {
        let a_part = &rest[..b_idx];
        let b_part = &rest[b_idx + 1..];
        (strip_git_prefix(a_part), strip_git_prefix(b_part))
    } else {
        let mut parts = rest.splitn(2, ' ');
        let a_part = parts.next().unwrap_or("");
        let b_part = parts.next().unwrap_or("");
        (strip_git_prefix(a_part), strip_git_prefix(b_part))
    }
}

/// Strip a single-character git diff prefix (`a/`, `b/`, `c/`, `w/`, `i/`, `o/`).
///
/// `a/` and `b/` are the defaults; `c/` (commit), `w/` (working tree),
/// `i/` (index), and `o/` (object) appear when `diff.mnemonicPrefix`
/// is enabled.
fn strip_git_prefix(path: &str) -> &str {
    if path.len() >= 2 {
        let bytes = path.as_bytes();
        if bytes[1] == b'/' && matches!(bytes[0], b'a' | b'b' | b'c' | b'w' | b'i' | b'o') {
            return &path[2..];
        }
    }
    path
}

/// Find the position of the second path prefix separator (` X/`).
fn find_second_prefix(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    for i in 1..bytes.len().saturating_sub(1) {
        if bytes[i] == b' '
            && bytes.get(i + 2) == Some(&b'/')
            && matches!(bytes.get(i + 1), Some(b'a' | b'b' | b'c' | b'w' | b'i' | b'o'))
        {
            return Some(i);
        }
    }
    None
}
