//! Shared types used across all modules.
//!
//! This module defines the core data structures for diffs, issues, and
//! resolved comments. Other modules import from here rather than
//! reaching into each other's internals.

pub mod diff;
pub mod issue;

use std::path::PathBuf;

pub use diff::{ChangeType, Diff, DiffFile, Hunk, LineKind, RawLine, ReviewableLineDetail};
pub use issue::{ExistingComment, Issue, ResolvedComment, Severity};

/// The resolved input mode for a diff.
#[derive(Debug, Clone)]
pub enum InputMode {
    /// Read a pre-computed unified diff from a file.
    DiffFile(PathBuf),
    /// Read a unified diff from stdin.
    Stdin,
    /// Diff against a git branch or commit.
    GitBase(String),
}
