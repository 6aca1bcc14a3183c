//! Diff engine: unified diff parsing, numbered rendering, and input plumbing.

pub mod git;
pub mod parser;
pub mod render;

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use crate::models::diff::Diff;
use crate::models::InputMode;

/// Errors from the diff engine.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("git command failed: {0}")]
    Git(String),

    #[error("failed to read diff input: {0}")]
    Read(#[from] std::io::Error),

    #[error("diff file not found: {0}")]
    PathNotFound(String),
}

/// Read a unified diff from a file path.
pub async fn read_diff_file(path: &Path) -> Result<String, DiffError> {
    if !path.exists() {
        return Err(DiffError::PathNotFound(path.display().to_string()));
    }
    tokio::fs::read_to_string(path).await.map_err(DiffError::Read)
}

/// Read a unified diff from stdin.
pub async fn read_diff_stdin() -> Result<String, DiffError> {
    use tokio::io::AsyncReadExt;
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .map_err(DiffError::Read)?;
    Ok(buf)
}

/// Produce a parsed [`Diff`] from the given input mode.
pub async fn load_diff(
    input: &InputMode,
    repo_root: &Path,
    revision_id: &str,
    metadata: BTreeMap<String, String>,
) -> Result<Diff, DiffError> {
    let raw = match input {
        InputMode::DiffFile(path) => read_diff_file(path).await?,
        InputMode::Stdin => read_diff_stdin().await?,
        InputMode::GitBase(base_ref) => git::git_diff(repo_root, base_ref).await?,
    };
    Ok(parser::parse(&raw, revision_id, metadata))
}
