//! Git CLI wrapper for producing diffs.
//!
//! Shells out to `git` via `tokio::process::Command`. Prefixes are
//! pinned so the parser sees `a/`/`b/` regardless of the user's
//! `diff.mnemonicPrefix` setting.

use std::path::Path;

use super::DiffError;

/// Run `git diff <base_ref>` and return the unified diff output.
pub async fn git_diff(repo_root: &Path, base_ref: &str) -> Result<String, DiffError> {
    let output = tokio::process::Command::new("git")
        .args(["diff", "--src-prefix=a/", "--dst-prefix=b/", base_ref])
        .current_dir(repo_root)
        .output()
        .await
        .map_err(|e| DiffError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DiffError::Git(format!(
            "git diff failed (exit {}): {stderr}",
            output.status
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| DiffError::Git(format!("git output is not valid UTF-8: {e}")))
}
