//! Numbered diff renderer.
//!
//! Renders a parsed [`Diff`] back to annotated text for the LLM-facing
//! prompt builder. Every line that exists in the new version of a file
//! is tagged with its new-file line number and marked REVIEWABLE; lines
//! that only exist in the old version are explicitly marked NOT
//! REVIEWABLE so the model is never invited to comment on them.
//!
//! The set of `NEW_LINE_<n>` numbers emitted for a file is exactly
//! [`crate::resolve::reviewable_lines`] for that file; consumers that
//! are told "only report numbers marked REVIEWABLE" can rely on that.

use rayon::prelude::*;

use crate::models::diff::{Diff, DiffFile, LineKind};

/// Render the whole diff, file by file, in input order.
///
/// Each file's block already ends with a newline, so blocks are
/// concatenated directly.
pub fn render(diff: &Diff) -> String {
    diff.files
        .par_iter()
        .map(render_file)
        .collect::<Vec<_>>()
        .concat()
}

/// Render a single file with numbered, tagged lines.
pub fn render_file(file: &DiffFile) -> String {
    let mut out = String::new();
    out.push_str(&format!("FILE: {} ({})\n", file.path, file.change_type));

    if file.is_binary {
        out.push_str("(binary file, not reviewable)\n");
        return out;
    }

    for hunk in &file.hunks {
        // Hunk headers pass through unchanged.
        match &hunk.header {
            Some(h) => out.push_str(&format!(
                "@@ -{},{} +{},{} @@ {h}\n",
                hunk.old_start, hunk.old_lines, hunk.new_start, hunk.new_lines
            )),
            None => out.push_str(&format!(
                "@@ -{},{} +{},{} @@\n",
                hunk.old_start, hunk.old_lines, hunk.new_start, hunk.new_lines
            )),
        }

        let mut old_line = hunk.old_start;
        let mut new_line = hunk.new_start;

        for line in &hunk.lines {
            match line.kind {
                LineKind::Added => {
                    out.push_str(&format!(
                        "NEW_LINE_{new_line}: {} ← REVIEWABLE (ADDED)\n",
                        line.raw
                    ));
                    new_line += 1;
                }
                LineKind::Removed => {
                    out.push_str(&format!("DELETED (was line {old_line}) ← NOT REVIEWABLE\n"));
                    old_line += 1;
                }
                LineKind::Context => {
                    out.push_str(&format!(
                        "NEW_LINE_{new_line}: {} ← REVIEWABLE (CONTEXT)\n",
                        line.raw
                    ));
                    old_line += 1;
                    new_line += 1;
                }
                LineKind::NoNewline => {
                    out.push_str(&line.raw);
                    out.push('\n');
                }
            }
        }
    }

    out
}
