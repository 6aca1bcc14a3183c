//! Snippet-based line location.
//!
//! When an upstream issue arrives without a usable line number, the
//! locator finds one by matching the reported code excerpt against the
//! reviewable lines of the file. Matching is strictly per-line; a
//! snippet spanning multiple source lines will at best match its first
//! line.

use crate::constants::{MIN_TOKEN_LEN, TOKEN_OVERLAP_FLOOR};
use crate::models::diff::{DiffFile, LineKind};
use crate::resolve::reviewable_line_details;

/// Exact substring match of the trimmed snippet.
const SCORE_SUBSTRING: u32 = 100;
/// Equality after stripping all whitespace from both sides.
const SCORE_WHITESPACE_INSENSITIVE: u32 = 80;
/// Ceiling for the token-overlap fallback; scaled by the overlap ratio.
const SCORE_TOKEN_OVERLAP_MAX: u32 = 60;

/// Matching knobs.
#[derive(Debug, Clone)]
pub struct SnippetOptions {
    /// Enable the whitespace-insensitive and token-overlap fallbacks.
    pub fuzzy: bool,
    /// Break score ties in favour of added lines over context lines.
    pub prefer_added_lines: bool,
}

impl Default for SnippetOptions {
    fn default() -> Self {
        Self {
            fuzzy: true,
            prefer_added_lines: true,
        }
    }
}

/// Find the new-file line number whose content best matches `snippet`.
///
/// Returns `None` for empty/whitespace snippets and when no line scores
/// above zero. Ties are broken by line kind (added preferred when
/// enabled), then by the smaller line number.
pub fn find_line_number_by_code_snippet(
    file: &DiffFile,
    snippet: &str,
    opts: &SnippetOptions,
) -> Option<u32> {
    let needle = snippet.trim();
    if needle.is_empty() {
        return None;
    }

    let mut best: Option<(u32, LineKind, u32)> = None; // (score, kind, line)

    for detail in reviewable_line_details(file) {
        let score = match_score(needle, &detail.content, &detail.raw, opts.fuzzy);
        if score == 0 {
            continue;
        }

        let beats = match best {
            None => true,
            Some((best_score, best_kind, best_line)) => {
                if score != best_score {
                    score > best_score
                } else if opts.prefer_added_lines && detail.kind != best_kind {
                    detail.kind == LineKind::Added
                } else {
                    detail.line < best_line
                }
            }
        };
        if beats {
            best = Some((score, detail.kind, detail.line));
        }
    }

    best.map(|(_, _, line)| line)
}

/// Score one candidate line against the trimmed snippet.
fn match_score(needle: &str, content: &str, raw: &str, fuzzy: bool) -> u32 {
    if content.contains(needle) || raw.contains(needle) {
        return SCORE_SUBSTRING;
    }
    if !fuzzy {
        return 0;
    }

    if strip_whitespace(needle) == strip_whitespace(content) {
        return SCORE_WHITESPACE_INSENSITIVE;
    }

    let ratio = token_overlap(needle, content);
    if ratio >= TOKEN_OVERLAP_FLOOR {
        return (ratio * SCORE_TOKEN_OVERLAP_MAX as f64).floor() as u32;
    }
    0
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Fraction of snippet tokens that appear in the line's tokens, where
/// "appear" means one contains the other as a substring. Short tokens
/// are ignored to avoid matching on noise like `=` or `if`, and a
/// snippet that boils down to a single token never matches this way:
/// one shared keyword (`const`, `return`) says nothing about which
/// line was meant.
fn token_overlap(snippet: &str, line: &str) -> f64 {
    let snippet_tokens: Vec<&str> = snippet
        .split_whitespace()
        .filter(|t| t.len() >= MIN_TOKEN_LEN)
        .collect();
    if snippet_tokens.len() < 2 {
        return 0.0;
    }
    let line_tokens: Vec<&str> = line
        .split_whitespace()
        .filter(|t| t.len() >= MIN_TOKEN_LEN)
        .collect();
    if line_tokens.is_empty() {
        return 0.0;
    }

    let matched = snippet_tokens
        .iter()
        .filter(|st| line_tokens.iter().any(|lt| lt.contains(*st) || st.contains(lt)))
        .count();

    matched as f64 / snippet_tokens.len() as f64
}
