//! Integration tests for the diff → resolution → dedup pipeline,
//! using the public API from the revanchor crate.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use revanchor::dedup::{Candidate, CommentDeduplicator, DedupConfig};
use revanchor::diff::{parser, render};
use revanchor::models::diff::{ChangeType, Diff, DiffFile, Hunk, LineKind, RawLine};
use revanchor::models::issue::{Issue, ResolvedComment, Severity};
use revanchor::providers::{EmbeddingProvider, ProviderError};
use revanchor::resolve;
use revanchor::resolve::snippet::{find_line_number_by_code_snippet, SnippetOptions};

fn parse(input: &str) -> Diff {
    parser::parse(input, "rev-test", BTreeMap::new())
}

fn issue(file: &str, line: Option<u32>, snippet: Option<&str>, confidence: f32) -> Issue {
    Issue {
        id: Uuid::new_v4(),
        file: file.to_string(),
        line,
        code_snippet: snippet.map(String::from),
        message: "integration test issue".to_string(),
        severity: Severity::Warning,
        confidence,
    }
}

// ---------------------------------------------------------------------------
// parser properties
// ---------------------------------------------------------------------------

const MIXED_DIFF: &str = r#"diff --git a/src/app.vue b/src/app.vue
index 1234567..abcdefg 100644
--- a/src/app.vue
+++ b/src/app.vue
@@ -103,5 +103,7 @@ export default {
   <a-select
     v-model="value"
+    :allow-clear="true"
+    :enable-reset="false"
     :dropdown-match-select-width="false"
   >
   </a-select>
diff --git a/calc.js b/calc.js
index 2345678..bcdefgh 100644
--- a/calc.js
+++ b/calc.js
@@ -11,6 +11,6 @@
 const a = 1;
 const b = 2;
-const d = 4;
 const c = 3;
 const e = 5;
 const f = 6;
+const g = 7;
"#;

#[test]
fn additions_and_deletions_match_prefixed_lines() {
    let diff = parse(MIXED_DIFF);
    for file in &diff.files {
        let plus: u32 = file
            .hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.kind == LineKind::Added)
            .count() as u32;
        let minus: u32 = file
            .hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.kind == LineKind::Removed)
            .count() as u32;
        assert_eq!(file.additions, plus, "additions for {}", file.path);
        assert_eq!(file.deletions, minus, "deletions for {}", file.path);
    }
}

#[test]
fn rendered_line_numbers_match_reviewable_sets() {
    let diff = parse(MIXED_DIFF);
    for file in &diff.files {
        let out = render::render_file(file);
        let rendered: BTreeSet<u32> = out
            .lines()
            .filter_map(|l| l.strip_prefix("NEW_LINE_"))
            .filter_map(|l| l.split(':').next())
            .filter_map(|n| n.parse().ok())
            .collect();
        assert_eq!(rendered, resolve::reviewable_lines(file));
    }
}

#[test]
fn validate_is_idempotent_on_reviewable_lines() {
    let diff = parse(MIXED_DIFF);
    for file in &diff.files {
        for line in resolve::reviewable_lines(file) {
            let v = resolve::validate_and_correct_line_number(file, line, 3);
            assert!(v.valid, "{}:{line} should validate", file.path);
            assert_eq!(v.line, Some(line));
        }
    }
}

#[test]
fn deleted_old_lines_map_to_none() {
    let diff = parse(MIXED_DIFF);
    let calc = diff.file("calc.js").unwrap();
    assert_eq!(resolve::map_old_line_to_new_line(calc, 13), None);
    // Context after the deletion shifts up by one.
    assert_eq!(resolve::map_old_line_to_new_line(calc, 14), Some(13));
}

// ---------------------------------------------------------------------------
// scenario: snippet location in a mixed hunk
// ---------------------------------------------------------------------------

#[test]
fn snippet_locates_added_and_context_lines() {
    let diff = parse(MIXED_DIFF);
    let vue = diff.file("src/app.vue").unwrap();

    assert_eq!(
        resolve::reviewable_lines(vue),
        BTreeSet::from([103, 104, 105, 106, 107, 108, 109])
    );

    let opts = SnippetOptions::default();
    assert_eq!(
        find_line_number_by_code_snippet(vue, "enable-reset", &opts),
        Some(106)
    );
    assert_eq!(
        find_line_number_by_code_snippet(vue, "dropdown-match-select-width", &opts),
        Some(107)
    );
}

// ---------------------------------------------------------------------------
// scenario: deleted content never matches
// ---------------------------------------------------------------------------

#[test]
fn deleted_content_is_unmatchable_and_marked() {
    let diff = parse(MIXED_DIFF);
    let calc = diff.file("calc.js").unwrap();

    assert_eq!(
        find_line_number_by_code_snippet(calc, "const d = 4", &SnippetOptions::default()),
        None
    );

    let rendered = render::render_file(calc);
    assert!(rendered.contains("DELETED (was line 13) ← NOT REVIEWABLE"));
    assert!(rendered.contains("NEW_LINE_16: +const g = 7; ← REVIEWABLE (ADDED)"));
}

// ---------------------------------------------------------------------------
// scenario: forward-biased correction
// ---------------------------------------------------------------------------

/// A file whose reviewable set has a hole at new line 105: the first
/// hunk declares a new range of 103..110 but its body was truncated
/// after line 104, and a second hunk resumes at 106.
fn file_with_hole_at_105() -> DiffFile {
    let ctx = |text: &str| RawLine {
        kind: LineKind::Context,
        raw: format!(" {text}"),
    };
    DiffFile {
        path: "holed.rs".to_string(),
        old_path: "holed.rs".to_string(),
        change_type: ChangeType::Modified,
        additions: 0,
        deletions: 0,
        is_binary: false,
        hunks: vec![
            Hunk {
                old_start: 100,
                old_lines: 7,
                new_start: 103,
                new_lines: 7,
                header: None,
                lines: vec![ctx("alpha"), ctx("beta")],
            },
            Hunk {
                old_start: 110,
                old_lines: 4,
                new_start: 106,
                new_lines: 4,
                header: None,
                lines: vec![ctx("gamma"), ctx("delta"), ctx("epsilon"), ctx("zeta")],
            },
        ],
    }
}

#[test]
fn correction_searches_forward_before_backward() {
    let file = file_with_hole_at_105();
    // 104 and 106 are both one step from 105; forward wins.
    let v = resolve::validate_and_correct_line_number(&file, 105, 3);
    assert!(!v.valid);
    assert_eq!(v.line, None);
    assert_eq!(v.suggestion, Some(106));
}

#[test]
fn correction_never_crosses_into_an_adjacent_hunk() {
    let file = file_with_hole_at_105();
    // New line 112 is inside the second hunk's gap-free neighbourhood
    // only numerically; it belongs to no hunk and gets no suggestion.
    let v = resolve::validate_and_correct_line_number(&file, 112, 3);
    assert!(!v.valid);
    assert_eq!(v.suggestion, None);

    let diff = parse(MIXED_DIFF);
    let calc = diff.file("calc.js").unwrap();
    // Outside every hunk entirely; nothing may be suggested even
    // though reviewable lines exist elsewhere in the file.
    let v = resolve::validate_and_correct_line_number(calc, 30, 3);
    assert!(!v.valid);
    assert_eq!(v.suggestion, None);
}

// ---------------------------------------------------------------------------
// scenario: semantic dedup keeps the higher-confidence comment
// ---------------------------------------------------------------------------

struct CannedEmbedding {
    vectors: HashMap<String, Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for CannedEmbedding {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(texts
            .iter()
            .map(|t| {
                self.vectors
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| vec![0.0, 0.0, 1.0])
            })
            .collect())
    }
}

#[tokio::test]
async fn similar_comments_on_same_line_are_deduplicated() {
    let message_a = "This query is vulnerable to SQL injection.";
    let message_b = "This query is vulnerable to SQL injection attacks.";
    let provider = CannedEmbedding {
        vectors: HashMap::from([
            (message_a.to_string(), vec![0.99, 0.14, 0.0]),
            (message_b.to_string(), vec![1.0, 0.0, 0.0]),
        ]),
    };
    let dedup = CommentDeduplicator::new(Arc::new(provider), DedupConfig::default());

    let make = |message: &str, confidence: f32| Candidate {
        comment: ResolvedComment {
            file: "db.rs".to_string(),
            line: 42,
            message: message.to_string(),
            issue_id: Uuid::new_v4(),
        },
        confidence,
    };

    let outcome = dedup
        .partition(&[], vec![make(message_a, 0.7), make(message_b, 0.95)])
        .await;

    assert_eq!(outcome.unique.len(), 1);
    assert_eq!(outcome.unique[0].message, message_b);
    assert_eq!(outcome.duplicates.len(), 1);
    assert_eq!(outcome.duplicates[0].comment.message, message_a);
}

// ---------------------------------------------------------------------------
// full pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn end_to_end_resolution_and_dedup() {
    let diff = parse(MIXED_DIFF);
    let issues = vec![
        // Anchored by snippet despite a wrong line number.
        issue("src/app.vue", Some(103), Some("enable-reset"), 0.9),
        // Valid line, kept as-is.
        issue("calc.js", Some(16), None, 0.8),
        // Outside every hunk, dropped without a guess.
        issue("calc.js", Some(30), None, 0.8),
        // Unknown file, dropped.
        issue("missing.rs", Some(1), None, 0.5),
        // No location at all, dropped.
        issue("calc.js", None, None, 0.5),
    ];

    let (comments, dropped) =
        resolve::resolve_issues(&diff, &issues, &resolve::ResolveOptions::default());

    assert_eq!(dropped.len(), 3);
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].file, "src/app.vue");
    assert_eq!(comments[0].line, 106);

    // Every published line is reviewable in its file.
    for comment in &comments {
        let file = diff.file(&comment.file).unwrap();
        assert!(resolve::reviewable_lines(file).contains(&comment.line));
    }

    // Signature-only dedup against an already-published copy of the
    // first comment.
    let existing = vec![revanchor::models::issue::ExistingComment {
        file: comments[0].file.clone(),
        line: comments[0].line,
        content: comments[0].message.clone(),
    }];
    let candidates: Vec<Candidate> = comments
        .into_iter()
        .map(|comment| Candidate {
            comment,
            confidence: 0.9,
        })
        .collect();
    let dedup = CommentDeduplicator::new(
        Arc::new(revanchor::providers::NoopEmbedding),
        DedupConfig::default(),
    );
    let outcome = dedup.partition(&existing, candidates).await;

    assert_eq!(outcome.unique.len(), 1);
    assert_eq!(outcome.unique[0].file, "calc.js");
    assert_eq!(outcome.duplicates.len(), 1);
    assert_eq!(outcome.duplicates[0].comment.file, "src/app.vue");
}
