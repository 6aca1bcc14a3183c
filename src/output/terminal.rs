//! Terminal renderer: styled flowing text grouped by file.

use colored::Colorize;

use crate::output::{OutputRenderer, ResolutionReport, Summary};

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

impl OutputRenderer for TerminalRenderer {
    fn render(&self, report: &ResolutionReport) -> String {
        let mut output = String::new();

        if report.comments.is_empty() && report.dropped.is_empty() && report.duplicates.is_empty() {
            return format!("{}", "  ✔ Nothing to publish.\n".green());
        }

        let mut sorted = report.comments.clone();
        sorted.sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));

        let mut current_file = "";
        for comment in &sorted {
            if comment.file != current_file {
                if !current_file.is_empty() {
                    output.push('\n');
                }
                current_file = &comment.file;
            }

            let location = format!("{}:{}", comment.file, comment.line);
            output.push_str(&format!(
                " {} {}\n",
                "✔".green().bold(),
                location.bold()
            ));
            output.push_str(&format!("   {}\n\n", comment.message));
        }

        for duplicate in &report.duplicates {
            let location = format!("{}:{}", duplicate.comment.file, duplicate.comment.line);
            output.push_str(&format!(
                " {} {} {} [{}]\n",
                "≡".dimmed(),
                "duplicate".dimmed(),
                location.dimmed(),
                duplicate.fingerprint.dimmed(),
            ));
        }
        if !report.duplicates.is_empty() {
            output.push('\n');
        }

        for dropped in &report.dropped {
            output.push_str(&format!(
                " {} {} {}\n",
                "✖".red().bold(),
                format!("dropped {}", dropped.issue.file).red(),
                dropped.reason
            ));
        }
        if !report.dropped.is_empty() {
            output.push('\n');
        }

        let summary = Summary::from_report(report);
        output.push_str(&format!(
            "{}\n",
            "───────────────────────────────────".dimmed()
        ));
        output.push_str(&format!(
            " {} {}, {} {}, {} {}\n",
            summary.comments.to_string().green().bold(),
            if summary.comments == 1 {
                "comment"
            } else {
                "comments"
            },
            summary.duplicates.to_string().bold(),
            if summary.duplicates == 1 {
                "duplicate"
            } else {
                "duplicates"
            },
            summary.dropped.to_string().red().bold(),
            "dropped",
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::{DuplicateComment, DuplicateReason};
    use crate::models::issue::{Issue, ResolvedComment, Severity};
    use crate::resolve::{DropReason, DroppedIssue};
    use uuid::Uuid;

    fn comment(file: &str, line: u32, message: &str) -> ResolvedComment {
        ResolvedComment {
            file: file.to_string(),
            line,
            message: message.to_string(),
            issue_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn render_empty() {
        let renderer = TerminalRenderer;
        let output = renderer.render(&ResolutionReport::default());
        assert!(output.contains("Nothing to publish"));
    }

    #[test]
    fn render_full_report() {
        let renderer = TerminalRenderer;
        let report = ResolutionReport {
            comments: vec![
                comment("src/main.rs", 42, "Unchecked unwrap"),
                comment("src/lib.rs", 3, "Missing error context"),
            ],
            dropped: vec![DroppedIssue {
                issue: Issue {
                    id: Uuid::new_v4(),
                    file: "ghost.rs".to_string(),
                    line: Some(1),
                    code_snippet: None,
                    message: "phantom".to_string(),
                    severity: Severity::Info,
                    confidence: 0.5,
                },
                reason: DropReason::FileNotInDiff {
                    path: "ghost.rs".to_string(),
                },
            }],
            duplicates: vec![DuplicateComment {
                comment: comment("src/main.rs", 42, "Unchecked unwrap again"),
                reason: DuplicateReason::Signature,
                fingerprint: "abc123def456".to_string(),
            }],
        };

        let output = renderer.render(&report);
        assert!(output.contains("src/main.rs:42"));
        assert!(output.contains("Unchecked unwrap"));
        assert!(output.contains("ghost.rs"));
        assert!(output.contains("abc123def456"));
        assert!(output.contains("2 comments"));
        assert!(output.contains("1 duplicate"));
        assert!(output.contains("1 dropped"));
    }

    #[test]
    fn comments_are_grouped_and_sorted() {
        let renderer = TerminalRenderer;
        let report = ResolutionReport {
            comments: vec![
                comment("b.rs", 9, "later"),
                comment("a.rs", 2, "earlier"),
            ],
            ..ResolutionReport::default()
        };
        let output = renderer.render(&report);
        let a = output.find("a.rs:2").unwrap();
        let b = output.find("b.rs:9").unwrap();
        assert!(a < b);
    }
}
