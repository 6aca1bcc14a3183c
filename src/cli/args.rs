//! Clap argument types and input validation.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::models::InputMode;
use crate::output::ResolutionReport;

/// Anchors AI review comments to reviewable diff lines.
#[derive(Parser, Debug)]
#[command(name = crate::constants::APP_NAME, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Print a diff annotated with explicit new-file line numbers.
    Annotate(AnnotateArgs),

    /// Resolve reported issues to publishable review comments.
    Resolve(Box<ResolveArgs>),

    /// Print version information.
    Version,
}

/// Diff input selection, shared by all diff-consuming commands.
#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Path to the repository or working directory (default: current directory).
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Pre-computed unified diff file.
    #[arg(long)]
    pub diff_file: Option<PathBuf>,

    /// Read unified diff from stdin.
    #[arg(long, default_value_t = false)]
    pub diff_stdin: bool,

    /// Branch or commit to diff against (uses git diff).
    #[arg(long)]
    pub diff_base: Option<String>,
}

impl InputArgs {
    /// Validate that exactly one input source is provided.
    pub fn validate_input(&self) -> Result<InputMode, String> {
        let sources = [
            self.diff_file.is_some(),
            self.diff_stdin,
            self.diff_base.is_some(),
        ];
        let count = sources.iter().filter(|&&x| x).count();

        if count == 0 {
            return Err(
                "one input source is required: --diff-file, --diff-stdin, or --diff-base"
                    .to_string(),
            );
        }
        if count > 1 {
            return Err(
                "only one input source allowed: --diff-file, --diff-stdin, or --diff-base"
                    .to_string(),
            );
        }

        if let Some(ref path) = self.diff_file {
            Ok(InputMode::DiffFile(path.clone()))
        } else if self.diff_stdin {
            Ok(InputMode::Stdin)
        } else if let Some(ref base) = self.diff_base {
            Ok(InputMode::GitBase(base.clone()))
        } else {
            unreachable!()
        }
    }
}

/// Arguments for the `annotate` subcommand.
#[derive(Parser, Debug)]
pub struct AnnotateArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Arguments for the `resolve` subcommand.
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// JSON file with the reported issues to resolve.
    #[arg(long)]
    pub issues: PathBuf,

    /// JSON file with already-published comments, for deduplication.
    #[arg(long)]
    pub existing_comments: Option<PathBuf>,

    /// Identifier of the diff revision being reviewed.
    #[arg(long, default_value = "local")]
    pub revision: String,

    /// Output format.
    #[arg(long, default_value = "terminal")]
    pub format: OutputFormat,

    /// Override the line-correction search distance.
    #[arg(long)]
    pub max_search_distance: Option<u32>,

    /// Override the semantic dedup similarity threshold.
    #[arg(long)]
    pub similarity_threshold: Option<f32>,

    /// Disable fuzzy snippet matching (exact substring only).
    #[arg(long, default_value_t = false)]
    pub no_fuzzy: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl OutputFormat {
    /// Render a report using the renderer for this format.
    pub fn render(&self, report: &ResolutionReport) -> String {
        use crate::output::OutputRenderer;
        match self {
            OutputFormat::Terminal => crate::output::terminal::TerminalRenderer.render(report),
            OutputFormat::Json => crate::output::json::JsonRenderer.render(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_input(
        diff_file: Option<&str>,
        diff_stdin: bool,
        diff_base: Option<&str>,
    ) -> InputArgs {
        InputArgs {
            path: PathBuf::from("."),
            diff_file: diff_file.map(PathBuf::from),
            diff_stdin,
            diff_base: diff_base.map(String::from),
        }
    }

    #[test]
    fn validate_no_input() {
        let result = make_input(None, false, None).validate_input();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("one input source is required"));
    }

    #[test]
    fn validate_multiple_inputs() {
        let result = make_input(Some("diff.patch"), false, Some("main")).validate_input();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("only one input source allowed"));
    }

    #[test]
    fn validate_diff_file_input() {
        let mode = make_input(Some("diff.patch"), false, None)
            .validate_input()
            .unwrap();
        assert!(matches!(mode, InputMode::DiffFile(_)));
    }

    #[test]
    fn validate_stdin_input() {
        let mode = make_input(None, true, None).validate_input().unwrap();
        assert!(matches!(mode, InputMode::Stdin));
    }

    #[test]
    fn validate_diff_base_input() {
        let mode = make_input(None, false, Some("main")).validate_input().unwrap();
        assert!(matches!(mode, InputMode::GitBase(_)));
    }

    #[test]
    fn validate_stdin_conflicts_with_diff_file() {
        let result = make_input(Some("diff.patch"), true, None).validate_input();
        assert!(result.is_err());
    }

    #[test]
    fn parse_annotate_command() {
        let cli =
            Cli::try_parse_from(["revanchor", "annotate", "--diff-base", "main"]).unwrap();
        match cli.command {
            Command::Annotate(args) => {
                assert_eq!(args.input.diff_base.as_deref(), Some("main"));
            }
            _ => panic!("expected Annotate command"),
        }
    }

    #[test]
    fn parse_resolve_command_with_overrides() {
        let cli = Cli::try_parse_from([
            "revanchor",
            "resolve",
            "--diff-file",
            "change.patch",
            "--issues",
            "issues.json",
            "--format",
            "json",
            "--max-search-distance",
            "5",
        ])
        .unwrap();
        match cli.command {
            Command::Resolve(args) => {
                assert_eq!(args.issues, PathBuf::from("issues.json"));
                assert_eq!(args.format, OutputFormat::Json);
                assert_eq!(args.max_search_distance, Some(5));
                assert!(!args.no_fuzzy);
            }
            _ => panic!("expected Resolve command"),
        }
    }

    #[test]
    fn resolve_requires_issues() {
        let result =
            Cli::try_parse_from(["revanchor", "resolve", "--diff-file", "change.patch"]);
        assert!(result.is_err());
    }

    #[test]
    fn output_format_render_json_is_valid() {
        let output = OutputFormat::Json.render(&ResolutionReport::default());
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(parsed.is_object());
    }
}
