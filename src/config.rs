use std::path::PathBuf;

use clap::Parser;
use diffdeck::git::DiffRequest;
use diffdeck::{DiffSessionState, ViewMode};

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Git diff arguments (e.g., "HEAD~1", "main..feature")
    #[arg(default_value = "")]
    pub diff_args: String,

    /// Repository to run git in
    #[arg(short = 'C', long, default_value = ".")]
    pub repo: PathBuf,

    /// Show staged changes (git diff --cached)
    #[arg(long)]
    pub staged: bool,

    /// Limit the diff to a single path
    #[arg(long)]
    pub file: Option<String>,

    /// Read a unified diff from this file instead of running git ("-" for stdin)
    #[arg(long, conflicts_with_all = ["staged", "file", "repo"])]
    pub input: Option<PathBuf>,

    /// Start in side-by-side view
    #[arg(long)]
    pub split: bool,

    /// Highlight changed words inside replaced lines
    #[arg(long)]
    pub word_diff: bool,

    /// Syntax highlighting theme
    #[arg(long, default_value = DEFAULT_THEME)]
    pub theme: String,

    /// Append logs to this file (filtered by RUST_LOG)
    #[arg(long, env = "DIFFDECK_LOG")]
    pub log_file: Option<PathBuf>,

    /// Print per-file stats and the summary, then exit
    #[arg(long)]
    pub stat: bool,
}

/// Where the raw diff text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffSource {
    Git { repo: PathBuf, request: DiffRequest },
    File(PathBuf),
    Stdin,
}

impl Args {
    pub fn source(&self) -> DiffSource {
        match &self.input {
            Some(path) if path.as_os_str() == "-" => DiffSource::Stdin,
            Some(path) => DiffSource::File(path.clone()),
            None => DiffSource::Git {
                repo: self.repo.clone(),
                request: DiffRequest {
                    staged: self.staged,
                    file: self.file.clone(),
                    revisions: self.diff_args.split_whitespace().map(str::to_string).collect(),
                },
            },
        }
    }

    pub fn session(&self) -> DiffSessionState {
        let mode = if self.split {
            ViewMode::Split
        } else {
            ViewMode::Unified
        };
        DiffSessionState::new(mode, self.word_diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_git_in_current_directory() {
        let args = Args::try_parse_from(["diffdeck"]).expect("defaults parse");

        assert_eq!(args.theme, DEFAULT_THEME);
        assert_eq!(
            args.source(),
            DiffSource::Git {
                repo: PathBuf::from("."),
                request: DiffRequest::default(),
            }
        );
        assert_eq!(args.session(), DiffSessionState::default());
    }

    #[test]
    fn revisions_staged_and_file() {
        let args = Args::try_parse_from([
            "diffdeck",
            "HEAD~2 HEAD",
            "--staged",
            "--file",
            "src/lib.rs",
            "--split",
            "--word-diff",
        ])
        .expect("args parse");

        let DiffSource::Git { request, .. } = args.source() else {
            panic!("expected git source");
        };
        assert_eq!(request.revisions, vec!["HEAD~2", "HEAD"]);
        assert!(request.staged);
        assert_eq!(request.file.as_deref(), Some("src/lib.rs"));

        let session = args.session();
        assert_eq!(session.mode, ViewMode::Split);
        assert!(session.word_diff);
    }

    #[test]
    fn input_selects_file_or_stdin() {
        let args = Args::try_parse_from(["diffdeck", "--input", "-"]).expect("args parse");
        assert_eq!(args.source(), DiffSource::Stdin);

        let args = Args::try_parse_from(["diffdeck", "--input", "change.patch"]).expect("args parse");
        assert_eq!(args.source(), DiffSource::File(PathBuf::from("change.patch")));

        assert!(Args::try_parse_from(["diffdeck", "--input", "x.diff", "--staged"]).is_err());
    }
}
