use std::path::Path;
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git in {repo}: {source}")]
    Spawn {
        repo: String,
        #[source]
        source: std::io::Error,
    },
    #[error("git diff exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Which diff to ask git for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffRequest {
    pub staged: bool,
    pub file: Option<String>,
    /// Extra revision arguments such as `HEAD~1` or `main..feature`.
    pub revisions: Vec<String>,
}

impl DiffRequest {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["diff".to_string(), "--no-color".to_string()];
        if self.staged {
            args.push("--cached".to_string());
        }
        args.extend(self.revisions.iter().cloned());
        if let Some(file) = &self.file {
            args.push("--".to_string());
            args.push(file.clone());
        }
        args
    }
}

/// Runs `git diff` in `repo` and returns its raw output.
pub fn get_diff(repo: &Path, staged: bool, file: Option<&str>) -> Result<String, GitError> {
    let request = DiffRequest {
        staged,
        file: file.map(str::to_string),
        revisions: Vec::new(),
    };
    run_diff(repo, &request)
}

pub fn run_diff(repo: &Path, request: &DiffRequest) -> Result<String, GitError> {
    let args = request.args();
    debug!(repo = %repo.display(), ?args, "running git");

    let output = Command::new("git")
        .current_dir(repo)
        .args(&args)
        .output()
        .map_err(|source| GitError::Spawn {
            repo: repo.display().to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(GitError::Failed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let diff_text = String::from_utf8_lossy(&output.stdout).into_owned();
    info!(bytes = diff_text.len(), "loaded diff from git");
    Ok(diff_text)
}
