use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Exit status and captured streams of one git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// The only way the rest of the crate talks to git. Arguments are passed
/// straight to the git binary, no shell in between.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(&self, args: &[&str]) -> AppResult<CommandOutput>;
}

/// Runs the real `git` binary in a fixed directory, each call bounded by a deadline.
pub struct GitCli {
    cwd: PathBuf,
    timeout: Duration,
}

impl GitCli {
    pub fn new(cwd: impl Into<PathBuf>, timeout: Duration) -> Self {
        GitCli {
            cwd: cwd.into(),
            timeout,
        }
    }
}

impl CommandRunner for GitCli {
    async fn run(&self, args: &[&str]) -> AppResult<CommandOutput> {
        debug!(?args, cwd = %self.cwd.display(), "running git");

        let mut command = Command::new("git");
        command
            .current_dir(&self.cwd)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Keep the terminal's Ctrl+C away from git so an in-flight cycle can finish.
        #[cfg(unix)]
        command.process_group(0);

        match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => Ok(CommandOutput {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Ok(Err(source)) => Err(AppError::Command {
                program: "git".to_string(),
                source,
            }),
            Err(_) => Err(AppError::CommandTimeout {
                command: format!("git {}", args.first().copied().unwrap_or("")),
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

/// Resolve the repository root, failing if the working directory is not under git.
pub async fn ensure_repository<R: CommandRunner>(runner: &R) -> AppResult<PathBuf> {
    let output = runner
        .run(&["rev-parse", "--show-toplevel"])
        .await
        .map_err(|e| AppError::RepositoryUnavailable(e.to_string()))?;

    if !output.success() {
        return Err(AppError::RepositoryUnavailable(
            output.stderr.trim().to_string(),
        ));
    }

    Ok(PathBuf::from(output.stdout.trim()))
}

/// The checked-out branch, or `None` on a detached HEAD or any git failure.
pub async fn current_branch<R: CommandRunner>(runner: &R) -> Option<String> {
    let output = runner
        .run(&["rev-parse", "--abbrev-ref", "HEAD"])
        .await
        .ok()
        .filter(|output| output.success())?;

    let branch = output.stdout.trim().to_string();
    if branch.is_empty() || branch == "HEAD" {
        None
    } else {
        Some(branch)
    }
}
