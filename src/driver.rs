use tracing::{debug, info, warn};

use crate::config::PushTarget;
use crate::git::{self, CommandRunner};
use crate::models::{CommitMessage, CommitOutcome, PushOutcome};

const NOTHING_TO_COMMIT: &str = "nothing to commit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverState {
    Idle,
    Staging,
    Committing,
    Pushing,
}

/// Stages, commits and pushes one synthesized message. Holds no state between runs.
pub struct CommitDriver<'a, R> {
    runner: &'a R,
    target: &'a PushTarget,
}

impl<'a, R: CommandRunner> CommitDriver<'a, R> {
    pub fn new(runner: &'a R, target: &'a PushTarget) -> Self {
        CommitDriver { runner, target }
    }

    pub async fn run(&self, message: &CommitMessage) -> (CommitOutcome, PushOutcome) {
        let commit = self.commit(message).await;
        let push = if commit == CommitOutcome::Committed {
            self.push().await
        } else {
            PushOutcome::Skipped
        };
        self.enter(DriverState::Idle);
        (commit, push)
    }

    async fn commit(&self, message: &CommitMessage) -> CommitOutcome {
        self.enter(DriverState::Staging);
        match self.runner.run(&["add", "-A"]).await {
            Ok(output) if output.success() => {}
            Ok(output) => {
                warn!(stderr = %output.stderr.trim(), "git add failed");
                return CommitOutcome::StageFailed;
            }
            Err(e) => {
                warn!(error = %e, "git add failed");
                return CommitOutcome::StageFailed;
            }
        }

        self.enter(DriverState::Committing);
        let output = match self.runner.run(&["commit", "-m", message.as_str()]).await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "git commit failed");
                return CommitOutcome::CommitFailed;
            }
        };

        if output.success() {
            info!(summary = %output.stdout.lines().next().unwrap_or("").trim(), "committed");
            CommitOutcome::Committed
        } else if output.stderr.contains(NOTHING_TO_COMMIT) || output.stdout.contains(NOTHING_TO_COMMIT) {
            CommitOutcome::NothingToCommit
        } else {
            warn!(stderr = %output.stderr.trim(), "git commit failed");
            CommitOutcome::CommitFailed
        }
    }

    async fn push(&self) -> PushOutcome {
        self.enter(DriverState::Pushing);

        let branch = match &self.target.branch {
            Some(branch) => branch.clone(),
            None => match git::current_branch(self.runner).await {
                Some(branch) => branch,
                None => {
                    warn!("HEAD is detached, not pushing");
                    return PushOutcome::Skipped;
                }
            },
        };

        match self.runner.run(&["push", self.target.remote.as_str(), branch.as_str()]).await {
            Ok(output) if output.success() => PushOutcome::Pushed,
            Ok(output) => {
                warn!(remote = %self.target.remote, %branch, stderr = %output.stderr.trim(), "git push failed");
                PushOutcome::PushFailed
            }
            Err(e) => {
                warn!(remote = %self.target.remote, %branch, error = %e, "git push failed");
                PushOutcome::PushFailed
            }
        }
    }

    fn enter(&self, state: DriverState) {
        debug!(?state, "commit driver");
    }
}
