use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Paths git reports as modified at one observation, ignore patterns already applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub paths: Vec<String>,
}

impl ChangeSet {
    pub fn new(paths: Vec<String>) -> Self {
        ChangeSet { paths }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    text: String,
}

impl CommitMessage {
    pub fn new(text: String) -> Self {
        CommitMessage { text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// First line of the message, the category summary.
    pub fn header(&self) -> &str {
        self.text.lines().next().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    NothingToCommit,
    StageFailed,
    CommitFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    PushFailed,
    Skipped,
}

/// One process run that produced at least one commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub last_commit_at: DateTime<Utc>,
    pub commits: u64,
}

/// The persisted ledger, stored as a single JSON snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    #[serde(default)]
    pub total_commits: u64,
    #[serde(default)]
    pub last_commit: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
}

impl SessionStatus {
    /// Count one commit against the run identified by `session_id`,
    /// opening a session record the first time the run commits.
    pub fn record_commit(&mut self, session_id: &str, started_at: DateTime<Utc>, at: DateTime<Utc>) {
        self.total_commits += 1;
        self.last_commit = Some(at);

        match self.sessions.iter_mut().find(|s| s.id == session_id) {
            Some(session) => {
                session.commits += 1;
                session.last_commit_at = at;
            }
            None => self.sessions.push(SessionRecord {
                id: session_id.to_string(),
                started_at,
                last_commit_at: at,
                commits: 1,
            }),
        }
    }
}

/// What a single cycle did, reported back to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    NoChanges,
    Previewed { files: usize },
    Attempted {
        files: usize,
        commit: CommitOutcome,
        push: PushOutcome,
    },
    DetectFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_commit_opens_then_extends_session() {
        let mut status = SessionStatus::default();
        let started = Utc::now();

        status.record_commit("run-1", started, started);
        status.record_commit("run-1", started, started);
        status.record_commit("run-2", started, started);

        assert_eq!(status.total_commits, 3);
        assert_eq!(status.sessions.len(), 2);
        assert_eq!(status.sessions[0].commits, 2);
        assert_eq!(status.sessions[1].commits, 1);
        assert_eq!(status.last_commit, Some(started));
    }

    #[test]
    fn status_uses_camel_case_keys() {
        let json = serde_json::to_string(&SessionStatus::default()).unwrap();
        assert!(json.contains("totalCommits"));
        assert!(json.contains("lastCommit"));
    }

    #[test]
    fn header_is_first_line() {
        let msg = CommitMessage::new("Update: 1 file(s)\n\nbody".to_string());
        assert_eq!(msg.header(), "Update: 1 file(s)");
    }
}
