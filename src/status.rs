use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::models::SessionStatus;

pub const STATUS_FILE: &str = ".auto-commit-status.json";

pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StatusStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing, unreadable or corrupt files all yield a fresh zeroed record.
    pub fn load(&self) -> SessionStatus {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return SessionStatus::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "status file unreadable, starting fresh");
                return SessionStatus::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "status file corrupt, starting fresh");
            SessionStatus::default()
        })
    }

    /// Replace the whole record: write a sibling temp file, then rename over the old one.
    pub fn save(&self, status: &SessionStatus) -> AppResult<()> {
        let data = serde_json::to_string_pretty(status)?;
        let tmp = self.path.with_extension("json.tmp");

        let persistence = |source| AppError::Persistence {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(persistence)?;
        }
        fs::write(&tmp, data).map_err(persistence)?;
        fs::rename(&tmp, &self.path).map_err(persistence)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn load_missing_returns_zeroed() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatusStore::new(dir.path().join(STATUS_FILE));
        assert_eq!(store.load(), SessionStatus::default());
    }

    #[test]
    fn load_corrupt_returns_zeroed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATUS_FILE);
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(StatusStore::new(&path).load(), SessionStatus::default());
    }

    #[test]
    fn reads_ledger_written_by_older_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATUS_FILE);
        fs::write(
            &path,
            r#"{ "totalCommits": 12, "lastCommit": "2025-12-10T09:30:00.000Z", "sessions": [] }"#,
        )
        .unwrap();

        let status = StatusStore::new(&path).load();
        assert_eq!(status.total_commits, 12);
        assert!(status.last_commit.is_some());
    }

    #[test]
    fn save_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatusStore::new(dir.path().join(STATUS_FILE));
        let now = Utc::now();

        let mut status = SessionStatus::default();
        status.record_commit("run", now, now);
        store.save(&status).unwrap();
        status.record_commit("run", now, now);
        store.save(&status).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.total_commits, 2);
        assert_eq!(loaded.sessions.len(), 1);
        assert!(!dir.path().join(".auto-commit-status.json.tmp").exists());
    }

    #[test]
    fn save_to_unwritable_location_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        // A regular file where a directory is expected.
        let store = StatusStore::new(blocker.join("status.json"));

        let err = store.save(&SessionStatus::default()).unwrap_err();
        assert!(matches!(err, AppError::Persistence { .. }));
    }
}
