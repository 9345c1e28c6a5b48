use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::git::CommandRunner;
use crate::models::ChangeSet;

/// Ask git for the modified paths, dropping any that contain an ignore pattern.
pub async fn detect_changes<R: CommandRunner>(runner: &R, ignore: &[String]) -> AppResult<ChangeSet> {
    let output = runner
        .run(&["status", "--porcelain", "-z"])
        .await
        .map_err(|e| AppError::RepositoryUnavailable(e.to_string()))?;

    if !output.success() {
        return Err(AppError::RepositoryUnavailable(
            output.stderr.trim().to_string(),
        ));
    }

    let changes = parse_status(&output.stdout, ignore);
    debug!(files = changes.len(), "detected changes");
    Ok(changes)
}

/// Parse `git status --porcelain -z` output: NUL-terminated `XY path` entries,
/// paths unquoted. A rename or copy entry is followed by its source path.
pub fn parse_status(stdout: &str, ignore: &[String]) -> ChangeSet {
    let mut paths = Vec::new();
    let mut entries = stdout.split('\0');

    while let Some(entry) = entries.next() {
        let Some(code) = entry.get(..2) else {
            continue;
        };
        if code.contains('R') || code.contains('C') {
            entries.next();
        }

        let path = entry.get(3..).unwrap_or("");
        if path.is_empty() || ignore.iter().any(|pattern| path.contains(pattern.as_str())) {
            continue;
        }
        paths.push(path.to_string());
    }

    ChangeSet::new(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::{fail, ok, ScriptedRunner};

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn ignored_paths_are_dropped() {
        let changes = parse_status("M  app.js\0M  node_modules/x.js\0", &patterns(&["node_modules"]));
        assert_eq!(changes.paths, vec!["app.js"]);
    }

    #[test]
    fn keeps_native_order_and_unstaged_codes() {
        let stdout = " M src/main.rs\0?? notes.md\0A  lib/new.rs\0 D gone.txt\0";
        let changes = parse_status(stdout, &[]);
        assert_eq!(
            changes.paths,
            vec!["src/main.rs", "notes.md", "lib/new.rs", "gone.txt"]
        );
    }

    #[test]
    fn rename_reports_new_path() {
        let changes = parse_status("R  new.rs\0old.rs\0M  lib.rs\0", &[]);
        assert_eq!(changes.paths, vec!["new.rs", "lib.rs"]);
    }

    #[test]
    fn blank_output_is_empty() {
        assert!(parse_status("", &[]).is_empty());
        assert!(parse_status("\0", &[]).is_empty());
    }

    #[test]
    fn non_ascii_and_spaced_paths_stay_literal() {
        let changes = parse_status("?? été.md\0 M docs/my notes.txt\0", &[]);
        assert_eq!(changes.paths, vec!["été.md", "docs/my notes.txt"]);
    }

    #[tokio::test]
    async fn detect_runs_porcelain_status() {
        let runner = ScriptedRunner::new().respond("status", ok("M  a.css\0"));
        let changes = detect_changes(&runner, &[]).await.unwrap();

        assert_eq!(changes.paths, vec!["a.css"]);
        assert_eq!(runner.calls(), vec![vec!["status", "--porcelain", "-z"]]);
    }

    #[tokio::test]
    async fn failed_status_is_repository_unavailable() {
        let runner = ScriptedRunner::new().respond("status", fail("fatal: not a git repository"));
        let err = detect_changes(&runner, &[]).await.unwrap_err();
        assert!(matches!(err, AppError::RepositoryUnavailable(_)));
    }
}
