use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs::home_dir;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::status::STATUS_FILE;

const CONFIG_FILE: &str = ".autocommit/config.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushTarget {
    pub remote: String,
    /// `None` pushes whatever branch is checked out.
    pub branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub interval_minutes: u64,
    pub ignore_patterns: Vec<String>,
    pub remote: String,
    pub branch: Option<String>,
    pub status_file: Option<PathBuf>,
    pub auto_commit: bool,
    pub command_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            interval_minutes: 30,
            ignore_patterns: vec![
                ".git/".to_string(),
                "node_modules".to_string(),
                "package-lock.json".to_string(),
                STATUS_FILE.to_string(),
            ],
            remote: "origin".to_string(),
            branch: None,
            status_file: None,
            auto_commit: true,
            command_timeout_secs: 120,
        }
    }
}

impl Config {
    /// Defaults, then `~/.autocommit/config.json`, then `.env`, then the environment.
    pub fn load() -> AppResult<Config> {
        let mut config = match read_config_file(&get_config_path())? {
            Some(config) => config,
            None => Config::default(),
        };

        dotenv::dotenv().ok();
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("AUTOCOMMIT_INTERVAL") {
            self.interval_minutes = parse_number("AUTOCOMMIT_INTERVAL", &value)?;
        }
        if let Some(value) = lookup("AUTOCOMMIT_TIMEOUT") {
            self.command_timeout_secs = parse_number("AUTOCOMMIT_TIMEOUT", &value)?;
        }
        if let Some(value) = lookup("AUTOCOMMIT_REMOTE") {
            self.remote = value;
        }
        if let Some(value) = lookup("AUTOCOMMIT_BRANCH") {
            self.branch = Some(value).filter(|b| !b.is_empty());
        }
        if let Some(value) = lookup("AUTOCOMMIT_IGNORE") {
            self.ignore_patterns = value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(value) = lookup("AUTOCOMMIT_STATUS_FILE") {
            self.status_file = Some(PathBuf::from(value));
        }
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.interval_minutes == 0 {
            return Err(AppError::Config(
                "interval must be at least 1 minute".to_string(),
            ));
        }
        if self.command_timeout_secs == 0 {
            return Err(AppError::Config(
                "command timeout must be at least 1 second".to_string(),
            ));
        }
        if self.remote.trim().is_empty() {
            return Err(AppError::Config("remote name is empty".to_string()));
        }
        Ok(())
    }

    pub fn push_target(&self) -> PushTarget {
        PushTarget {
            remote: self.remote.clone(),
            branch: self.branch.clone(),
        }
    }

    /// Relative status paths are resolved against the repository root.
    pub fn status_path(&self, repo_root: &Path) -> PathBuf {
        match &self.status_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => repo_root.join(path),
            None => repo_root.join(STATUS_FILE),
        }
    }

    /// Keep the ledger out of change detection when it lives inside the repository,
    /// otherwise every save would show up as a change on the next tick.
    pub fn ignore_ledger(&mut self, repo_root: &Path) {
        let status_path = self.status_path(repo_root);
        let Ok(relative) = status_path.strip_prefix(repo_root) else {
            return;
        };
        let pattern = relative.to_string_lossy().into_owned();
        if !self.ignore_patterns.contains(&pattern) {
            self.ignore_patterns.push(pattern);
        }
    }
}

fn parse_number(key: &str, value: &str) -> AppResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{key} must be a whole number, got '{value}'")))
}

fn read_config_file(path: &Path) -> AppResult<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let config = serde_json::from_str(&content)
        .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(config))
}

fn get_config_path() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(CONFIG_FILE)
}
