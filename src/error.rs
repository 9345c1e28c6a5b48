use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not a git repository: {0}")]
    RepositoryUnavailable(String),
    #[error("Could not write status file {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to run {program}: {source}")]
    Command {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Command timed out after {secs}s: {command}")]
    CommandTimeout { command: String, secs: u64 },
    #[error("Cycle failed: {0}")]
    CycleFailed(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Could not install Ctrl+C handler. {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("I/O error. {0}")]
    Io(#[from] std::io::Error),
    #[error("Error serializing json. {0}")]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;
