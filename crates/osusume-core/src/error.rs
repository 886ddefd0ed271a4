use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OsusumeError {
    #[error("catalog store unavailable: {} does not exist", .0.display())]
    StoreUnavailable(PathBuf),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
