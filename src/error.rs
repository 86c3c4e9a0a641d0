use std::path::PathBuf;

use thiserror::Error;

/// Failures at the edges of the pipeline: reading inputs, decoding item
/// JSON and loading settings. The synthesizers themselves never fail.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid item JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of study items, found {0}")]
    NotAnItemList(&'static str),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Read a whole text file, tagging failures with the path.
pub fn read_text(path: impl Into<PathBuf>) -> Result<String> {
    let path = path.into();
    std::fs::read_to_string(&path).map_err(|source| Error::Io { path, source })
}
