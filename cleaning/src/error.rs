use std::path::PathBuf;

use crate::decoder::ParserConfig;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cleaning, export or write-back was requested before any record was loaded.
    #[error("no match record loaded, parse a demo or read a json file first")]
    MissingRecord,

    #[error("demo file not found: {0}")]
    DemoNotFound(PathBuf),

    /// The decoder ran but did not produce its output file.
    #[error("decoder produced no output at {expected} (config: {config:?})")]
    ExternalToolFailure {
        expected: PathBuf,
        config: Box<ParserConfig>,
        stdout: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
