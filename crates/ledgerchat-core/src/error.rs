use std::path::PathBuf;

/// Errors from the few fallible surfaces of the engine (parsing and config).
///
/// The view computations themselves are total and never return these.
#[derive(Debug, thiserror::Error)]
pub enum LedgerChatError {
    #[error("Invalid timestamp: {value}")]
    InvalidTimestamp { value: String },

    #[error("Invalid config: {message}")]
    Config { message: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerChatError>;
