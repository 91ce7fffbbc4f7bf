// File: src/error.rs
use std::path::PathBuf;

/// Result type used throughout the crate.
pub type Result<T, E = LinkerError> = std::result::Result<T, E>;

/// Errors that can reach the caller. Only loading and saving can fail;
/// the tagging and decomposition core never returns an error.
#[derive(Debug, thiserror::Error)]
pub enum LinkerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    #[error(transparent)]
    Toml(#[from] toml_edit::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A malformed prefix-rule table. Fatal at startup.
    #[error("Prefix table error: {0}")]
    PrefixTable(String),

    #[error("The path '{0}' is a directory, but a file was expected.")]
    PathIsDirectory(PathBuf),
}

/// Failures of an external collaborator (dictionary store, root store,
/// Hebrew root service). These are caught at the collaborator boundary and
/// downgraded to an empty lookup.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service answered with status {0}")]
    Status(u16),

    #[error("Malformed service payload: {0}")]
    Malformed(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}
