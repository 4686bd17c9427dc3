use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening or reading a browser cookie store.
///
/// Every failure mode of the export maps into this single family: the first
/// one encountered aborts the whole run and its message is what the process
/// prints to stderr.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{browser} cookie database not found (looked under {searched})")]
    DatabaseNotFound { browser: String, searched: String },

    #[error("cannot snapshot cookie database '{path}'{hint}: {source}")]
    Snapshot {
        path: PathBuf,
        hint: String,
        #[source]
        source: io::Error,
    },

    #[error("cookie database query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("cannot prepare cookie decryption: {0}")]
    KeySetup(String),

    #[error("cannot decrypt cookie value for host '{host}': {reason}")]
    Decrypt { host: String, reason: String },

    #[error("cookie store is not readable on this platform: {0}")]
    Unsupported(String),
}

impl StoreError {
    /// Decrypt failure for a specific host row, flattening the cause chain
    /// into the one-line message the process contract requires.
    pub fn decrypt(host: &str, err: &anyhow::Error) -> Self {
        StoreError::Decrypt {
            host: host.to_string(),
            reason: format!("{err:#}"),
        }
    }
}
