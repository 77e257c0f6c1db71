//! Error types for nebula-load.

use thiserror::Error;

/// Errors that can abort an import run.
///
/// Batch-level insert failures are not represented here: they are recorded
/// in [`crate::ImportStats`] and the run continues with the next batch.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Configuration file missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection, session, or space-selection failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Input table missing or unreadable
    #[error("Data load error: {0}")]
    Data(String),

    /// Tag creation failed after retries
    #[error("Schema error: {0}")]
    Schema(String),

    /// Store-level error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors reported by the graph store session.
#[derive(Error, Debug)]
pub enum StoreError {
    /// HTTP transport failure talking to the store gateway
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store accepted the request but rejected the statement
    #[error("store rejected statement (code {code}): {message}")]
    Gateway { code: i64, message: String },

    /// Retry budget exhausted for a statement
    #[error("statement failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },

    /// Gateway response did not match the expected shape
    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),
}
