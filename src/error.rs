//! Error types for household-ledger

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for ledger parsing, aggregation and loading
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The string does not contain a recognizable currency amount
    #[error("malformed amount {input:?}: {reason}")]
    MalformedAmount { input: String, reason: &'static str },

    /// Aggregation was asked to total a line whose amount never parsed
    #[error("cannot aggregate: entry '{label}' has no valid amount")]
    Aggregation { label: String },

    /// A total went past the largest representable amount
    #[error("total overflowed at entry '{label}'")]
    Overflow { label: String },

    /// Ledger entry failed validation
    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    /// Dataset configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Dataset file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dataset JSON could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LedgerError {
    pub(crate) fn malformed(input: &str, reason: &'static str) -> Self {
        Self::MalformedAmount {
            input: input.to_string(),
            reason,
        }
    }
}
