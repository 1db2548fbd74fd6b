//! Error types for the Data Access Layer and Query Router.

use serde::{Deserialize, Serialize};

/// Errors surfaced by the Data Access Layer and the Query Router.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Point lookup found no record.
    #[error("not found: {0}")]
    NotFound(String),

    /// The underlying store call failed (network, throttling, malformed request).
    #[error("store unavailable during {operation}: {message}")]
    StoreUnavailable { operation: String, message: String },

    /// Empty or malformed caller input.
    #[error("bad input: {0}")]
    BadInput(String),

    /// A stored item could not be decoded into its record type.
    #[error("malformed record: {0}")]
    Decode(String),
}

impl DataError {
    pub fn unavailable(operation: &str, err: &anyhow::Error) -> Self {
        DataError::StoreUnavailable {
            operation: operation.to_string(),
            message: format!("{:#}", err),
        }
    }

    /// Short machine-readable code, used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            DataError::NotFound(_) => "not_found",
            DataError::StoreUnavailable { .. } => "store_unavailable",
            DataError::BadInput(_) => "bad_request",
            DataError::Decode(_) => "malformed_record",
        }
    }
}

/// How the Data Access Layer reacts to store failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Log the failure and return an empty list or absent record.
    #[default]
    Degrade,
    /// Return [`DataError::StoreUnavailable`] to the caller.
    Strict,
}
