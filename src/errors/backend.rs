// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for backend selection and storage backend operations.

/// Errors raised by a `BackendFactory`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FactoryError {
    /// A constructor was already registered under this name
    #[error("backend '{name}' is already registered")]
    DuplicateBackend { name: String },

    /// No constructor is registered under this name
    #[error("no such backend '{name}' (available: {})", .available.join(", "))]
    UnknownBackend {
        name: String,
        available: Vec<String>,
    },
}

/// Errors raised by a storage backend operation.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend '{backend}' is not connected")]
    NotConnected { backend: String },

    #[error("backend '{backend}' failed to connect: {reason}")]
    ConnectionFailed { backend: String, reason: String },

    #[error("run {runid} not found")]
    NotFound { runid: i64 },

    #[error("run {runid} already exists")]
    AlreadyExists { runid: i64 },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<crate::errors::ParameterError> for BackendError {
    fn from(err: crate::errors::ParameterError) -> Self {
        BackendError::InvalidParameter {
            name: err.name,
            reason: err.reason,
        }
    }
}
