// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Outcome of a single module lifecycle call.

use std::fmt;

/// How far a module failure reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Contained to this module and this event; the chain keeps going.
    Recoverable,
    /// Abandons the rest of the current event (or the run, during setup).
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Recoverable => write!(f, "recoverable"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// Error returned by `Module::initialize`, `Module::process` or `Module::finalize`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{severity} module error: {message}")]
pub struct ModuleError {
    pub severity: Severity,
    pub message: String,
}

impl ModuleError {
    pub fn recoverable(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Recoverable,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Fatal,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl From<crate::errors::BackendError> for ModuleError {
    /// Backend failures surface to the calling module as recoverable errors;
    /// the module decides whether to escalate.
    fn from(err: crate::errors::BackendError) -> Self {
        ModuleError::recoverable(format!("storage backend error: {}", err))
    }
}

impl From<std::io::Error> for ModuleError {
    fn from(err: std::io::Error) -> Self {
        ModuleError::recoverable(format!("I/O error: {}", err))
    }
}
