// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::engine::RunState;
use crate::errors::config::format_validation_errors;
use crate::errors::{ModuleError, ValidationError};
use crate::traits::ModuleKind;

/// What the engine does when a module reports a fatal error while processing an event.
///
/// Recoverable failures never consult this policy: they are logged and the
/// remaining modules still run for that event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    /// Abandon the event, finalize every module and end the run.
    #[default]
    FailFast,
    /// Abandon the rest of the event and carry on with the next one.
    ContinueOnError,
}

impl FailureStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStrategy::FailFast => "fail_fast",
            FailureStrategy::ContinueOnError => "continue_on_error",
        }
    }
}

/// Errors raised while adding modules to a registry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("module kind '{kind}' is already registered")]
    DuplicateModule { kind: ModuleKind },

    #[error("cannot register '{kind}': execution order has already been resolved")]
    AlreadyResolved { kind: ModuleKind },
}

/// Run-level errors raised by the pipeline engine.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("dependency resolution failed:\n{}", format_validation_errors(.0))]
    Configuration(Vec<ValidationError>),

    #[error(transparent)]
    Registration(#[from] RegistryError),

    #[error("module '{module}' failed to initialize: {source}")]
    InitializationFailed {
        module: ModuleKind,
        #[source]
        source: ModuleError,
    },

    #[error("module '{module}' failed fatally on event {event_id}: {source}")]
    FatalModuleFailure {
        module: ModuleKind,
        event_id: u64,
        #[source]
        source: ModuleError,
    },

    #[error("cannot {operation} while the engine is {state}")]
    InvalidTransition {
        state: RunState,
        operation: &'static str,
    },
}
