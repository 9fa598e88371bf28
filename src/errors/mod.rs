// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod backend;
mod config;
mod execution;
mod module;
mod source;

pub use backend::{BackendError, FactoryError};
pub use config::{format_validation_errors, ConfigError, ParameterError, ValidationError};
pub use execution::{ExecutionError, FailureStrategy, RegistryError};
pub use module::{ModuleError, Severity};
pub use source::SourceError;
