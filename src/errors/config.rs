// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::errors::FactoryError;

/// Errors that can occur while validating a run configuration or resolving
/// the module dependency graph. All of them are fatal and never retried.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A circular dependency was detected in the module graph
    CyclicDependency {
        /// The cycle path showing the circular dependency
        cycle: Vec<String>,
    },
    /// A module declares a dependency on a kind that was never registered
    UnresolvedDependency {
        /// The module that has the unresolved dependency
        module: String,
        /// The dependency that couldn't be resolved
        missing_dependency: String,
    },
    /// More than one module of the same kind was requested
    DuplicateModule {
        /// The duplicated module kind
        module: String,
    },
    /// The configuration names a module the factory cannot build
    UnknownModule {
        /// The requested module name
        module: String,
    },
    /// A module or backend option could not be bound
    InvalidParameter {
        /// The module or backend that owns the option
        owner: String,
        /// The option name
        name: String,
        /// Why the value was rejected
        reason: String,
    },
    /// The configuration names a storage backend nobody registered
    UnknownBackend {
        /// The requested backend name
        backend: String,
        /// Every backend name that is registered
        available: Vec<String>,
    },
    /// Two storage backends were registered under the same name
    DuplicateBackend {
        /// The name registered twice
        backend: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CyclicDependency { cycle } => {
                write!(f, "Cyclic dependency detected: {}", cycle.join(" -> "))
            }
            ValidationError::UnresolvedDependency {
                module,
                missing_dependency,
            } => {
                write!(
                    f,
                    "Module '{}' depends on '{}' which is not registered",
                    module, missing_dependency
                )
            }
            ValidationError::DuplicateModule { module } => {
                write!(f, "Duplicate module: '{}' is registered more than once", module)
            }
            ValidationError::UnknownModule { module } => {
                write!(f, "Unknown module: '{}'", module)
            }
            ValidationError::InvalidParameter {
                owner,
                name,
                reason,
            } => {
                write!(f, "Invalid option '{}' for '{}': {}", name, owner, reason)
            }
            ValidationError::UnknownBackend { backend, available } => {
                write!(
                    f,
                    "Unknown storage backend '{}' (available: {})",
                    backend,
                    available.join(", ")
                )
            }
            ValidationError::DuplicateBackend { backend } => {
                write!(f, "Duplicate storage backend: '{}' is registered more than once", backend)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A named option that could not be converted to the type its owner expects.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid option '{name}' for '{owner}': {reason}")]
pub struct ParameterError {
    pub owner: String,
    pub name: String,
    pub reason: String,
}

impl From<ParameterError> for ValidationError {
    fn from(err: ParameterError) -> Self {
        ValidationError::InvalidParameter {
            owner: err.owner,
            name: err.name,
            reason: err.reason,
        }
    }
}

impl From<FactoryError> for ValidationError {
    fn from(err: FactoryError) -> Self {
        match err {
            FactoryError::DuplicateBackend { name } => ValidationError::DuplicateBackend { backend: name },
            FactoryError::UnknownBackend { name, available } => ValidationError::UnknownBackend {
                backend: name,
                available,
            },
        }
    }
}

/// Joins a list of validation errors into one multi-line message.
pub fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors raised while loading a run configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported configuration format '{extension}' (expected .yaml, .yml or .toml)")]
    UnsupportedFormat { extension: String },

    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Invalid(Vec<ValidationError>),
}
