// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for module registration and dependency resolution.

use crate::errors::{format_validation_errors, ValidationError};
use crate::observability::messages::StructuredLog;
use crate::traits::ModuleKind;
use std::fmt::{Display, Formatter};

fn join_kinds(kinds: &[ModuleKind]) -> String {
    kinds
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// A module was accepted by the registry.
///
/// # Log Level
/// `debug!` - Setup detail
pub struct ModuleRegistered<'a> {
    pub kind: &'a str,
    pub name: &'a str,
    pub dependency_count: usize,
}

impl Display for ModuleRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered module '{}' ({}) with {} dependencies",
            self.kind, self.name, self.dependency_count
        )
    }
}

impl StructuredLog for ModuleRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            kind = self.kind,
            name = self.name,
            dependency_count = self.dependency_count,
            "{}", self
        );
    }
}

/// The registry refused a module.
///
/// # Log Level
/// `warn!` - The caller gets the error back and decides
pub struct RegistrationRejected<'a> {
    pub kind: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for RegistrationRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Rejected module '{}': {}", self.kind, self.error)
    }
}

impl StructuredLog for RegistrationRejected<'_> {
    fn log(&self) {
        tracing::warn!(kind = self.kind, error = %self.error, "{}", self);
    }
}

/// Dependency resolution produced an execution order.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use daqchain::observability::messages::registry::ResolutionSucceeded;
/// use daqchain::traits::ModuleKind;
///
/// let order = [ModuleKind::new("ConvertData"), ModuleKind::new("BaselineFinder")];
/// let msg = ResolutionSucceeded { order: &order };
/// assert_eq!(msg.to_string(), "Resolved execution order: ConvertData -> BaselineFinder");
/// ```
pub struct ResolutionSucceeded<'a> {
    pub order: &'a [ModuleKind],
}

impl Display for ResolutionSucceeded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Resolved execution order: {}", join_kinds(self.order))
    }
}

impl StructuredLog for ResolutionSucceeded<'_> {
    fn log(&self) {
        tracing::info!(
            module_count = self.order.len(),
            order = %join_kinds(self.order),
            "{}", self
        );
    }
}

/// Dependency resolution failed; no order was produced.
///
/// # Log Level
/// `error!` - Fatal configuration problem
pub struct ResolutionFailed<'a> {
    pub module_count: usize,
    pub errors: &'a [ValidationError],
}

impl Display for ResolutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dependency resolution failed for {} modules:\n{}",
            self.module_count,
            format_validation_errors(self.errors)
        )
    }
}

impl StructuredLog for ResolutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            module_count = self.module_count,
            error_count = self.errors.len(),
            "{}", self
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_failed_lists_every_error() {
        let errors = vec![
            ValidationError::UnresolvedDependency {
                module: "PulseFinder".into(),
                missing_dependency: "Integrator".into(),
            },
            ValidationError::UnresolvedDependency {
                module: "APFinder".into(),
                missing_dependency: "ConvertData".into(),
            },
        ];
        let msg = ResolutionFailed {
            module_count: 2,
            errors: &errors,
        }
        .to_string();

        assert!(msg.starts_with("Dependency resolution failed for 2 modules"));
        assert!(msg.contains("'PulseFinder' depends on 'Integrator'"));
        assert!(msg.contains("'APFinder' depends on 'ConvertData'"));
    }
}
