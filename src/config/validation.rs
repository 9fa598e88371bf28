// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Static validation of a run configuration.
//!
//! Checks run in this order and accumulate every error they find:
//!
//! 1. **Uniqueness**: each module appears at most once
//! 2. **Names**: every module is known to the `ModuleFactory` and the storage
//!    backend is one of the registered backend names
//! 3. **Options**: every known module can be built from its options
//! 4. **Graph**: the dependency graph of the built modules resolves, meaning
//!    every declared dependency is present and there is no cycle
//!
//! The graph check only runs when the first three found nothing, since it
//! needs a complete set of modules.

use std::collections::HashSet;

use crate::config::{Config, DependencyGraph};
use crate::errors::ValidationError;
use crate::modules::ModuleFactory;

/// Validate `config` without initializing anything.
pub fn validate_config(
    config: &Config,
    factory: &ModuleFactory,
    backends: &[String],
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(duplicate_errors) = validate_unique_modules(config) {
        errors.extend(duplicate_errors);
    }

    if let Err(name_errors) = validate_names(config, factory, backends) {
        errors.extend(name_errors);
    }

    let mut graph = DependencyGraph::new();
    for module_cfg in &config.modules {
        if !factory.contains(&module_cfg.module) {
            continue;
        }
        match factory.create(module_cfg) {
            Ok(module) => {
                let descriptor = module.descriptor();
                graph.add_node(descriptor.kind(), descriptor.dependencies().to_vec());
            }
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        if let Err(graph_errors) = graph.topological_order() {
            errors.extend(graph_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_unique_modules(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut errors = Vec::new();

    for module_cfg in &config.modules {
        let name = module_cfg.module.as_str();
        if !seen.insert(name) && reported.insert(name) {
            errors.push(ValidationError::DuplicateModule {
                module: name.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_names(
    config: &Config,
    factory: &ModuleFactory,
    backends: &[String],
) -> Result<(), Vec<ValidationError>> {
    let mut errors: Vec<ValidationError> = config
        .modules
        .iter()
        .filter(|m| !factory.contains(&m.module))
        .map(|m| ValidationError::UnknownModule {
            module: m.module.clone(),
        })
        .collect();

    if !backends.contains(&config.storage.backend) {
        errors.push(ValidationError::UnknownBackend {
            backend: config.storage.backend.clone(),
            available: backends.to_vec(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
