// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod dependency_graph;
mod loader;
mod parameters;
mod registry;
mod runtime;
mod validation;

#[cfg(test)]
mod integration_tests;
pub mod consts;

pub use dependency_graph::DependencyGraph;
pub use loader::{load_and_validate_config, load_config, Config, ModuleConfig, StorageConfig};
pub use parameters::Parameters;
pub use registry::{LifecycleState, ModuleRegistry, ModuleSlot};
pub use runtime::{Runtime, RuntimeBuilder};
pub use validation::validate_config;
