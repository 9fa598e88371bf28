// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cell::RefCell;
use std::rc::Rc;

use crate::backends::{storage_factory, SharedStorage, StorageFactory};
use crate::config::{validate_config, Config};
use crate::engine::PipelineEngine;
use crate::errors::{BackendError, ConfigError, ValidationError};
use crate::modules::ModuleFactory;

/// A ready-to-run pipeline: the engine with every configured module
/// registered, and the storage backend those modules share.
pub struct Runtime {
    pub engine: PipelineEngine,
    pub storage: SharedStorage,
}

/// Builds a `Runtime` from configuration.
///
/// # Examples
///
/// ```
/// use daqchain::config::{Config, RuntimeBuilder};
/// use daqchain::traits::StorageBackend;
///
/// let config = Config::from_yaml_str(
///     "modules:\n  - module: ConvertData\n  - module: BaselineFinder\n",
/// ).unwrap();
///
/// let runtime = RuntimeBuilder::from_config(&config).unwrap();
/// assert_eq!(runtime.engine.module_count(), 2);
/// assert_eq!(runtime.storage.borrow().name(), "memory");
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build with the bundled storage backends.
    pub fn from_config(cfg: &Config) -> Result<Runtime, ConfigError> {
        Self::with_backends(cfg, &storage_factory())
    }

    /// Build with a caller-supplied backend factory.
    ///
    /// Every problem the configuration has is reported at once; nothing is
    /// initialized and no backend is connected.
    pub fn with_backends(cfg: &Config, backends: &StorageFactory) -> Result<Runtime, ConfigError> {
        let names = backends.names();
        validate_config(cfg, &ModuleFactory::new(), &names).map_err(ConfigError::Invalid)?;

        let mut backend = backends
            .create(&cfg.storage.backend)
            .map_err(|e| ConfigError::Invalid(vec![e.into()]))?;
        backend
            .configure(&cfg.storage.parameters())
            .map_err(|e| ConfigError::Invalid(vec![backend_option_error(&cfg.storage.backend, e)]))?;

        let storage: SharedStorage = Rc::new(RefCell::new(backend));
        let factory = ModuleFactory::new().with_storage(storage.clone());

        let mut engine = PipelineEngine::with_options(cfg.engine);
        let mut errors = Vec::new();
        for module_cfg in &cfg.modules {
            match factory.create(module_cfg) {
                Ok(module) => {
                    if engine.add_module(module).is_err() {
                        errors.push(ValidationError::DuplicateModule {
                            module: module_cfg.module.clone(),
                        });
                    }
                }
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(ConfigError::Invalid(errors));
        }

        Ok(Runtime { engine, storage })
    }
}

fn backend_option_error(backend: &str, err: BackendError) -> ValidationError {
    match err {
        BackendError::InvalidParameter { name, reason } => ValidationError::InvalidParameter {
            owner: backend.to_string(),
            name,
            reason,
        },
        other => ValidationError::InvalidParameter {
            owner: backend.to_string(),
            name: "options".to_string(),
            reason: other.to_string(),
        },
    }
}
