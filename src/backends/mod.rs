// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Storage backends for run summary records.
//!
//! Backends are selected by name through a `BackendFactory`. The bundled ones
//! are registered explicitly by `storage_factory()`; there is no static
//! self-registration and no default fallback for an unknown name.
//!
//! # Available Backends
//!
//! ## `memory`
//! Records live in process memory for the lifetime of the instance. The
//! connection opens on first use and stays open.
//!
//! ## `json_file`
//! Records live in a JSON file named by the `path` option. Each load or store
//! connects, operates, writes through and disconnects again.
//!
//! # Examples
//!
//! ```rust
//! use daqchain::backends::storage_factory;
//! use daqchain::traits::{RunInfo, RunQuery, StoreMode};
//!
//! let factory = storage_factory();
//! assert_eq!(factory.names(), vec!["json_file", "memory"]);
//!
//! let mut backend = factory.create("memory")?;
//! backend.store(&RunInfo::new(7), StoreMode::Upsert)?;
//! assert!(backend.load(&RunQuery::RunId(7))?.is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::FactoryError;
use crate::traits::StorageBackend;

pub mod factory;
pub mod json_file;
pub mod memory;

pub use factory::{BackendFactory, StorageFactory};
pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;

/// One storage backend instance shared by every module of a run.
pub type SharedStorage = Rc<RefCell<Box<dyn StorageBackend>>>;

/// Register every bundled storage backend into `factory`.
///
/// Stops at the first name that is already taken; that name keeps its
/// existing constructor.
pub fn register_bundled(factory: &mut StorageFactory) -> Result<(), FactoryError> {
    memory::register(factory)?;
    json_file::register(factory)?;
    Ok(())
}

/// A factory with every bundled storage backend registered.
pub fn storage_factory() -> StorageFactory {
    let mut factory = StorageFactory::new();
    let registered = register_bundled(&mut factory);
    debug_assert!(
        registered.is_ok(),
        "bundled storage backends share a name: {:?}",
        registered
    );
    factory
}
