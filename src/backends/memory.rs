// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::backends::StorageFactory;
use crate::errors::{BackendError, FactoryError};
use crate::observability::messages::backend::{BackendConnected, RunInfoLoaded, RunInfoStored};
use crate::observability::messages::StructuredLog;
use crate::traits::{apply_store, RunInfo, RunQuery, StorageBackend, StoreMode};

pub const NAME: &str = "memory";

/// Keeps run records in process memory for the lifetime of the instance.
///
/// Connects on first use and stays connected until told otherwise.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    runs: BTreeMap<i64, RunInfo>,
    connected: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_connected(&mut self) -> Result<(), BackendError> {
        if !self.connected {
            self.connect()?;
        }
        Ok(())
    }
}

pub fn register(factory: &mut StorageFactory) -> Result<(), FactoryError> {
    factory.register(NAME, || Box::new(MemoryBackend::new()))
}

impl StorageBackend for MemoryBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn connect(&mut self) -> Result<(), BackendError> {
        self.connected = true;
        BackendConnected {
            backend: NAME,
            location: "process memory",
        }
        .log();
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), BackendError> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn load_many(&mut self, query: &RunQuery) -> Result<Vec<RunInfo>, BackendError> {
        self.ensure_connected()?;
        let found: Vec<RunInfo> = self.runs.values().filter(|r| query.matches(r)).cloned().collect();
        RunInfoLoaded {
            backend: NAME,
            query: &format!("{:?}", query),
            found: found.len(),
        }
        .log();
        Ok(found)
    }

    fn store(&mut self, info: &RunInfo, mode: StoreMode) -> Result<(), BackendError> {
        self.ensure_connected()?;
        apply_store(&mut self.runs, info, mode)?;
        RunInfoStored {
            backend: NAME,
            runid: info.runid,
            mode: mode.as_str(),
        }
        .log();
        Ok(())
    }
}
