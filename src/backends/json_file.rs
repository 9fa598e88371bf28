// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::backends::StorageFactory;
use crate::config::Parameters;
use crate::errors::{BackendError, FactoryError};
use crate::observability::messages::backend::{BackendConnected, RunInfoLoaded, RunInfoStored};
use crate::observability::messages::StructuredLog;
use crate::traits::{apply_store, RunInfo, RunQuery, StorageBackend, StoreMode};

pub const NAME: &str = "json_file";

/// Keeps run records as a JSON array in a single file.
///
/// The file is read on connect. Every load or store is a complete
/// connect/operate/disconnect sequence, and stores write through before the
/// connection closes, so separate instances pointed at the same file see
/// each other's records.
///
/// # Options
/// * `path` - file to read and write (required)
#[derive(Debug, Default)]
pub struct JsonFileBackend {
    path: Option<PathBuf>,
    runs: BTreeMap<i64, RunInfo>,
    connected: bool,
}

impl JsonFileBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    fn path(&self) -> Result<&PathBuf, BackendError> {
        self.path.as_ref().ok_or_else(|| BackendError::ConnectionFailed {
            backend: NAME.to_string(),
            reason: "no 'path' option configured".to_string(),
        })
    }

    fn write_through(&self) -> Result<(), BackendError> {
        let records: Vec<&RunInfo> = self.runs.values().collect();
        let content = serde_json::to_string_pretty(&records)?;
        fs::write(self.path()?, content)?;
        Ok(())
    }

    /// Run `op` inside its own connection, disconnecting whatever the outcome.
    fn with_connection<R>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<R, BackendError>,
    ) -> Result<R, BackendError> {
        self.connect()?;
        let result = op(self);
        self.disconnect()?;
        result
    }
}

pub fn register(factory: &mut StorageFactory) -> Result<(), FactoryError> {
    factory.register(NAME, || Box::new(JsonFileBackend::new()))
}

impl StorageBackend for JsonFileBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn configure(&mut self, params: &Parameters) -> Result<(), BackendError> {
        let path: String = params.require("path")?;
        self.path = Some(PathBuf::from(path));
        Ok(())
    }

    fn connect(&mut self) -> Result<(), BackendError> {
        let path = self.path()?.clone();
        self.runs = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                let records: Vec<RunInfo> = serde_json::from_str(&content)?;
                records.into_iter().map(|r| (r.runid, r)).collect()
            }
        } else {
            BTreeMap::new()
        };
        self.connected = true;
        BackendConnected {
            backend: NAME,
            location: &path.display().to_string(),
        }
        .log();
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), BackendError> {
        self.runs.clear();
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn load_many(&mut self, query: &RunQuery) -> Result<Vec<RunInfo>, BackendError> {
        let found = self.with_connection(|backend| {
            Ok(backend
                .runs
                .values()
                .filter(|r| query.matches(r))
                .cloned()
                .collect::<Vec<_>>())
        })?;
        RunInfoLoaded {
            backend: NAME,
            query: &format!("{:?}", query),
            found: found.len(),
        }
        .log();
        Ok(found)
    }

    fn store(&mut self, info: &RunInfo, mode: StoreMode) -> Result<(), BackendError> {
        self.with_connection(|backend| {
            apply_store(&mut backend.runs, info, mode)?;
            backend.write_through()
        })?;
        RunInfoStored {
            backend: NAME,
            runid: info.runid,
            mode: mode.as_str(),
        }
        .log();
        Ok(())
    }
}
