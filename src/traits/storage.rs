// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::Parameters;
use crate::errors::BackendError;

/// Summary record of one run, as kept by a storage backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunInfo {
    pub runid: i64,
    /// Unix seconds of the first event.
    pub starttime: i64,
    /// Unix seconds of the last event.
    pub endtime: i64,
    pub events: u64,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl RunInfo {
    pub fn new(runid: i64) -> Self {
        Self {
            runid,
            ..Default::default()
        }
    }

    /// Overwrite scalar fields from `other` and merge its metadata into ours.
    pub fn merge_from(&mut self, other: &RunInfo) {
        self.starttime = other.starttime;
        self.endtime = other.endtime;
        self.events = other.events;
        for (key, value) in &other.metadata {
            self.metadata.insert(key.clone(), value.clone());
        }
    }
}

/// Selects run records.
#[derive(Debug, Clone, PartialEq)]
pub enum RunQuery {
    RunId(i64),
    Metadata { key: String, value: String },
    All,
}

impl RunQuery {
    pub fn matches(&self, info: &RunInfo) -> bool {
        match self {
            RunQuery::RunId(runid) => info.runid == *runid,
            RunQuery::Metadata { key, value } => info.metadata.get(key) == Some(value),
            RunQuery::All => true,
        }
    }
}

/// How `store` treats an existing record with the same run id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreMode {
    /// Fail if the run already exists.
    Insert,
    /// Fail if the run does not exist; merge into the existing record.
    Update,
    /// Overwrite the whole record, inserting if missing.
    Replace,
    /// Insert, or merge into the existing record.
    #[default]
    Upsert,
}

impl StoreMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreMode::Insert => "insert",
            StoreMode::Update => "update",
            StoreMode::Replace => "replace",
            StoreMode::Upsert => "upsert",
        }
    }
}

/// Abstract storage capability selected by name at configuration time.
///
/// Connections are lazy: implementations connect on first use, and callers
/// must not assume a connection survives between calls.
pub trait StorageBackend {
    /// The name this backend is registered under.
    fn name(&self) -> &str;

    /// Bind named options before first use.
    fn configure(&mut self, _params: &Parameters) -> Result<(), BackendError> {
        Ok(())
    }

    fn connect(&mut self) -> Result<(), BackendError>;

    fn disconnect(&mut self) -> Result<(), BackendError>;

    fn is_connected(&self) -> bool;

    /// First record matching `query`, if any.
    fn load(&mut self, query: &RunQuery) -> Result<Option<RunInfo>, BackendError> {
        Ok(self.load_many(query)?.into_iter().next())
    }

    fn load_many(&mut self, query: &RunQuery) -> Result<Vec<RunInfo>, BackendError>;

    fn store(&mut self, info: &RunInfo, mode: StoreMode) -> Result<(), BackendError>;
}

/// Apply `mode` to an in-memory table of runs keyed by run id.
///
/// Shared by the bundled backends so every backend agrees on store semantics.
pub fn apply_store(
    table: &mut BTreeMap<i64, RunInfo>,
    info: &RunInfo,
    mode: StoreMode,
) -> Result<(), BackendError> {
    match mode {
        StoreMode::Insert => {
            if table.contains_key(&info.runid) {
                return Err(BackendError::AlreadyExists { runid: info.runid });
            }
            table.insert(info.runid, info.clone());
        }
        StoreMode::Update => match table.get_mut(&info.runid) {
            Some(existing) => existing.merge_from(info),
            None => return Err(BackendError::NotFound { runid: info.runid }),
        },
        StoreMode::Replace => {
            table.insert(info.runid, info.clone());
        }
        StoreMode::Upsert => match table.get_mut(&info.runid) {
            Some(existing) => existing.merge_from(info),
            None => {
                table.insert(info.runid, info.clone());
            }
        },
    }
    Ok(())
}
