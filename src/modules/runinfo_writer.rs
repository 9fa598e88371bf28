// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::cell::RefMut;

use crate::backends::SharedStorage;
use crate::config::Parameters;
use crate::errors::{ModuleError, ParameterError};
use crate::event::{ChannelData, EventRecord};
use crate::modules::ConvertData;
use crate::traits::{
    ChannelFilter, Module, ModuleContext, ModuleDescriptor, ModuleKind, ModuleType, RunInfo, RunQuery,
    StorageBackend, StoreMode,
};

/// Keeps the summary record of the run and stores it through the configured
/// storage backend at the end of the run.
///
/// The existing record for the run, if any, is loaded up front: in
/// `initialize` when `runid` is configured, otherwise after the first event
/// is counted. A failed load is retried on the following events.
pub struct RunInfoWriter {
    descriptor: ModuleDescriptor,
    storage: Option<SharedStorage>,
    store_mode: StoreMode,
    comment: Option<String>,
    runid: Option<i64>,
    info: Option<RunInfo>,
    previous: Option<RunInfo>,
    previous_loaded: bool,
}

impl RunInfoWriter {
    pub fn new() -> Self {
        Self {
            descriptor: ModuleDescriptor::new(Self::KIND, "Store the run summary record")
                .depends_on(ConvertData::KIND),
            storage: None,
            store_mode: StoreMode::default(),
            comment: None,
            runid: None,
            info: None,
            previous: None,
            previous_loaded: false,
        }
    }

    pub fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        let mut module = Self::new();
        module.store_mode = params.get_or("store_mode", StoreMode::default())?;
        module.comment = params.get("comment")?;
        module.runid = params.get("runid")?;
        module.descriptor = module
            .descriptor
            .with_skip_channels(ChannelFilter::from_parameters(params)?);
        Ok(module)
    }

    pub fn with_storage(mut self, storage: SharedStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn store_mode(&self) -> StoreMode {
        self.store_mode
    }

    /// The record being built for this run, once the first event arrived.
    pub fn info(&self) -> Option<&RunInfo> {
        self.info.as_ref()
    }

    /// The record the backend held for this run before it started.
    pub fn previous(&self) -> Option<&RunInfo> {
        self.previous.as_ref()
    }

    fn backend(&self) -> Result<RefMut<'_, Box<dyn StorageBackend>>, ModuleError> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| ModuleError::fatal("no storage backend is attached"))?;
        storage
            .try_borrow_mut()
            .map_err(|_| ModuleError::recoverable("storage backend is busy"))
    }

    fn load_previous(&mut self, runid: i64) -> Result<(), ModuleError> {
        let previous = self.backend()?.load(&RunQuery::RunId(runid))?;
        self.previous = previous;
        self.previous_loaded = true;
        Ok(())
    }

    fn start_run(&mut self, event: &EventRecord) {
        let mut info = RunInfo::new(event.run_id);
        info.starttime = event.timestamp;
        info.endtime = event.timestamp;
        self.info = Some(info);
    }
}

impl Default for RunInfoWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleType for RunInfoWriter {
    const KIND: ModuleKind = ModuleKind::new("RunInfoWriter");
}

impl Module for RunInfoWriter {
    fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn initialize(&mut self, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        if self.storage.is_none() {
            return Err(ModuleError::fatal("no storage backend is attached"));
        }
        self.info = None;
        self.previous = None;
        self.previous_loaded = false;
        if let Some(runid) = self.runid {
            self.load_previous(runid)
                .map_err(|e| ModuleError::fatal(format!("unable to load run {}: {}", runid, e.message)))?;
        }
        Ok(())
    }

    fn process(&mut self, event: &mut EventRecord, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        if let Some(runid) = self.runid {
            if runid != event.run_id {
                return Err(ModuleError::recoverable(format!(
                    "event {} belongs to run {}, expected run {}",
                    event.event_id, event.run_id, runid
                )));
            }
        }
        if self.info.is_none() {
            self.start_run(event);
        }
        let Some(info) = self.info.as_mut() else {
            return Ok(());
        };
        if info.runid != event.run_id {
            return Err(ModuleError::recoverable(format!(
                "event {} belongs to run {}, this run is {}",
                event.event_id, event.run_id, info.runid
            )));
        }

        info.starttime = info.starttime.min(event.timestamp);
        info.endtime = info.endtime.max(event.timestamp);
        info.events += 1;

        let nchans = event
            .channels
            .iter()
            .filter(|ch| ch.channel_id != ChannelData::CH_SUM)
            .filter(|ch| self.descriptor.handles(ch.channel_id))
            .count();
        let known = info
            .metadata
            .get("nchans")
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        if nchans > known {
            info.metadata.insert("nchans".to_string(), nchans.to_string());
        }

        let runid = info.runid;
        if !self.previous_loaded {
            self.load_previous(runid)?;
        }
        Ok(())
    }

    fn finalize(&mut self, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        let Some(info) = self.info.as_mut() else {
            return Ok(());
        };
        if let Some(comment) = &self.comment {
            info.metadata.insert("comment".to_string(), comment.clone());
        }
        // The record stays with the module whether or not the store succeeds.
        let record = info.clone();
        self.backend()?.store(&record, self.store_mode)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
