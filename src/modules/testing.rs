// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test-only modules that record what the engine does to them.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::{ModuleError, Severity};
use crate::event::{EventRecord, RawChannel, RawEvent};
use crate::traits::{Module, ModuleContext, ModuleDescriptor, ModuleKind, ModuleType};

/// Shared, ordered log of lifecycle calls across every recording module.
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Module that journals every lifecycle call as `"<call> <kind>"`
/// (`"process <kind> <event_id>"` for events) and fails on request.
pub struct RecordingModule {
    descriptor: ModuleDescriptor,
    journal: Journal,
    fail_initialize: Option<Severity>,
    fail_process: Vec<(u64, Severity)>,
    fail_finalize: bool,
}

impl RecordingModule {
    pub fn new(kind: ModuleKind, journal: Journal) -> Self {
        Self {
            descriptor: ModuleDescriptor::new(kind, "records lifecycle calls"),
            journal,
            fail_initialize: None,
            fail_process: Vec::new(),
            fail_finalize: false,
        }
    }

    pub fn depends_on(mut self, kind: ModuleKind) -> Self {
        self.descriptor = self.descriptor.depends_on(kind);
        self
    }

    pub fn fail_initialize(mut self, severity: Severity) -> Self {
        self.fail_initialize = Some(severity);
        self
    }

    pub fn fail_process_on(mut self, event_id: u64, severity: Severity) -> Self {
        self.fail_process.push((event_id, severity));
        self
    }

    pub fn fail_finalize(mut self) -> Self {
        self.fail_finalize = true;
        self
    }

    fn record(&self, entry: String) {
        self.journal.borrow_mut().push(entry);
    }

    fn error(severity: Severity, message: String) -> ModuleError {
        ModuleError { severity, message }
    }
}

impl Module for RecordingModule {
    fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn initialize(&mut self, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        self.record(format!("initialize {}", self.kind()));
        match self.fail_initialize {
            Some(severity) => Err(Self::error(severity, format!("{} refused to start", self.kind()))),
            None => Ok(()),
        }
    }

    fn process(&mut self, event: &mut EventRecord, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        self.record(format!("process {} {}", self.kind(), event.event_id));
        match self.fail_process.iter().find(|(id, _)| *id == event.event_id) {
            Some((_, severity)) => Err(Self::error(
                *severity,
                format!("{} failed on event {}", self.kind(), event.event_id),
            )),
            None => Ok(()),
        }
    }

    fn finalize(&mut self, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        self.record(format!("finalize {}", self.kind()));
        if self.fail_finalize {
            return Err(ModuleError::recoverable(format!("{} failed to finalize", self.kind())));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Counts the events it has seen.
pub struct CountingModule {
    descriptor: ModuleDescriptor,
    pub count: usize,
}

impl Default for CountingModule {
    fn default() -> Self {
        Self {
            descriptor: ModuleDescriptor::new(Self::KIND, "counts events"),
            count: 0,
        }
    }
}

impl ModuleType for CountingModule {
    const KIND: ModuleKind = ModuleKind::new("Counting");
}

impl Module for CountingModule {
    fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn process(&mut self, _event: &mut EventRecord, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        self.count += 1;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Reads `CountingModule::count` through its context on every event.
pub struct PeekingModule {
    descriptor: ModuleDescriptor,
    pub seen: Vec<Option<usize>>,
}

impl Default for PeekingModule {
    fn default() -> Self {
        Self {
            descriptor: ModuleDescriptor::new(Self::KIND, "peeks at the counter")
                .depends_on(CountingModule::KIND),
            seen: Vec::new(),
        }
    }
}

impl ModuleType for PeekingModule {
    const KIND: ModuleKind = ModuleKind::new("Peeking");
}

impl Module for PeekingModule {
    fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn process(&mut self, _event: &mut EventRecord, ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        self.seen.push(ctx.get::<CountingModule>().map(|c| c.count));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A raw event of run 1 with the given `(channel_id, samples)` pairs.
pub fn raw_event(event_id: u64, channels: Vec<(i32, Vec<f64>)>) -> RawEvent {
    RawEvent {
        run_id: 1,
        event_id,
        timestamp: 1_700_000_000 + event_id as i64,
        channels: channels
            .into_iter()
            .map(|(channel_id, samples)| RawChannel {
                channel_id,
                samples,
                ..Default::default()
            })
            .collect(),
    }
}
