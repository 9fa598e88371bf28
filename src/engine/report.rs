// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::errors::ModuleError;
use crate::traits::ModuleKind;

/// A module lifecycle call that returned an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleFailure {
    pub module: ModuleKind,
    pub error: ModuleError,
}

/// What happened to one event on its way through the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct EventReport {
    pub event_id: u64,
    /// Number of modules whose `process` was called.
    pub modules_run: usize,
    /// Every failure, recoverable or fatal, in call order.
    pub failures: Vec<ModuleFailure>,
    /// The module whose fatal failure abandoned the rest of the event.
    pub abandoned_at: Option<ModuleKind>,
}

impl EventReport {
    pub fn new(event_id: u64) -> Self {
        Self {
            event_id,
            modules_run: 0,
            failures: Vec::new(),
            abandoned_at: None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned_at.is_some()
    }

    pub fn recoverable_failures(&self) -> usize {
        self.failures.iter().filter(|f| !f.error.is_fatal()).count()
    }
}

/// Totals for a whole run, returned by `PipelineEngine::finalize`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Events that went through every module.
    pub events_processed: u64,
    /// Events cut short by a fatal module failure.
    pub events_abandoned: u64,
    /// Events the source could not deliver.
    pub source_errors: u64,
    /// `process` failures per module, recoverable and fatal alike.
    pub failures_per_module: BTreeMap<ModuleKind, usize>,
    pub finalize_errors: Vec<ModuleFailure>,
}

impl RunSummary {
    pub fn total_failures(&self) -> usize {
        self.failures_per_module.values().sum()
    }

    pub fn failures_for(&self, module: ModuleKind) -> usize {
        self.failures_per_module.get(&module).copied().unwrap_or(0)
    }
}
