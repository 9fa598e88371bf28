// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The per-event pipeline engine.
//!
//! `PipelineEngine` owns a `ModuleRegistry` and drives its modules through
//! one run: resolve the execution order once, initialize every module in
//! that order, hand each event to every module in that order, and finalize.
//!
//! # Failure containment
//!
//! * An `initialize` failure stops setup. Modules after the failing one are
//!   never initialized; the ones before it, and the failing module itself,
//!   are finalized so they can release what they acquired.
//! * A recoverable `process` failure is logged and counted, and the next
//!   module still runs for that event.
//! * A fatal `process` failure abandons the rest of that event. What happens
//!   next is decided by `FailureStrategy`.
//! * A `finalize` failure is logged and collected; every other module still
//!   finalizes.
//!
//! # Cross-module access
//!
//! Slots are stored in execution order. For each call the engine splits the
//! slot list around the current module, so the module gets `&mut self` while
//! a `ModuleContext` gives it shared access to every other module.

use std::time::Instant;

use tracing::Span;

use crate::config::{LifecycleState, ModuleRegistry, ModuleSlot};
use crate::engine::{EngineOptions, EventReport, FinalizeOrder, ModuleFailure, RunState, RunSummary};
use crate::errors::{ExecutionError, FailureStrategy, ModuleError, SourceError};
use crate::event::{EventRecord, EventSource};
use crate::observability::messages::engine::{
    EventAbandoned, EventProcessed, EventStarted, RunFinalized, RunInitializationFailed,
    RunInitializing, SourceEventSkipped,
};
use crate::observability::messages::module::{
    ModuleCallStarted, ModuleFinalizeFailed, ModuleFinalized, ModuleInitializeFailed,
    ModuleInitialized, ModuleProcessFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Module, ModuleContext, ModuleKind, ModuleType};

/// Call `f` on the slot at `index` with a context over every other slot.
fn with_slot<R>(
    slots: &mut [ModuleSlot],
    index: usize,
    f: impl FnOnce(&mut ModuleSlot, &ModuleContext<'_>) -> R,
) -> Option<R> {
    let (before, rest) = slots.split_at_mut(index);
    let (current, after) = rest.split_first_mut()?;
    let ctx = ModuleContext::new(before, after);
    Some(f(current, &ctx))
}

/// Run one lifecycle call of a module inside its `module_call` span.
fn in_call_span<R>(kind: ModuleKind, phase: &'static str, call: impl FnOnce() -> R) -> R {
    let started = ModuleCallStarted {
        kind: kind.as_str(),
        phase,
    };
    let span = started.span("module_call");
    let _guard = span.enter();
    started.log();
    call()
}

pub struct PipelineEngine {
    registry: ModuleRegistry,
    options: EngineOptions,
    state: RunState,
    summary: RunSummary,
    started: Option<Instant>,
    run_span: Span,
}

impl Default for PipelineEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineEngine {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            registry: ModuleRegistry::new(),
            options,
            state: RunState::Unconfigured,
            summary: RunSummary::default(),
            started: None,
            run_span: Span::none(),
        }
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn module_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// The execution order, once resolved.
    pub fn order(&self) -> Option<&[ModuleKind]> {
        self.registry.order()
    }

    /// Totals so far. Also available after a `FailFast` run ended in an error.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Register a module. Only allowed before the order is resolved.
    pub fn add_module(&mut self, module: Box<dyn Module>) -> Result<(), ExecutionError> {
        if self.state != RunState::Unconfigured {
            return Err(self.invalid("add a module"));
        }
        self.registry.register(module)?;
        Ok(())
    }

    /// Validate the dependency graph and fix the execution order.
    ///
    /// Idempotent once resolved. A configuration error moves the engine to
    /// `Failed`.
    pub fn resolve(&mut self) -> Result<(), ExecutionError> {
        match self.state {
            RunState::Unconfigured => {}
            RunState::Failed | RunState::Finalized => return Err(self.invalid("resolve")),
            _ => return Ok(()),
        }

        match self.registry.resolve() {
            Ok(_) => {
                self.state = RunState::Resolved;
                Ok(())
            }
            Err(errors) => {
                self.state = RunState::Failed;
                Err(ExecutionError::Configuration(errors))
            }
        }
    }

    /// Initialize every module in execution order, resolving first if needed.
    pub fn initialize(&mut self) -> Result<(), ExecutionError> {
        if self.state == RunState::Unconfigured {
            self.resolve()?;
        }
        if self.state != RunState::Resolved {
            return Err(self.invalid("initialize"));
        }

        let starting = RunInitializing {
            module_count: self.registry.len(),
            failure_strategy: self.options.failure_strategy.as_str(),
            finalize_order: self.options.finalize_order.as_str(),
        };
        self.run_span = starting.span("pipeline_run");
        let run_span = self.run_span.clone();
        let _run = run_span.enter();
        starting.log();
        self.started = Some(Instant::now());

        for index in 0..self.registry.len() {
            let outcome = with_slot(self.registry.slots_mut(), index, |slot, ctx| {
                let result =
                    in_call_span(slot.kind(), "initialize", || slot.module_mut().initialize(ctx));
                slot.set_state(if result.is_ok() {
                    LifecycleState::Initialized
                } else {
                    LifecycleState::Failed
                });
                (slot.kind(), result)
            });
            let Some((kind, result)) = outcome else {
                continue;
            };

            match result {
                Ok(()) => ModuleInitialized {
                    kind: kind.as_str(),
                }
                .log(),
                Err(error) => {
                    ModuleInitializeFailed {
                        kind: kind.as_str(),
                        error: &error,
                    }
                    .log();

                    let finalize_errors = self.finalize_through(index + 1);
                    self.summary.finalize_errors.extend(finalize_errors);
                    self.state = RunState::Failed;

                    let err = ExecutionError::InitializationFailed {
                        module: kind,
                        source: error,
                    };
                    RunInitializationFailed {
                        module: kind.as_str(),
                        initialized: index,
                        error: &err,
                    }
                    .log();
                    return Err(err);
                }
            }
        }

        self.state = RunState::Initialized;
        Ok(())
    }

    /// Hand one event to every module in execution order.
    ///
    /// Under `FailFast` a fatal module failure finalizes the run and is
    /// returned as `ExecutionError::FatalModuleFailure`; under
    /// `ContinueOnError` it only shows up in the returned report.
    pub fn process(&mut self, event: &mut EventRecord) -> Result<EventReport, ExecutionError> {
        match self.state {
            RunState::Initialized | RunState::Running => {}
            _ => return Err(self.invalid("process an event")),
        }
        self.state = RunState::Running;

        let run_span = self.run_span.clone();
        let _run = run_span.enter();
        let started = EventStarted {
            run_id: event.run_id,
            event_id: event.event_id,
            channels: event.channels.len(),
        };
        let event_span = started.span("pipeline_process");
        let _event = event_span.enter();
        started.log();

        let module_count = self.registry.len();
        let mut report = EventReport::new(event.event_id);
        let mut fatal: Option<(ModuleKind, ModuleError)> = None;

        for index in 0..module_count {
            let outcome = with_slot(self.registry.slots_mut(), index, |slot, ctx| {
                let kind = slot.kind();
                (kind, in_call_span(kind, "process", || slot.module_mut().process(event, ctx)))
            });
            let Some((kind, result)) = outcome else {
                continue;
            };
            report.modules_run += 1;

            let Err(error) = result else {
                continue;
            };
            ModuleProcessFailed {
                kind: kind.as_str(),
                event_id: report.event_id,
                error: &error,
            }
            .log();
            *self.summary.failures_per_module.entry(kind).or_insert(0) += 1;

            let is_fatal = error.is_fatal();
            if is_fatal {
                fatal = Some((kind, error.clone()));
            }
            report.failures.push(ModuleFailure {
                module: kind,
                error,
            });

            if is_fatal {
                report.abandoned_at = Some(kind);
                EventAbandoned {
                    event_id: report.event_id,
                    module: kind.as_str(),
                    skipped_modules: module_count - index - 1,
                    failure_strategy: self.options.failure_strategy.as_str(),
                }
                .log();
                break;
            }
        }

        let Some((module, source)) = fatal else {
            self.summary.events_processed += 1;
            EventProcessed {
                event_id: report.event_id,
                recoverable_failures: report.recoverable_failures(),
            }
            .log();
            return Ok(report);
        };

        self.summary.events_abandoned += 1;
        match self.options.failure_strategy {
            FailureStrategy::ContinueOnError => Ok(report),
            FailureStrategy::FailFast => {
                self.finalize()?;
                Err(ExecutionError::FatalModuleFailure {
                    module,
                    event_id: report.event_id,
                    source,
                })
            }
        }
    }

    /// Finalize every initialized module in the configured order.
    pub fn finalize(&mut self) -> Result<RunSummary, ExecutionError> {
        if self.state.is_terminal() {
            return Err(self.invalid("finalize"));
        }
        let run_span = self.run_span.clone();
        let _run = run_span.enter();

        let finalize_errors = self.finalize_through(self.registry.len());
        self.summary.finalize_errors.extend(finalize_errors);
        self.state = RunState::Finalized;

        RunFinalized {
            events_processed: self.summary.events_processed,
            events_abandoned: self.summary.events_abandoned,
            module_failures: self.summary.total_failures(),
            finalize_errors: self.summary.finalize_errors.len(),
            duration: self.started.map(|s| s.elapsed()).unwrap_or_default(),
        }
        .log();

        Ok(self.summary.clone())
    }

    /// Initialize, drain `source`, finalize.
    ///
    /// An event the source cannot deliver is logged and skipped.
    pub fn run<S: EventSource + ?Sized>(&mut self, source: &mut S) -> Result<RunSummary, ExecutionError> {
        self.initialize()?;

        while source.has_more() {
            match source.next_event() {
                Ok(raw) => {
                    let mut record = EventRecord::new(raw);
                    self.process(&mut record)?;
                }
                Err(SourceError::Exhausted) => break,
                Err(e) => {
                    SourceEventSkipped { error: &e }.log();
                    self.summary.source_errors += 1;
                }
            }
        }

        self.finalize()
    }

    pub fn get_module<T: ModuleType>(&self) -> Option<&T> {
        self.registry.get::<T>()
    }

    pub fn get_module_mut<T: ModuleType>(&mut self) -> Option<&mut T> {
        self.registry.get_mut::<T>()
    }

    /// Finalize the slots in `0..end` that were initialized, or that failed
    /// to initialize, honouring `FinalizeOrder`.
    fn finalize_through(&mut self, end: usize) -> Vec<ModuleFailure> {
        let indices: Vec<usize> = match self.options.finalize_order {
            FinalizeOrder::Forward => (0..end).collect(),
            FinalizeOrder::Reverse => (0..end).rev().collect(),
        };

        let mut errors = Vec::new();
        for index in indices {
            let outcome = with_slot(self.registry.slots_mut(), index, |slot, ctx| {
                match slot.state() {
                    LifecycleState::Initialized | LifecycleState::Failed => {}
                    LifecycleState::Registered | LifecycleState::Finalized => return None,
                }
                let result =
                    in_call_span(slot.kind(), "finalize", || slot.module_mut().finalize(ctx));
                if slot.state() == LifecycleState::Initialized {
                    slot.set_state(LifecycleState::Finalized);
                }
                Some((slot.kind(), result))
            })
            .flatten();

            match outcome {
                Some((kind, Ok(()))) => ModuleFinalized {
                    kind: kind.as_str(),
                }
                .log(),
                Some((kind, Err(error))) => {
                    ModuleFinalizeFailed {
                        kind: kind.as_str(),
                        error: &error,
                    }
                    .log();
                    errors.push(ModuleFailure {
                        module: kind,
                        error,
                    });
                }
                None => {}
            }
        }
        errors
    }

    fn invalid(&self, operation: &'static str) -> ExecutionError {
        ExecutionError::InvalidTransition {
            state: self.state,
            operation,
        }
    }
}
