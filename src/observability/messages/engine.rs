// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the pipeline engine.
//!
//! This module contains message types for logging events related to:
//! * Run setup and teardown
//! * Events that completed or were abandoned
//! * Event source problems

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Run setup is starting.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use daqchain::observability::messages::engine::RunInitializing;
///
/// let msg = RunInitializing {
///     module_count: 5,
///     failure_strategy: "fail_fast",
///     finalize_order: "forward",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct RunInitializing<'a> {
    pub module_count: usize,
    pub failure_strategy: &'a str,
    pub finalize_order: &'a str,
}

impl Display for RunInitializing<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Initializing {} modules (failure_strategy={}, finalize_order={})",
            self.module_count, self.failure_strategy, self.finalize_order
        )
    }
}

impl StructuredLog for RunInitializing<'_> {
    fn log(&self) {
        tracing::info!(
            module_count = self.module_count,
            failure_strategy = self.failure_strategy,
            finalize_order = self.finalize_order,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run",
            span_name = name,
            failure_strategy = self.failure_strategy,
            finalize_order = self.finalize_order,
        )
    }
}

/// An event is about to go through the module chain.
///
/// # Log Level
/// `trace!` - Per-event detail
pub struct EventStarted {
    pub run_id: i64,
    pub event_id: u64,
    pub channels: usize,
}

impl Display for EventStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processing event {} of run {} ({} channels)",
            self.event_id, self.run_id, self.channels
        )
    }
}

impl StructuredLog for EventStarted {
    fn log(&self) {
        tracing::trace!(
            run_id = self.run_id,
            event_id = self.event_id,
            channels = self.channels,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("event", span_name = name, run_id = self.run_id, event_id = self.event_id)
    }
}

/// Setup failed; the run will not process any event.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct RunInitializationFailed<'a> {
    pub module: &'a str,
    pub initialized: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for RunInitializationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Run setup aborted at module '{}' after {} modules initialized: {}",
            self.module, self.initialized, self.error
        )
    }
}

impl StructuredLog for RunInitializationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            module = self.module,
            initialized = self.initialized,
            error = %self.error,
            "{}", self
        );
    }
}

/// One event went through the whole chain.
///
/// # Log Level
/// `debug!` - Per-event detail
pub struct EventProcessed {
    pub event_id: u64,
    pub recoverable_failures: usize,
}

impl Display for EventProcessed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processed event {} ({} recoverable failures)",
            self.event_id, self.recoverable_failures
        )
    }
}

impl StructuredLog for EventProcessed {
    fn log(&self) {
        tracing::debug!(
            event_id = self.event_id,
            recoverable_failures = self.recoverable_failures,
            "{}", self
        );
    }
}

/// A fatal module failure abandoned the rest of an event.
///
/// # Log Level
/// `warn!` - The run may continue, depending on the failure strategy
pub struct EventAbandoned<'a> {
    pub event_id: u64,
    pub module: &'a str,
    pub skipped_modules: usize,
    pub failure_strategy: &'a str,
}

impl Display for EventAbandoned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Event {} abandoned at module '{}', {} modules skipped (failure_strategy={})",
            self.event_id, self.module, self.skipped_modules, self.failure_strategy
        )
    }
}

impl StructuredLog for EventAbandoned<'_> {
    fn log(&self) {
        tracing::warn!(
            event_id = self.event_id,
            module = self.module,
            skipped_modules = self.skipped_modules,
            failure_strategy = self.failure_strategy,
            "{}", self
        );
    }
}

/// The event source could not deliver one event; it is skipped.
///
/// # Log Level
/// `warn!` - Data problem, run continues
pub struct SourceEventSkipped<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for SourceEventSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping unreadable event: {}", self.error)
    }
}

impl StructuredLog for SourceEventSkipped<'_> {
    fn log(&self) {
        tracing::warn!(error = %self.error, "{}", self);
    }
}

/// Teardown completed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunFinalized {
    pub events_processed: u64,
    pub events_abandoned: u64,
    pub module_failures: usize,
    pub finalize_errors: usize,
    pub duration: std::time::Duration,
}

impl Display for RunFinalized {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Run finalized: {} events processed, {} abandoned, {} module failures, {} finalize errors in {:?}",
            self.events_processed,
            self.events_abandoned,
            self.module_failures,
            self.finalize_errors,
            self.duration
        )
    }
}

impl StructuredLog for RunFinalized {
    fn log(&self) {
        tracing::info!(
            events_processed = self.events_processed,
            events_abandoned = self.events_abandoned,
            module_failures = self.module_failures,
            finalize_errors = self.finalize_errors,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}
