// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for individual module lifecycle calls.
//!
//! This module contains message types for logging events related to:
//! * Module initialization and finalization
//! * Recoverable and fatal per-event failures
//! * Channels and events a module deliberately skipped

use crate::errors::ModuleError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// The engine is about to call one lifecycle operation of a module.
///
/// # Log Level
/// `trace!` - Call-level detail
pub struct ModuleCallStarted<'a> {
    pub kind: &'a str,
    /// `initialize`, `process` or `finalize`
    pub phase: &'a str,
}

impl Display for ModuleCallStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Calling {} on module '{}'", self.phase, self.kind)
    }
}

impl StructuredLog for ModuleCallStarted<'_> {
    fn log(&self) {
        tracing::trace!(kind = self.kind, phase = self.phase, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("module_call", span_name = name, kind = self.kind, phase = self.phase)
    }
}

/// A module's `initialize` call succeeded.
///
/// # Log Level
/// `debug!` - Lifecycle detail
pub struct ModuleInitialized<'a> {
    pub kind: &'a str,
}

impl Display for ModuleInitialized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Module '{}' initialized", self.kind)
    }
}

impl StructuredLog for ModuleInitialized<'_> {
    fn log(&self) {
        tracing::debug!(kind = self.kind, "{}", self);
    }
}

/// A module's `initialize` call failed.
///
/// # Log Level
/// `error!` - The run is aborted
pub struct ModuleInitializeFailed<'a> {
    pub kind: &'a str,
    pub error: &'a ModuleError,
}

impl Display for ModuleInitializeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Module '{}' failed to initialize: {}", self.kind, self.error)
    }
}

impl StructuredLog for ModuleInitializeFailed<'_> {
    fn log(&self) {
        tracing::error!(kind = self.kind, error = %self.error, "{}", self);
    }
}

/// A module's `process` call failed for one event.
///
/// # Log Level
/// `warn!` for recoverable failures, `error!` for fatal ones
pub struct ModuleProcessFailed<'a> {
    pub kind: &'a str,
    pub event_id: u64,
    pub error: &'a ModuleError,
}

impl Display for ModuleProcessFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' failed on event {}: {}",
            self.kind, self.event_id, self.error
        )
    }
}

impl StructuredLog for ModuleProcessFailed<'_> {
    fn log(&self) {
        if self.error.is_fatal() {
            tracing::error!(
                kind = self.kind,
                event_id = self.event_id,
                severity = %self.error.severity,
                "{}", self
            );
        } else {
            tracing::warn!(
                kind = self.kind,
                event_id = self.event_id,
                severity = %self.error.severity,
                "{}", self
            );
        }
    }
}

/// A module's `finalize` call succeeded.
///
/// # Log Level
/// `debug!` - Lifecycle detail
pub struct ModuleFinalized<'a> {
    pub kind: &'a str,
}

impl Display for ModuleFinalized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Module '{}' finalized", self.kind)
    }
}

impl StructuredLog for ModuleFinalized<'_> {
    fn log(&self) {
        tracing::debug!(kind = self.kind, "{}", self);
    }
}

/// A module's `finalize` call failed. Other modules still finalize.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ModuleFinalizeFailed<'a> {
    pub kind: &'a str,
    pub error: &'a ModuleError,
}

impl Display for ModuleFinalizeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Module '{}' failed to finalize: {}", self.kind, self.error)
    }
}

impl StructuredLog for ModuleFinalizeFailed<'_> {
    fn log(&self) {
        tracing::error!(kind = self.kind, error = %self.error, "{}", self);
    }
}

/// A module left part of an event alone because an upstream stage did not
/// produce what it needs.
///
/// # Log Level
/// `trace!` - Expected on ordinary data
pub struct ChannelSkipped<'a> {
    pub kind: &'a str,
    pub event_id: u64,
    pub channel_id: i32,
    pub reason: &'a str,
}

impl Display for ChannelSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' skipped channel {} of event {}: {}",
            self.kind, self.channel_id, self.event_id, self.reason
        )
    }
}

impl StructuredLog for ChannelSkipped<'_> {
    fn log(&self) {
        tracing::trace!(
            kind = self.kind,
            event_id = self.event_id,
            channel_id = self.channel_id,
            reason = self.reason,
            "{}", self
        );
    }
}

/// A module closed an output file it wrote during the run.
///
/// # Log Level
/// `info!` - Persistent side effect of a run
pub struct OutputFileClosed<'a> {
    pub kind: &'a str,
    pub path: &'a str,
    pub lines: u64,
}

impl Display for OutputFileClosed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' wrote {} lines to {}",
            self.kind, self.lines, self.path
        )
    }
}

impl StructuredLog for OutputFileClosed<'_> {
    fn log(&self) {
        tracing::info!(kind = self.kind, path = self.path, lines = self.lines, "{}", self);
    }
}
