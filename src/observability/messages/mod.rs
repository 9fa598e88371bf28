// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! `StructuredLog` to emit it at its own level with its fields attached.
//!
//! # Organization
//!
//! * `engine` - run lifecycle and per-event outcomes
//! * `registry` - module registration and dependency resolution
//! * `module` - individual module lifecycle calls
//! * `backend` - storage backend selection and operations

use tracing::Span;

pub mod backend;
pub mod engine;
pub mod module;
pub mod registry;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: std::fmt::Display {
    /// Emit the message as a tracing event.
    fn log(&self);

    /// Span for the work this message announces. Only messages that start a
    /// unit of work (a run, an event, a module call) open a real one.
    fn span(&self, _name: &str) -> Span {
        Span::none()
    }
}
