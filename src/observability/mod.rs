// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! This module provides centralized message types for all diagnostic and
//! operational logging in daqchain. Message types follow a struct-based
//! pattern with a `Display` implementation so that:
//!
//! * log text is not scattered through the engine as string literals
//! * every message carries the same structured fields wherever it is logged
//! * the log level of an event is decided once, next to its wording
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - run lifecycle and per-event outcomes
//! * `messages::registry` - module registration and dependency resolution
//! * `messages::module` - individual module lifecycle calls
//! * `messages::backend` - storage backend selection and operations
//!
//! # Usage
//!
//! ```rust
//! use daqchain::observability::messages::module::ModuleProcessFailed;
//! use daqchain::observability::messages::StructuredLog;
//! use daqchain::errors::ModuleError;
//!
//! let error = ModuleError::recoverable("no baseline on channel 3");
//! ModuleProcessFailed {
//!     kind: "PulseFinder",
//!     event_id: 42,
//!     error: &error,
//! }
//! .log();
//! ```
//!
//! The subscriber is installed by the binary; the library only emits.

pub mod messages;
