// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for backend selection and storage operations.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A constructor was added to a backend factory.
///
/// # Log Level
/// `debug!` - Bootstrap detail
pub struct BackendRegistered<'a> {
    pub name: &'a str,
}

impl Display for BackendRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Registered backend '{}'", self.name)
    }
}

impl StructuredLog for BackendRegistered<'_> {
    fn log(&self) {
        tracing::debug!(backend = self.name, "{}", self);
    }
}

/// A backend name was looked up but nothing is registered under it.
///
/// # Log Level
/// `error!` - Configuration problem
pub struct BackendNotFound<'a> {
    pub name: &'a str,
    pub available: &'a [String],
}

impl Display for BackendNotFound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No backend registered as '{}' (available: {})",
            self.name,
            self.available.join(", ")
        )
    }
}

impl StructuredLog for BackendNotFound<'_> {
    fn log(&self) {
        tracing::error!(
            backend = self.name,
            available = %self.available.join(", "),
            "{}", self
        );
    }
}

/// A storage backend opened its connection.
///
/// # Log Level
/// `debug!` - Connections are lazy and may open often
pub struct BackendConnected<'a> {
    pub backend: &'a str,
    pub location: &'a str,
}

impl Display for BackendConnected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Backend '{}' connected to {}", self.backend, self.location)
    }
}

impl StructuredLog for BackendConnected<'_> {
    fn log(&self) {
        tracing::debug!(backend = self.backend, location = self.location, "{}", self);
    }
}

/// A run record was written.
///
/// # Log Level
/// `info!` - Persistent side effect of a run
pub struct RunInfoStored<'a> {
    pub backend: &'a str,
    pub runid: i64,
    pub mode: &'a str,
}

impl Display for RunInfoStored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stored run {} in backend '{}' ({})",
            self.runid, self.backend, self.mode
        )
    }
}

impl StructuredLog for RunInfoStored<'_> {
    fn log(&self) {
        tracing::info!(
            backend = self.backend,
            runid = self.runid,
            mode = self.mode,
            "{}", self
        );
    }
}

/// A run record query returned.
///
/// # Log Level
/// `debug!` - Read-only detail
pub struct RunInfoLoaded<'a> {
    pub backend: &'a str,
    pub query: &'a str,
    pub found: usize,
}

impl Display for RunInfoLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Backend '{}' returned {} records for {}",
            self.backend, self.found, self.query
        )
    }
}

impl StructuredLog for RunInfoLoaded<'_> {
    fn log(&self) {
        tracing::debug!(
            backend = self.backend,
            query = self.query,
            found = self.found,
            "{}", self
        );
    }
}
