// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;

use crate::config::{ModuleSlot, Parameters};
use crate::errors::{ModuleError, ParameterError};
use crate::event::EventRecord;

/// Stable identity of a module kind.
///
/// Dependencies and lookups are expressed in terms of this token, never in
/// terms of the human-readable module name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleKind(&'static str);

impl ModuleKind {
    pub const fn new(kind: &'static str) -> Self {
        Self(kind)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Channels a module deliberately leaves alone.
///
/// Read from the `skip_channels` option. Modules check it at the top of
/// their per-channel loop and never touch a skipped channel's data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelFilter {
    skipped: BTreeSet<i32>,
}

impl ChannelFilter {
    pub const OPTION: &'static str = "skip_channels";

    pub fn new(channels: impl IntoIterator<Item = i32>) -> Self {
        Self {
            skipped: channels.into_iter().collect(),
        }
    }

    pub fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        let channels: Vec<i32> = params.get_or(Self::OPTION, Vec::new())?;
        Ok(Self::new(channels))
    }

    pub fn skips(&self, channel_id: i32) -> bool {
        self.skipped.contains(&channel_id)
    }

    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Static description of a module: what it is and what has to run before it.
///
/// The registry copies `kind` and `dependencies` when the module is
/// registered, so the declared graph cannot drift during a run.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    kind: ModuleKind,
    name: String,
    description: String,
    dependencies: Vec<ModuleKind>,
    skip_channels: ChannelFilter,
}

impl ModuleDescriptor {
    pub fn new(kind: ModuleKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: kind.as_str().to_string(),
            description: description.into(),
            dependencies: Vec::new(),
            skip_channels: ChannelFilter::default(),
        }
    }

    pub fn with_skip_channels(mut self, skip_channels: ChannelFilter) -> Self {
        self.skip_channels = skip_channels;
        self
    }

    /// Override the display name (defaults to the kind).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declare a dependency on another module kind. Repeated declarations are ignored.
    pub fn depends_on(mut self, kind: ModuleKind) -> Self {
        if !self.dependencies.contains(&kind) {
            self.dependencies.push(kind);
        }
        self
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn dependencies(&self) -> &[ModuleKind] {
        &self.dependencies
    }

    pub fn skip_channels(&self) -> &ChannelFilter {
        &self.skip_channels
    }

    /// Whether this module should work on `channel_id`.
    pub fn handles(&self, channel_id: i32) -> bool {
        !self.skip_channels.skips(channel_id)
    }
}

/// One unit of per-event analysis work.
///
/// The engine calls `initialize` once before the first event, `process` once
/// per event in dependency order, and `finalize` once at the end of the run.
/// Ordinary data problems (a channel without a baseline, an event without
/// pulses) are not errors: a module skips the affected data and returns `Ok`.
pub trait Module {
    fn descriptor(&self) -> &ModuleDescriptor;

    fn initialize(&mut self, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        Ok(())
    }

    fn process(
        &mut self,
        event: &mut EventRecord,
        ctx: &ModuleContext<'_>,
    ) -> Result<(), ModuleError>;

    fn finalize(&mut self, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn kind(&self) -> ModuleKind {
        self.descriptor().kind()
    }

    fn name(&self) -> &str {
        self.descriptor().name()
    }
}

/// Binds a concrete module type to its kind so it can be looked up by type.
pub trait ModuleType: Module + Sized + 'static {
    const KIND: ModuleKind;
}

/// Read-only view of every other registered module, handed to each lifecycle call.
///
/// The module being called is not visible through its own context.
#[derive(Clone, Copy)]
pub struct ModuleContext<'a> {
    before: &'a [ModuleSlot],
    after: &'a [ModuleSlot],
}

impl<'a> ModuleContext<'a> {
    pub(crate) fn new(before: &'a [ModuleSlot], after: &'a [ModuleSlot]) -> Self {
        Self { before, after }
    }

    /// A context with no sibling modules, for driving a module on its own.
    pub fn empty() -> Self {
        Self {
            before: &[],
            after: &[],
        }
    }

    /// Look up a sibling module by kind.
    pub fn get_by_kind(&self, kind: ModuleKind) -> Option<&'a dyn Module> {
        self.before
            .iter()
            .chain(self.after.iter())
            .find(|slot| slot.kind() == kind)
            .map(|slot| slot.module())
    }

    /// Look up a sibling module by type.
    pub fn get<T: ModuleType>(&self) -> Option<&'a T> {
        self.get_by_kind(T::KIND)
            .and_then(|module| module.as_any().downcast_ref::<T>())
    }

    pub fn contains(&self, kind: ModuleKind) -> bool {
        self.get_by_kind(kind).is_some()
    }
}
