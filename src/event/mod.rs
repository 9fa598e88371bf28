// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-event data and the sources that deliver it.

mod record;
mod source;

pub use record::{Baseline, ChannelData, EventRecord, Pulse, RawChannel, RawEvent};
pub use source::{EventSource, EventWindow, JsonLinesSource, VecSource};
