// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;

use crate::config::consts::DEFAULT_AP_AMP_THRESHOLD;
use crate::config::Parameters;
use crate::errors::{ModuleError, ParameterError};
use crate::event::{ChannelData, EventRecord, Pulse};
use crate::modules::{BaselineFinder, ConvertData};
use crate::traits::{ChannelFilter, Module, ModuleContext, ModuleDescriptor, ModuleKind, ModuleType};

/// Half-width, in samples, of the window recorded around each afterpulse peak.
const AP_HALF_WINDOW: usize = 3;

/// Searches for afterpulses: strict local minima below `amp_threshold`.
///
/// Results go to `ChannelData::afterpulses` so they never mix with the
/// threshold pulses found by `PulseFinder`.
pub struct APFinder {
    descriptor: ModuleDescriptor,
    amp_threshold: f64,
}

impl APFinder {
    pub fn new() -> Self {
        Self {
            descriptor: ModuleDescriptor::new(Self::KIND, "Search for afterpulses in waveforms")
                .depends_on(ConvertData::KIND)
                .depends_on(BaselineFinder::KIND),
            amp_threshold: DEFAULT_AP_AMP_THRESHOLD,
        }
    }

    pub fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        let mut module = Self::new();
        module.amp_threshold = params.get_or("amp_threshold", DEFAULT_AP_AMP_THRESHOLD)?;
        module.descriptor = module
            .descriptor
            .with_skip_channels(ChannelFilter::from_parameters(params)?);
        Ok(module)
    }

    pub fn amp_threshold(&self) -> f64 {
        self.amp_threshold
    }

    /// Afterpulse candidates of one channel: samples below `amp_threshold`
    /// that are lower than both immediate neighbours. First and last samples
    /// are never candidates since they lack a neighbour on one side. The
    /// reported window only bounds the candidate; overlapping windows are fine.
    pub fn find_afterpulses(&self, channel: &ChannelData) -> Vec<Pulse> {
        if !channel.has_subtracted_waveform() {
            return Vec::new();
        }
        let wav = &channel.subtracted;
        let n = wav.len();
        if n < 3 {
            return Vec::new();
        }

        (1..n - 1)
            .filter(|&i| wav[i] < self.amp_threshold && wav[i] < wav[i - 1] && wav[i] < wav[i + 1])
            .map(|i| {
                let start = i.saturating_sub(AP_HALF_WINDOW);
                let end = (i + AP_HALF_WINDOW).min(n - 1);
                Pulse {
                    found_start: true,
                    start_index: start,
                    start_time: channel.sample_to_time(start),
                    found_end: true,
                    end_index: end,
                    end_time: channel.sample_to_time(end),
                    found_peak: true,
                    peak_index: i,
                    peak_time: channel.sample_to_time(i),
                    peak_amplitude: -wav[i],
                    is_clean: true,
                    ..Default::default()
                }
            })
            .collect()
    }
}

impl Default for APFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleType for APFinder {
    const KIND: ModuleKind = ModuleKind::new("APFinder");
}

impl Module for APFinder {
    fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn process(&mut self, event: &mut EventRecord, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        for channel in event.channels.iter_mut() {
            if !self.descriptor.handles(channel.channel_id) || !channel.baseline.found_baseline {
                continue;
            }
            channel.afterpulses = self.find_afterpulses(channel);
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
