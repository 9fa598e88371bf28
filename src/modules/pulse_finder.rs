// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;

use crate::config::consts::DEFAULT_PULSE_THRESHOLD;
use crate::config::Parameters;
use crate::errors::{ModuleError, ParameterError};
use crate::event::{ChannelData, EventRecord, Pulse};
use crate::modules::{BaselineFinder, Integrator};
use crate::traits::{ChannelFilter, Module, ModuleContext, ModuleDescriptor, ModuleKind, ModuleType};

/// Threshold-crossing pulse search on the baseline-subtracted waveform.
///
/// Pulses are negative-going. A pulse starts at the first sample below zero
/// of the excursion that crosses `threshold`, peaks at its minimum, and ends
/// at the first sample back at or above zero. A pulse still below zero at the
/// end of the waveform has `found_end = false`.
pub struct PulseFinder {
    descriptor: ModuleDescriptor,
    threshold: f64,
    pulses_found: u64,
}

impl PulseFinder {
    pub fn new() -> Self {
        Self {
            descriptor: ModuleDescriptor::new(Self::KIND, "Search for pulses above threshold")
                .depends_on(BaselineFinder::KIND)
                .depends_on(Integrator::KIND),
            threshold: DEFAULT_PULSE_THRESHOLD,
            pulses_found: 0,
        }
    }

    pub fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        let mut module = Self::new();
        module.threshold = params.get_or("threshold", DEFAULT_PULSE_THRESHOLD)?;
        if module.threshold >= 0.0 {
            return Err(ParameterError {
                owner: params.owner().to_string(),
                name: "threshold".to_string(),
                reason: "pulses are negative-going; threshold must be below zero".to_string(),
            });
        }
        module.descriptor = module
            .descriptor
            .with_skip_channels(ChannelFilter::from_parameters(params)?);
        Ok(module)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Total pulses found over the run so far.
    pub fn pulses_found(&self) -> u64 {
        self.pulses_found
    }

    /// Find the pulses of one channel without modifying it.
    ///
    /// Returns nothing for a channel without a baseline-subtracted waveform.
    pub fn find_pulses(&self, channel: &ChannelData) -> Vec<Pulse> {
        if !channel.has_subtracted_waveform() {
            return Vec::new();
        }

        let wav = &channel.subtracted;
        let n = wav.len();
        let mut pulses = Vec::new();
        let mut i = 0;

        while i < n {
            if wav[i] >= self.threshold {
                i += 1;
                continue;
            }

            let mut start = i;
            while start > 0 && wav[start - 1] < 0.0 {
                start -= 1;
            }

            let mut peak = i;
            let mut end = i;
            while end + 1 < n && wav[end + 1] < 0.0 {
                end += 1;
                if wav[end] < wav[peak] {
                    peak = end;
                }
            }
            let found_end = end + 1 < n;
            if found_end {
                end += 1;
            }

            let integral = self.integrate(channel, start, end);
            let spe = if channel.spe_mean > 0.0 { channel.spe_mean } else { 1.0 };
            pulses.push(Pulse {
                found_start: true,
                start_index: start,
                start_time: channel.sample_to_time(start),
                found_end,
                end_index: end,
                end_time: channel.sample_to_time(end),
                found_peak: true,
                peak_index: peak,
                peak_time: channel.sample_to_time(peak),
                peak_amplitude: -wav[peak],
                integral,
                npe: -integral / spe,
                is_clean: found_end && start > 0,
                ..Default::default()
            });

            i = end + 1;
        }

        pulses
    }

    /// Sum of the subtracted waveform over `start..=end`, from the integral
    /// waveform when there is one.
    fn integrate(&self, channel: &ChannelData, start: usize, end: usize) -> f64 {
        if channel.has_integral() {
            let before = if start == 0 { 0.0 } else { channel.integral[start - 1] };
            channel.integral[end] - before
        } else {
            channel.subtracted[start..=end].iter().sum()
        }
    }
}

impl Default for PulseFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleType for PulseFinder {
    const KIND: ModuleKind = ModuleKind::new("PulseFinder");
}

impl Module for PulseFinder {
    fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn initialize(&mut self, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        self.pulses_found = 0;
        Ok(())
    }

    fn process(&mut self, event: &mut EventRecord, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        for channel in event.channels.iter_mut() {
            if !self.descriptor.handles(channel.channel_id) {
                continue;
            }
            channel.pulses = self.find_pulses(channel);
            self.pulses_found += channel.pulses.len() as u64;
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
