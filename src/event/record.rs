// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// One digitized channel as delivered by the event source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawChannel {
    pub channel_id: i32,
    /// Samples per microsecond; `None` leaves the converter default in place.
    #[serde(default)]
    pub sample_rate: Option<f64>,
    /// Index of the trigger sample; `None` leaves the converter default in place.
    #[serde(default)]
    pub trigger_index: Option<usize>,
    pub samples: Vec<f64>,
}

/// One event as delivered by the event source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawEvent {
    pub run_id: i64,
    pub event_id: u64,
    /// Unix seconds.
    #[serde(default)]
    pub timestamp: i64,
    pub channels: Vec<RawChannel>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Baseline {
    pub found_baseline: bool,
    pub mean: f64,
    pub variance: f64,
    pub search_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pulse {
    pub found_start: bool,
    pub start_index: usize,
    pub start_time: f64,
    pub found_end: bool,
    pub end_index: usize,
    pub end_time: f64,
    pub found_peak: bool,
    pub peak_index: usize,
    pub peak_time: f64,
    /// Positive for negative-going pulses.
    pub peak_amplitude: f64,
    pub integral: f64,
    /// Integral in units of single photoelectrons.
    pub npe: f64,
    /// Fraction of the integral within the prompt window around the peak.
    pub ratio1: f64,
    /// Fraction of the integral between start and the prompt window.
    pub ratio2: f64,
    pub is_clean: bool,
    pub is_s1: bool,
}

/// Per-channel working data, filled in stage by stage.
///
/// Downstream modules must check the `found_*` flags of the stage they
/// depend on before trusting the related fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelData {
    pub channel_id: i32,
    pub sample_rate: f64,
    pub trigger_index: usize,
    pub spe_mean: f64,
    pub raw: Vec<f64>,
    pub baseline: Baseline,
    pub subtracted: Vec<f64>,
    pub integral: Vec<f64>,
    pub pulses: Vec<Pulse>,
    /// Local minima found by the afterpulse search, kept apart from `pulses`.
    pub afterpulses: Vec<Pulse>,
    pub s1_full: f64,
    pub s2_full: f64,
}

impl ChannelData {
    /// Reserved id of the channel that sums all real channels.
    pub const CH_SUM: i32 = -2;

    pub fn new(channel_id: i32) -> Self {
        Self {
            channel_id,
            ..Default::default()
        }
    }

    pub fn nsamps(&self) -> usize {
        self.raw.len()
    }

    pub fn npulses(&self) -> usize {
        self.pulses.len()
    }

    /// Time in microseconds relative to the trigger.
    pub fn sample_to_time(&self, sample: usize) -> f64 {
        if self.sample_rate <= 0.0 {
            return 0.0;
        }
        (sample as f64 - self.trigger_index as f64) / self.sample_rate
    }

    pub fn has_subtracted_waveform(&self) -> bool {
        self.baseline.found_baseline && self.subtracted.len() == self.raw.len()
    }

    pub fn has_integral(&self) -> bool {
        !self.integral.is_empty() && self.integral.len() == self.subtracted.len()
    }
}

/// The mutable record handed through the module chain for one event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventRecord {
    pub run_id: i64,
    pub event_id: u64,
    pub timestamp: i64,
    pub raw: RawEvent,
    pub channels: Vec<ChannelData>,
    pub s1_full: f64,
    pub s2_full: f64,
    pub s1_valid: bool,
    pub s2_valid: bool,
    pub s1s2_valid: bool,
}

impl EventRecord {
    pub fn new(raw: RawEvent) -> Self {
        Self {
            run_id: raw.run_id,
            event_id: raw.event_id,
            timestamp: raw.timestamp,
            raw,
            ..Default::default()
        }
    }

    pub fn channel(&self, channel_id: i32) -> Option<&ChannelData> {
        self.channels.iter().find(|c| c.channel_id == channel_id)
    }

    pub fn channel_mut(&mut self, channel_id: i32) -> Option<&mut ChannelData> {
        self.channels.iter_mut().find(|c| c.channel_id == channel_id)
    }

    pub fn sum_channel(&self) -> Option<&ChannelData> {
        self.channel(ChannelData::CH_SUM)
    }
}
