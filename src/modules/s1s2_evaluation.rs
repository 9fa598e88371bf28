// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;

use crate::config::Parameters;
use crate::errors::{ModuleError, ParameterError};
use crate::event::{ChannelData, EventRecord};
use crate::modules::integrator::running_integral;
use crate::modules::{Integrator, PulseFinder, SumChannels};
use crate::traits::{ChannelFilter, Module, ModuleContext, ModuleDescriptor, ModuleKind, ModuleType};

/// Width of the prompt window on either side of a pulse peak, in microseconds.
const PROMPT_WINDOW_US: f64 = 0.02;
/// A pulse is S1 when more than this fraction of its integral is prompt...
const S1_MIN_PROMPT_RATIO: f64 = 0.05;
/// ...and less than this fraction arrives before the prompt window.
const S1_MAX_LEADING_RATIO: f64 = 0.02;

/// Classifies the pulses of the sum channel as S1 (prompt scintillation) or
/// S2 (delayed ionization signal) and fills the event-level results.
///
/// `s1_full` is the size of the first S1 pulse, `s2_full` the total size of
/// every S2 pulse, both in photoelectrons.
pub struct S1S2Evaluation {
    descriptor: ModuleDescriptor,
}

#[derive(Debug, Default, PartialEq)]
struct Classification {
    s1_full: Option<f64>,
    s2_full: Option<f64>,
}

impl S1S2Evaluation {
    pub fn new() -> Self {
        Self {
            descriptor: ModuleDescriptor::new(Self::KIND, "Evaluate S1/S2 on the sum channel")
                .depends_on(PulseFinder::KIND)
                .depends_on(SumChannels::KIND)
                .depends_on(Integrator::KIND),
        }
    }

    pub fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        let module = Self::new();
        Ok(Self {
            descriptor: module
                .descriptor
                .with_skip_channels(ChannelFilter::from_parameters(params)?),
        })
    }

    /// Prompt window half-width in samples for a channel.
    fn ratio_samples(channel: &ChannelData) -> usize {
        (PROMPT_WINDOW_US * channel.sample_rate).max(0.0) as usize
    }

    /// Compute prompt ratios, mark S1 pulses and return the channel totals.
    fn classify(channel: &mut ChannelData) -> Classification {
        if !channel.has_integral() {
            channel.integral = running_integral(&channel.subtracted);
        }

        let r = Self::ratio_samples(channel);
        let nsamps = channel.nsamps();
        let spe = if channel.spe_mean > 0.0 { channel.spe_mean } else { 1.0 };
        let mut result = Classification::default();

        for pulse in channel.pulses.iter_mut() {
            pulse.ratio1 = 0.0;
            pulse.ratio2 = 0.0;
            let peak = pulse.peak_index;
            if pulse.integral != 0.0 && peak >= r && peak + r < nsamps {
                let integral = &channel.integral;
                pulse.ratio1 = (integral[peak + r] - integral[peak - r]) / pulse.integral;
                pulse.ratio2 = (integral[peak - r] - integral[pulse.start_index]) / pulse.integral;
            }

            pulse.is_s1 = pulse.ratio1 > S1_MIN_PROMPT_RATIO && pulse.ratio2 < S1_MAX_LEADING_RATIO;
            let size = -pulse.integral / spe;
            if pulse.is_s1 {
                result.s1_full.get_or_insert(size);
            } else {
                *result.s2_full.get_or_insert(0.0) += size;
            }
        }

        channel.s1_full = result.s1_full.unwrap_or(0.0);
        channel.s2_full = result.s2_full.unwrap_or(0.0);
        result
    }
}

impl Default for S1S2Evaluation {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleType for S1S2Evaluation {
    const KIND: ModuleKind = ModuleKind::new("S1S2Evaluation");
}

impl Module for S1S2Evaluation {
    fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn initialize(&mut self, ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        if ctx.get::<PulseFinder>().is_none() {
            return Err(ModuleError::fatal("no PulseFinder module is registered"));
        }
        Ok(())
    }

    fn process(&mut self, event: &mut EventRecord, ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        event.s1_full = 0.0;
        event.s2_full = 0.0;
        event.s1_valid = false;
        event.s2_valid = false;
        event.s1s2_valid = false;

        if !self.descriptor.handles(ChannelData::CH_SUM) {
            return Ok(());
        }
        let Some(sumch) = event.channel_mut(ChannelData::CH_SUM) else {
            return Ok(());
        };
        if !sumch.baseline.found_baseline {
            return Ok(());
        }

        // PulseFinder and SumChannels are independent, so the sum channel may
        // have been built after the pulse search ran.
        if sumch.pulses.is_empty() {
            if let Some(finder) = ctx.get::<PulseFinder>() {
                let pulses = finder.find_pulses(sumch);
                sumch.pulses = pulses;
            }
        }
        if sumch.pulses.is_empty() {
            return Ok(());
        }

        let result = Self::classify(sumch);
        event.s1_valid = result.s1_full.is_some();
        event.s2_valid = result.s2_full.is_some();
        event.s1s2_valid = event.s1_valid && event.s2_valid;
        event.s1_full = result.s1_full.unwrap_or(0.0);
        event.s2_full = result.s2_full.unwrap_or(0.0);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Severity;

    const NSAMPS: usize = 60;

    /// Sharp pulse peaking at sample 20.
    fn prompt_pulse(wav: &mut [f64]) {
        wav[19] = -1.0;
        wav[20] = -50.0;
        wav[21] = -1.0;
    }

    /// Slow ramp from sample 30 peaking at sample 49.
    fn slow_pulse(wav: &mut [f64]) {
        for k in 0..20 {
            wav[30 + k] = -((k + 1) as f64);
        }
    }

    fn sum_event(wav: Vec<f64>, found_baseline: bool) -> EventRecord {
        let mut sum = ChannelData::new(ChannelData::CH_SUM);
        sum.sample_rate = 250.0;
        sum.spe_mean = 1.0;
        sum.raw = wav.clone();
        sum.integral = running_integral(&wav);
        sum.subtracted = wav;
        sum.baseline.found_baseline = found_baseline;
        if found_baseline {
            sum.pulses = PulseFinder::new().find_pulses(&sum);
        }

        let mut event = EventRecord::default();
        event.channels.push(sum);
        event
    }

    #[test]
    fn test_classification_table_driven() {
        struct TestCase {
            name: &'static str,
            shape: fn(&mut [f64]),
            expected_s1: Option<f64>,
            expected_s2: Option<f64>,
        }

        let test_cases = vec![
            TestCase {
                name: "prompt pulse is S1",
                shape: prompt_pulse,
                expected_s1: Some(52.0),
                expected_s2: None,
            },
            TestCase {
                name: "slow pulse is S2",
                shape: slow_pulse,
                expected_s1: None,
                expected_s2: Some(210.0),
            },
            TestCase {
                name: "S1 followed by S2",
                shape: |wav| {
                    prompt_pulse(wav);
                    slow_pulse(wav);
                },
                expected_s1: Some(52.0),
                expected_s2: Some(210.0),
            },
            TestCase {
                name: "peak too close to the start falls back to S2",
                shape: |wav| wav[2] = -40.0,
                expected_s1: None,
                expected_s2: Some(40.0),
            },
        ];

        for tc in test_cases {
            let mut wav = vec![0.0; NSAMPS];
            (tc.shape)(&mut wav);
            let mut event = sum_event(wav, true);

            S1S2Evaluation::new()
                .process(&mut event, &ModuleContext::empty())
                .unwrap();

            assert_eq!(event.s1_valid, tc.expected_s1.is_some(), "Test case '{}'", tc.name);
            assert_eq!(event.s2_valid, tc.expected_s2.is_some(), "Test case '{}'", tc.name);
            assert_eq!(
                event.s1s2_valid,
                tc.expected_s1.is_some() && tc.expected_s2.is_some(),
                "Test case '{}'",
                tc.name
            );
            assert!(
                (event.s1_full - tc.expected_s1.unwrap_or(0.0)).abs() < 1e-9,
                "Test case '{}': s1_full {}",
                tc.name,
                event.s1_full
            );
            assert!(
                (event.s2_full - tc.expected_s2.unwrap_or(0.0)).abs() < 1e-9,
                "Test case '{}': s2_full {}",
                tc.name,
                event.s2_full
            );
        }
    }

    #[test]
    fn test_prompt_ratio_is_written_back() {
        let mut wav = vec![0.0; NSAMPS];
        prompt_pulse(&mut wav);
        let mut event = sum_event(wav, true);

        S1S2Evaluation::new()
            .process(&mut event, &ModuleContext::empty())
            .unwrap();

        let pulse = &event.sum_channel().unwrap().pulses[0];
        assert!(pulse.is_s1);
        assert!((pulse.ratio1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sum_channel_without_baseline_clears_flags() {
        let mut event = sum_event(vec![0.0; NSAMPS], false);
        event.s1_valid = true;
        event.s1s2_valid = true;
        event.s1_full = 3.0;

        S1S2Evaluation::new()
            .process(&mut event, &ModuleContext::empty())
            .unwrap();

        assert!(!event.s1_valid);
        assert!(!event.s2_valid);
        assert!(!event.s1s2_valid);
        assert_eq!(event.s1_full, 0.0);
    }

    #[test]
    fn test_missing_sum_channel_is_not_an_error() {
        let mut event = EventRecord::default();
        assert!(S1S2Evaluation::new()
            .process(&mut event, &ModuleContext::empty())
            .is_ok());
        assert!(!event.s1s2_valid);
    }

    #[test]
    fn test_initialize_requires_pulse_finder() {
        let err = S1S2Evaluation::new()
            .initialize(&ModuleContext::empty())
            .unwrap_err();
        assert_eq!(err.severity, Severity::Fatal);
    }
}
