// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;

use crate::config::Parameters;
use crate::errors::{ModuleError, ParameterError};
use crate::event::{Baseline, ChannelData, EventRecord};
use crate::modules::integrator::running_integral;
use crate::modules::BaselineFinder;
use crate::traits::{ChannelFilter, Module, ModuleContext, ModuleDescriptor, ModuleKind, ModuleType};

/// Builds the sum channel (`ChannelData::CH_SUM`) from every real channel
/// that has a baseline-subtracted waveform.
///
/// The sum channel carries its own integral, so it does not depend on where
/// `Integrator` sits in the execution order. When no channel contributes, the
/// sum channel is still added with `found_baseline = false`.
pub struct SumChannels {
    descriptor: ModuleDescriptor,
}

impl SumChannels {
    pub fn new() -> Self {
        Self {
            descriptor: ModuleDescriptor::new(Self::KIND, "Sum the baseline-subtracted channels")
                .depends_on(BaselineFinder::KIND),
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

    fn build(&self, channels: &[ChannelData]) -> ChannelData {
        let contributors: Vec<&ChannelData> = channels
            .iter()
            .filter(|ch| ch.channel_id != ChannelData::CH_SUM)
            .filter(|ch| self.descriptor.handles(ch.channel_id))
            .filter(|ch| ch.has_subtracted_waveform())
            .collect();

        let mut sum = ChannelData::new(ChannelData::CH_SUM);
        let Some(first) = contributors.first() else {
            return sum;
        };

        let nsamps = contributors.iter().map(|ch| ch.nsamps()).min().unwrap_or(0);
        sum.sample_rate = first.sample_rate;
        sum.trigger_index = first.trigger_index;
        // npe on the sum channel is already in photoelectrons per channel
        sum.spe_mean = 1.0;
        sum.subtracted = vec![0.0; nsamps];
        for ch in &contributors {
            let scale = if ch.spe_mean > 0.0 { ch.spe_mean } else { 1.0 };
            for (acc, s) in sum.subtracted.iter_mut().zip(&ch.subtracted) {
                *acc += s / scale;
            }
        }

        sum.raw = sum.subtracted.clone();
        sum.integral = running_integral(&sum.subtracted);
        sum.baseline = Baseline {
            found_baseline: true,
            mean: 0.0,
            variance: 0.0,
            search_samples: 0,
        };
        sum
    }
}

impl Default for SumChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleType for SumChannels {
    const KIND: ModuleKind = ModuleKind::new("SumChannels");
}

impl Module for SumChannels {
    fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn process(&mut self, event: &mut EventRecord, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        let sum = self.build(&event.channels);
        event.channels.retain(|ch| ch.channel_id != ChannelData::CH_SUM);
        event.channels.push(sum);
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

    fn channel(id: i32, subtracted: Vec<f64>, found: bool) -> ChannelData {
        let mut ch = ChannelData::new(id);
        ch.raw = vec![0.0; subtracted.len()];
        ch.subtracted = if found { subtracted } else { Vec::new() };
        ch.baseline.found_baseline = found;
        ch.spe_mean = 1.0;
        ch.sample_rate = 250.0;
        ch
    }

    #[test]
    fn test_sum_table_driven() {
        struct TestCase {
            name: &'static str,
            channels: Vec<ChannelData>,
            expected: Vec<f64>,
            expected_found: bool,
        }

        let test_cases = vec![
            TestCase {
                name: "two channels",
                channels: vec![
                    channel(0, vec![-1.0, -2.0, 0.0], true),
                    channel(1, vec![-1.0, 0.0, 1.0], true),
                ],
                expected: vec![-2.0, -2.0, 1.0],
                expected_found: true,
            },
            TestCase {
                name: "channel without baseline is left out",
                channels: vec![
                    channel(0, vec![-1.0, -2.0], true),
                    channel(1, vec![-5.0, -5.0], false),
                ],
                expected: vec![-1.0, -2.0],
                expected_found: true,
            },
            TestCase {
                name: "shortest waveform wins",
                channels: vec![
                    channel(0, vec![1.0, 1.0, 1.0], true),
                    channel(1, vec![1.0, 1.0], true),
                ],
                expected: vec![2.0, 2.0],
                expected_found: true,
            },
            TestCase {
                name: "nothing contributes",
                channels: vec![channel(0, vec![1.0], false)],
                expected: vec![],
                expected_found: false,
            },
        ];

        for tc in test_cases {
            let mut event = EventRecord::default();
            event.channels = tc.channels;
            SumChannels::new()
                .process(&mut event, &ModuleContext::empty())
                .unwrap();

            let sum = event.sum_channel().unwrap();
            assert_eq!(sum.subtracted, tc.expected, "Test case '{}'", tc.name);
            assert_eq!(sum.baseline.found_baseline, tc.expected_found, "Test case '{}'", tc.name);
            assert_eq!(sum.has_integral(), tc.expected_found, "Test case '{}'", tc.name);
        }
    }

    #[test]
    fn test_sum_channel_is_replaced_not_duplicated() {
        let mut event = EventRecord::default();
        event.channels = vec![channel(0, vec![1.0], true)];
        let mut module = SumChannels::new();
        module.process(&mut event, &ModuleContext::empty()).unwrap();
        module.process(&mut event, &ModuleContext::empty()).unwrap();

        let sums = event
            .channels
            .iter()
            .filter(|c| c.channel_id == ChannelData::CH_SUM)
            .count();
        assert_eq!(sums, 1);
    }
}
