// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;

use crate::config::Parameters;
use crate::errors::{ModuleError, ParameterError};
use crate::event::EventRecord;
use crate::modules::BaselineFinder;
use crate::traits::{ChannelFilter, Module, ModuleContext, ModuleDescriptor, ModuleKind, ModuleType};

/// Running integral of the baseline-subtracted waveform.
pub struct Integrator {
    descriptor: ModuleDescriptor,
}

impl Integrator {
    pub fn new() -> Self {
        Self {
            descriptor: ModuleDescriptor::new(Self::KIND, "Integrate the baseline-subtracted waveform")
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
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new()
    }
}

/// `out[i]` is the sum of `waveform[..=i]`.
pub fn running_integral(waveform: &[f64]) -> Vec<f64> {
    waveform
        .iter()
        .scan(0.0, |acc, s| {
            *acc += s;
            Some(*acc)
        })
        .collect()
}

impl ModuleType for Integrator {
    const KIND: ModuleKind = ModuleKind::new("Integrator");
}

impl Module for Integrator {
    fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn process(&mut self, event: &mut EventRecord, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        for channel in event.channels.iter_mut() {
            if !self.descriptor.handles(channel.channel_id) {
                continue;
            }
            channel.integral = if channel.has_subtracted_waveform() {
                running_integral(&channel.subtracted)
            } else {
                Vec::new()
            };
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChannelData;

    #[test]
    fn test_running_integral() {
        assert_eq!(running_integral(&[1.0, -2.0, 3.0]), vec![1.0, -1.0, 2.0]);
        assert!(running_integral(&[]).is_empty());
    }

    #[test]
    fn test_only_channels_with_baseline_are_integrated() {
        let mut good = ChannelData::new(0);
        good.raw = vec![0.0; 3];
        good.subtracted = vec![-1.0, -1.0, 0.5];
        good.baseline.found_baseline = true;

        let mut bad = ChannelData::new(1);
        bad.raw = vec![0.0; 3];
        bad.integral = vec![9.0];

        let mut event = EventRecord::default();
        event.channels = vec![good, bad];

        Integrator::new()
            .process(&mut event, &ModuleContext::empty())
            .unwrap();

        assert_eq!(event.channels[0].integral, vec![-1.0, -2.0, -1.5]);
        assert!(event.channels[0].has_integral());
        assert!(event.channels[1].integral.is_empty());
    }
}
