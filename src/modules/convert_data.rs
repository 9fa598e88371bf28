// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::collections::HashSet;

use crate::config::consts::{DEFAULT_SAMPLE_RATE, DEFAULT_SPE_MEAN};
use crate::config::Parameters;
use crate::errors::{ModuleError, ParameterError};
use crate::event::{ChannelData, EventRecord};
use crate::observability::messages::module::ChannelSkipped;
use crate::observability::messages::StructuredLog;
use crate::traits::{ChannelFilter, Module, ModuleContext, ModuleDescriptor, ModuleKind, ModuleType};

/// Copies the raw waveforms of an event into per-channel working data.
///
/// Channels listed in `skip_channels` are not converted at all, so no later
/// module sees them.
pub struct ConvertData {
    descriptor: ModuleDescriptor,
    default_sample_rate: f64,
    default_trigger_index: usize,
    spe_mean: f64,
}

impl ConvertData {
    pub fn new() -> Self {
        Self {
            descriptor: ModuleDescriptor::new(Self::KIND, "Copy raw waveforms into channel data"),
            default_sample_rate: DEFAULT_SAMPLE_RATE,
            default_trigger_index: 0,
            spe_mean: DEFAULT_SPE_MEAN,
        }
    }

    pub fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        let mut module = Self::new();
        module.default_sample_rate = params.get_or("sample_rate", DEFAULT_SAMPLE_RATE)?;
        module.default_trigger_index = params.get_or("trigger_index", 0)?;
        module.spe_mean = params.get_or("spe_mean", DEFAULT_SPE_MEAN)?;
        module.descriptor = module
            .descriptor
            .with_skip_channels(ChannelFilter::from_parameters(params)?);
        Ok(module)
    }
}

impl Default for ConvertData {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleType for ConvertData {
    const KIND: ModuleKind = ModuleKind::new("ConvertData");
}

impl Module for ConvertData {
    fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn process(&mut self, event: &mut EventRecord, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        let mut seen = HashSet::new();
        let mut channels = Vec::with_capacity(event.raw.channels.len());

        for raw in &event.raw.channels {
            if !self.descriptor.handles(raw.channel_id) {
                continue;
            }
            if raw.channel_id == ChannelData::CH_SUM {
                ChannelSkipped {
                    kind: Self::KIND.as_str(),
                    event_id: event.event_id,
                    channel_id: raw.channel_id,
                    reason: "raw data uses the reserved sum channel id",
                }
                .log();
                continue;
            }
            if !seen.insert(raw.channel_id) {
                return Err(ModuleError::recoverable(format!(
                    "channel {} appears more than once in event {}",
                    raw.channel_id, event.event_id
                )));
            }

            let mut channel = ChannelData::new(raw.channel_id);
            channel.sample_rate = raw.sample_rate.unwrap_or(self.default_sample_rate);
            channel.trigger_index = raw.trigger_index.unwrap_or(self.default_trigger_index);
            channel.spe_mean = self.spe_mean;
            channel.raw = raw.samples.clone();
            channels.push(channel);
        }

        event.channels = channels;
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
    use crate::event::{RawChannel, RawEvent};
    use crate::modules::testing::raw_event;

    #[test]
    fn test_converts_with_defaults() {
        let mut raw = raw_event(1, vec![(0, vec![1.0, 2.0]), (1, vec![3.0])]);
        raw.channels[1].sample_rate = Some(100.0);
        raw.channels[1].trigger_index = Some(4);
        let mut event = EventRecord::new(raw);

        let mut module = ConvertData::new();
        module.process(&mut event, &ModuleContext::empty()).unwrap();

        assert_eq!(event.channels.len(), 2);
        assert_eq!(event.channels[0].raw, vec![1.0, 2.0]);
        assert_eq!(event.channels[0].sample_rate, DEFAULT_SAMPLE_RATE);
        assert_eq!(event.channels[1].sample_rate, 100.0);
        assert_eq!(event.channels[1].trigger_index, 4);
        assert_eq!(event.channels[1].spe_mean, DEFAULT_SPE_MEAN);
    }

    #[test]
    fn test_skip_channels_and_reserved_id() {
        let params = Parameters::empty("ConvertData")
            .with("skip_channels", serde_yaml::Value::Sequence(vec![1.into()]))
            .with("sample_rate", 500.0);
        let mut module = ConvertData::from_parameters(&params).unwrap();

        let mut event = EventRecord::new(raw_event(
            2,
            vec![(0, vec![0.0]), (1, vec![0.0]), (ChannelData::CH_SUM, vec![0.0])],
        ));
        module.process(&mut event, &ModuleContext::empty()).unwrap();

        let ids: Vec<i32> = event.channels.iter().map(|c| c.channel_id).collect();
        assert_eq!(ids, vec![0]);
        assert_eq!(event.channels[0].sample_rate, 500.0);
    }

    #[test]
    fn test_duplicate_channel_is_recoverable() {
        let raw = RawEvent {
            run_id: 1,
            event_id: 3,
            timestamp: 0,
            channels: vec![
                RawChannel {
                    channel_id: 0,
                    ..Default::default()
                },
                RawChannel {
                    channel_id: 0,
                    ..Default::default()
                },
            ],
        };
        let mut event = EventRecord::new(raw);

        let err = ConvertData::new()
            .process(&mut event, &ModuleContext::empty())
            .unwrap_err();
        assert!(!err.is_fatal());
    }
}
