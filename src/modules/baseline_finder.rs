// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;

use crate::config::consts::{DEFAULT_MAX_BASELINE_SIGMA, DEFAULT_PRE_SAMPLES};
use crate::config::Parameters;
use crate::errors::{ModuleError, ParameterError};
use crate::event::{Baseline, ChannelData, EventRecord};
use crate::modules::ConvertData;
use crate::observability::messages::module::ChannelSkipped;
use crate::observability::messages::StructuredLog;
use crate::traits::{ChannelFilter, Module, ModuleContext, ModuleDescriptor, ModuleKind, ModuleType};

/// Estimates a flat baseline from the pre-trigger samples and subtracts it.
///
/// A channel whose pre-trigger noise exceeds `max_sigma` gets
/// `found_baseline = false` and no subtracted waveform; that is an ordinary
/// outcome, not an error.
pub struct BaselineFinder {
    descriptor: ModuleDescriptor,
    pre_samps: usize,
    max_sigma: f64,
}

impl BaselineFinder {
    pub fn new() -> Self {
        Self {
            descriptor: ModuleDescriptor::new(Self::KIND, "Find and subtract the channel baseline")
                .depends_on(ConvertData::KIND),
            pre_samps: DEFAULT_PRE_SAMPLES,
            max_sigma: DEFAULT_MAX_BASELINE_SIGMA,
        }
    }

    pub fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        let mut module = Self::new();
        module.pre_samps = params.get_or("pre_samps", DEFAULT_PRE_SAMPLES)?;
        module.max_sigma = params.get_or("max_sigma", DEFAULT_MAX_BASELINE_SIGMA)?;
        if module.max_sigma <= 0.0 {
            return Err(ParameterError {
                owner: params.owner().to_string(),
                name: "max_sigma".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        module.descriptor = module
            .descriptor
            .with_skip_channels(ChannelFilter::from_parameters(params)?);
        Ok(module)
    }

    pub fn pre_samps(&self) -> usize {
        self.pre_samps
    }

    /// Mean and population variance of the first `pre_samps` samples.
    pub fn estimate(&self, waveform: &[f64]) -> Baseline {
        let n = self.pre_samps.min(waveform.len());
        if n < 2 {
            return Baseline {
                search_samples: n,
                ..Default::default()
            };
        }

        let window = &waveform[..n];
        let mean = window.iter().sum::<f64>() / n as f64;
        let variance = window.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;

        Baseline {
            found_baseline: variance.sqrt() <= self.max_sigma,
            mean,
            variance,
            search_samples: n,
        }
    }

    fn apply(&self, channel: &mut ChannelData) {
        channel.baseline = self.estimate(&channel.raw);
        channel.subtracted = if channel.baseline.found_baseline {
            let mean = channel.baseline.mean;
            channel.raw.iter().map(|s| s - mean).collect()
        } else {
            Vec::new()
        };
    }
}

impl Default for BaselineFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleType for BaselineFinder {
    const KIND: ModuleKind = ModuleKind::new("BaselineFinder");
}

impl Module for BaselineFinder {
    fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn process(&mut self, event: &mut EventRecord, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        for channel in event.channels.iter_mut() {
            if !self.descriptor.handles(channel.channel_id) || channel.channel_id == ChannelData::CH_SUM {
                continue;
            }
            self.apply(channel);
            if !channel.baseline.found_baseline {
                ChannelSkipped {
                    kind: Self::KIND.as_str(),
                    event_id: event.event_id,
                    channel_id: channel.channel_id,
                    reason: "no baseline found",
                }
                .log();
            }
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
