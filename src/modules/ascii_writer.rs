// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::config::Parameters;
use crate::errors::{ModuleError, ParameterError};
use crate::event::EventRecord;
use crate::modules::PulseFinder;
use crate::observability::messages::module::OutputFileClosed;
use crate::observability::messages::StructuredLog;
use crate::traits::{ChannelFilter, Module, ModuleContext, ModuleDescriptor, ModuleKind, ModuleType};

pub const DEFAULT_ASCII_FILENAME: &str = "pulses.txt";

const HEADER: &str =
    "run\tevent\tchannel\tpulse\tstart_time\tpeak_time\tend_time\tpeak_amplitude\tintegral\tnpe\tis_s1";

/// Writes one tab-separated line per pulse to a text file.
///
/// The file is created in `initialize` and flushed in `finalize`.
pub struct AsciiWriter {
    descriptor: ModuleDescriptor,
    filename: String,
    writer: Option<BufWriter<File>>,
    lines_written: u64,
}

impl AsciiWriter {
    pub fn new() -> Self {
        Self {
            descriptor: ModuleDescriptor::new(Self::KIND, "Write pulse info to a text file")
                .depends_on(PulseFinder::KIND),
            filename: DEFAULT_ASCII_FILENAME.to_string(),
            writer: None,
            lines_written: 0,
        }
    }

    pub fn from_parameters(params: &Parameters) -> Result<Self, ParameterError> {
        let mut module = Self::new();
        module.filename = params.get_or("filename", DEFAULT_ASCII_FILENAME.to_string())?;
        if module.filename.trim().is_empty() {
            return Err(ParameterError {
                owner: params.owner().to_string(),
                name: "filename".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        module.descriptor = module
            .descriptor
            .with_skip_channels(ChannelFilter::from_parameters(params)?);
        Ok(module)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Pulse lines written so far, excluding the header.
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }
}

impl Default for AsciiWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleType for AsciiWriter {
    const KIND: ModuleKind = ModuleKind::new("AsciiWriter");
}

impl Module for AsciiWriter {
    fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn initialize(&mut self, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        let file = File::create(&self.filename).map_err(|e| {
            ModuleError::fatal(format!("unable to open output file {}: {}", self.filename, e))
        })?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", HEADER)?;
        self.writer = Some(writer);
        self.lines_written = 0;
        Ok(())
    }

    fn process(&mut self, event: &mut EventRecord, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ModuleError::fatal(format!("output file {} is not open", self.filename)))?;

        for channel in &event.channels {
            if !self.descriptor.handles(channel.channel_id) {
                continue;
            }
            for (index, pulse) in channel.pulses.iter().enumerate() {
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{}",
                    event.run_id,
                    event.event_id,
                    channel.channel_id,
                    index,
                    pulse.start_time,
                    pulse.peak_time,
                    pulse.end_time,
                    pulse.peak_amplitude,
                    pulse.integral,
                    pulse.npe,
                    u8::from(pulse.is_s1),
                )?;
                self.lines_written += 1;
            }
        }
        Ok(())
    }

    fn finalize(&mut self, _ctx: &ModuleContext<'_>) -> Result<(), ModuleError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            OutputFileClosed {
                kind: Self::KIND.as_str(),
                path: &self.filename,
                lines: self.lines_written,
            }
            .log();
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
