// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bundled per-event analysis modules.
//!
//! | kind             | depends on                              |
//! |------------------|-----------------------------------------|
//! | `ConvertData`    |                                         |
//! | `BaselineFinder` | `ConvertData`                           |
//! | `SumChannels`    | `BaselineFinder`                        |
//! | `Integrator`     | `BaselineFinder`                        |
//! | `PulseFinder`    | `BaselineFinder`, `Integrator`          |
//! | `APFinder`       | `ConvertData`, `BaselineFinder`         |
//! | `S1S2Evaluation` | `PulseFinder`, `SumChannels`, `Integrator` |
//! | `AsciiWriter`    | `PulseFinder`                           |
//! | `RunInfoWriter`  | `ConvertData`                           |
//!
//! Every module reads its options from `Parameters` when it is built, honours
//! `skip_channels`, and leaves a channel alone when the upstream stage it
//! needs did not succeed on it.

pub mod ap_finder;
pub mod ascii_writer;
pub mod baseline_finder;
pub mod convert_data;
pub mod factory;
pub mod integrator;
pub mod pulse_finder;
pub mod runinfo_writer;
pub mod s1s2_evaluation;
pub mod sum_channels;
#[cfg(test)]
pub(crate) mod testing;

pub use ap_finder::APFinder;
pub use ascii_writer::AsciiWriter;
pub use baseline_finder::BaselineFinder;
pub use convert_data::ConvertData;
pub use factory::ModuleFactory;
pub use integrator::Integrator;
pub use pulse_finder::PulseFinder;
pub use runinfo_writer::RunInfoWriter;
pub use s1s2_evaluation::S1S2Evaluation;
pub use sum_channels::SumChannels;
