// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod pipeline;
pub mod report;
pub mod state;

pub use pipeline::PipelineEngine;
pub use report::{EventReport, ModuleFailure, RunSummary};
pub use state::{EngineOptions, FinalizeOrder, RunState};
