// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fmt;

use crate::errors::FailureStrategy;

/// Run-level state of a `PipelineEngine`.
///
/// ```text
/// Unconfigured -> Resolved -> Initialized -> Running -> Finalized
///        \            \            \            \
///         +------------+------------+------------+--> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Unconfigured,
    Resolved,
    Initialized,
    Running,
    Finalized,
    Failed,
}

impl RunState {
    /// No further lifecycle calls are allowed from here.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Finalized | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Unconfigured => "unconfigured",
            RunState::Resolved => "resolved",
            RunState::Initialized => "initialized",
            RunState::Running => "running",
            RunState::Finalized => "finalized",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Order in which modules are finalized at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizeOrder {
    /// Same order as `initialize` and `process`.
    #[default]
    Forward,
    /// Dependents are finalized before the modules they depend on.
    Reverse,
}

impl FinalizeOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalizeOrder::Forward => "forward",
            FinalizeOrder::Reverse => "reverse",
        }
    }
}

/// Engine policies, read from the `engine` section of a run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct EngineOptions {
    #[serde(default)]
    pub failure_strategy: FailureStrategy,
    #[serde(default)]
    pub finalize_order: FinalizeOrder,
}
