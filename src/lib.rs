// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // run-info storage backends
pub mod config;     // config + registry
pub mod engine;     // pipeline engine
pub mod errors;     // error handling
pub mod event;      // event records and sources
pub mod modules;    // bundled analysis modules
pub mod observability;
pub mod traits;     // module and storage abstractions
