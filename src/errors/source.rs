// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Errors raised while pulling events from an event source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("event source I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed event on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("event source is exhausted")]
    Exhausted,
}
