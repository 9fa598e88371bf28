// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::errors::SourceError;
use crate::event::RawEvent;

/// Delivers raw events to the engine, one at a time.
pub trait EventSource {
    /// Whether another event (possibly malformed) is available.
    fn has_more(&mut self) -> bool;

    /// Pull the next event. A malformed event is an error for that event
    /// only; the source stays usable.
    fn next_event(&mut self) -> Result<RawEvent, SourceError>;
}

/// In-memory event source.
#[derive(Debug, Default)]
pub struct VecSource {
    events: VecDeque<RawEvent>,
}

impl VecSource {
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl EventSource for VecSource {
    fn has_more(&mut self) -> bool {
        !self.events.is_empty()
    }

    fn next_event(&mut self) -> Result<RawEvent, SourceError> {
        self.events.pop_front().ok_or(SourceError::Exhausted)
    }
}

/// Reads one JSON-encoded `RawEvent` per line. Blank lines are ignored.
pub struct JsonLinesSource<R: BufRead> {
    lines: Lines<R>,
    peeked: Option<(usize, std::io::Result<String>)>,
    line_no: usize,
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            peeked: None,
            line_no: 0,
        }
    }

    fn fill_peek(&mut self) {
        while self.peeked.is_none() {
            match self.lines.next() {
                Some(Ok(line)) => {
                    self.line_no += 1;
                    if !line.trim().is_empty() {
                        self.peeked = Some((self.line_no, Ok(line)));
                    }
                }
                Some(Err(e)) => {
                    self.line_no += 1;
                    self.peeked = Some((self.line_no, Err(e)));
                }
                None => return,
            }
        }
    }
}

impl<R: BufRead> EventSource for JsonLinesSource<R> {
    fn has_more(&mut self) -> bool {
        self.fill_peek();
        self.peeked.is_some()
    }

    fn next_event(&mut self) -> Result<RawEvent, SourceError> {
        self.fill_peek();
        let (line, content) = self.peeked.take().ok_or(SourceError::Exhausted)?;
        let content = content?;
        serde_json::from_str(&content).map_err(|source| SourceError::Malformed { line, source })
    }
}

/// Restricts another source to the events at positions `min..max`.
///
/// Positions count every event the inner source delivers, malformed ones
/// included, starting at zero. A `max` of zero means no upper bound.
pub struct EventWindow<S> {
    inner: S,
    min: u64,
    max: u64,
    position: u64,
}

impl<S: EventSource> EventWindow<S> {
    pub fn new(inner: S, min: u64, max: u64) -> Self {
        Self {
            inner,
            min,
            max,
            position: 0,
        }
    }

    /// Position of the next event to be delivered.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn skip_to_min(&mut self) {
        while self.position < self.min && self.inner.has_more() {
            let _ = self.inner.next_event();
            self.position += 1;
        }
    }
}

impl<S: EventSource> EventSource for EventWindow<S> {
    fn has_more(&mut self) -> bool {
        self.skip_to_min();
        if self.max > 0 && self.position >= self.max {
            return false;
        }
        self.inner.has_more()
    }

    fn next_event(&mut self) -> Result<RawEvent, SourceError> {
        if !self.has_more() {
            return Err(SourceError::Exhausted);
        }
        self.position += 1;
        self.inner.next_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_vec_source_drains_in_order() {
        let mut source = VecSource::new(vec![
            RawEvent {
                event_id: 1,
                ..Default::default()
            },
            RawEvent {
                event_id: 2,
                ..Default::default()
            },
        ]);

        assert!(source.has_more());
        assert_eq!(source.next_event().unwrap().event_id, 1);
        assert_eq!(source.next_event().unwrap().event_id, 2);
        assert!(!source.has_more());
        assert!(matches!(source.next_event(), Err(SourceError::Exhausted)));
    }

    #[test]
    fn test_json_lines_skips_blank_lines_and_reports_malformed() {
        let input = concat!(
            r#"{"run_id": 5, "event_id": 0, "channels": [{"channel_id": 0, "samples": [1.0, 2.0]}]}"#,
            "\n\n",
            "not json\n",
            r#"{"run_id": 5, "event_id": 2, "timestamp": 100, "channels": []}"#,
            "\n",
        );
        let mut source = JsonLinesSource::new(Cursor::new(input));

        let first = source.next_event().unwrap();
        assert_eq!(first.run_id, 5);
        assert_eq!(first.channels[0].samples, vec![1.0, 2.0]);

        assert!(source.has_more());
        match source.next_event() {
            Err(SourceError::Malformed { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected malformed line error, got {:?}", other),
        }

        let third = source.next_event().unwrap();
        assert_eq!(third.event_id, 2);
        assert_eq!(third.timestamp, 100);
        assert!(!source.has_more());
    }

    #[test]
    fn test_event_window_table_driven() {
        struct TestCase {
            name: &'static str,
            min: u64,
            max: u64,
            expected: Vec<u64>,
        }

        let test_cases = vec![
            TestCase {
                name: "whole source",
                min: 0,
                max: 0,
                expected: vec![0, 1, 2, 3, 4],
            },
            TestCase {
                name: "skip the first two",
                min: 2,
                max: 0,
                expected: vec![2, 3, 4],
            },
            TestCase {
                name: "stop before position three",
                min: 0,
                max: 3,
                expected: vec![0, 1, 2],
            },
            TestCase {
                name: "window in the middle",
                min: 1,
                max: 3,
                expected: vec![1, 2],
            },
            TestCase {
                name: "min past the end",
                min: 9,
                max: 0,
                expected: vec![],
            },
        ];

        for tc in test_cases {
            let events = (0..5)
                .map(|event_id| RawEvent {
                    event_id,
                    ..Default::default()
                })
                .collect();
            let mut window = EventWindow::new(VecSource::new(events), tc.min, tc.max);

            let mut seen = Vec::new();
            while window.has_more() {
                seen.push(window.next_event().unwrap().event_id);
            }
            assert_eq!(seen, tc.expected, "Test case '{}'", tc.name);
            assert!(matches!(window.next_event(), Err(SourceError::Exhausted)));
        }
    }
}
