//! Recording sink for testing: keeps every event in memory.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::metrics::ErrorSink;
use crate::types::ParsedEvent;

/// An [`ErrorSink`] that stores events instead of counting them.
pub struct RecordingSink {
    events: Mutex<Vec<ParsedEvent>>,
    parse_failures: AtomicU64,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            parse_failures: AtomicU64::new(0),
        }
    }

    /// All recorded events, in arrival order.
    pub fn events(&self) -> Vec<ParsedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_event(&self) -> Option<ParsedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn parse_failures(&self) -> u64 {
        self.parse_failures.load(Ordering::Relaxed)
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorSink for RecordingSink {
    fn record(&self, event: &ParsedEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }

    fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }
}
