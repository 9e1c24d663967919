//! Boundaries to the surrounding application
//!
//! The core never persists anything itself. A `SubmissionSink` receives
//! normalized records and delete requests; an `ErrorDisplay` receives
//! user-facing messages. Both calls are fire-and-forget.

use crate::normalize::NormalizedRecord;

/// Accepts finished records and confirmed deletions.
pub trait SubmissionSink {
    fn submit(&mut self, record: NormalizedRecord);

    fn destroy(&mut self, identity: &str);
}

/// Single-slot channel for user-facing error messages.
pub trait ErrorDisplay {
    fn show(&mut self, message: &str);

    fn clear(&mut self) {}
}

/// Holds only the most recent message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSlot {
    current: Option<String>,
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

impl ErrorDisplay for ErrorSlot {
    fn show(&mut self, message: &str) {
        self.current = Some(message.to_string());
    }

    fn clear(&mut self) {
        self.current = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Submitted(NormalizedRecord),
    Destroyed(String),
}

/// Sink that keeps every call in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    pub fn last_submitted(&self) -> Option<&NormalizedRecord> {
        self.events.iter().rev().find_map(|event| match event {
            SinkEvent::Submitted(record) => Some(record),
            SinkEvent::Destroyed(_) => None,
        })
    }

    pub fn destroyed(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|event| match event {
            SinkEvent::Destroyed(identity) => Some(identity.as_str()),
            SinkEvent::Submitted(_) => None,
        })
    }
}

impl SubmissionSink for RecordingSink {
    fn submit(&mut self, record: NormalizedRecord) {
        self.events.push(SinkEvent::Submitted(record));
    }

    fn destroy(&mut self, identity: &str) {
        self.events.push(SinkEvent::Destroyed(identity.to_string()));
    }
}
