//! Event types recorded during a session
//!
//! A session produces exactly one [`EventLog`]: a `start` event, zero or more
//! `tick` events, and a closing `end` event, numbered contiguously from zero.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// What caused an event to be recorded
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLabel {
    /// Synthetic marker recorded when the session begins
    Start,
    /// Operator marked an occurrence
    Tick,
    /// Synthetic marker recorded when the session ends
    End,
}

impl EventLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventLabel::Start => "start",
            EventLabel::Tick => "tick",
            EventLabel::End => "end",
        }
    }
}

impl fmt::Display for EventLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded occurrence
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Position in the session, starting at 0
    pub seq: u64,
    /// When the collector accepted the notification
    pub timestamp: DateTime<Local>,
    pub label: EventLabel,
}

/// Ordered events of a single session
///
/// Only the collector appends to a log. Once handed out it is read-only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append an event stamped with the current time and return its sequence number
    pub(crate) fn record(&mut self, label: EventLabel) -> u64 {
        let seq = self.events.len() as u64;
        self.events.push(Event {
            seq,
            timestamp: Local::now(),
            label,
        });
        seq
    }

    /// Sequence number the next appended event will get
    pub(crate) fn next_seq(&self) -> u64 {
        self.events.len() as u64
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn first(&self) -> Option<&Event> {
        self.events.first()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Number of operator ticks between the start and end markers
    pub fn tick_count(&self) -> usize {
        self.events.iter().filter(|e| e.label == EventLabel::Tick).count()
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
