//! Event log — circular buffer of recent session events for the side panel.

use std::collections::VecDeque;

use crate::event::SessionEvent;

/// How an entry should be colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Fault,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub message: String,
    pub tone: Tone,
}

/// Circular buffer of recent events. Beat ticks are not logged.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an event, evicting the oldest entry if at capacity.
    pub fn push(&mut self, event: &SessionEvent) {
        let tone = match event {
            SessionEvent::Beat { .. } => return,
            SessionEvent::Judged { judgment, .. } if judgment.is_success() => Tone::Success,
            SessionEvent::Judged { judgment, .. } if judgment.is_failure() => Tone::Fault,
            SessionEvent::Miss { .. }
            | SessionEvent::LifeLost { .. }
            | SessionEvent::GameOver { .. } => Tone::Fault,
            _ => Tone::Info,
        };
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            message: event.to_string(),
            tone,
        });
    }

    /// The `n` most recent entries, newest last.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
