//! Transient user notices ("toasts") and their history.

use crate::error::TipJarError;
use crate::wallet::ExecutionReceipt;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long the newest notice stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_secs(4);

const HISTORY_CAPACITY: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Clone, Debug)]
pub struct NotificationEntry {
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl NotificationEntry {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: chrono::Local::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    /// Notice for the outcome of a tip submission.
    pub fn from_submission(result: &Result<ExecutionReceipt, TipJarError>) -> Self {
        match result {
            Ok(_) => Self::success("Tip sent successfully! ☕"),
            Err(e) => Self::error(e.to_string()),
        }
    }

    pub fn time_ago(&self) -> String {
        let now = chrono::Local::now();
        let duration = now.signed_duration_since(self.timestamp);
        if duration.num_seconds() < 60 {
            "just now".to_string()
        } else if duration.num_minutes() < 60 {
            format!("{}m ago", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h ago", duration.num_hours())
        } else {
            self.timestamp.format("%m/%d %H:%M").to_string()
        }
    }
}

/// Bounded notice history plus the toast currently on screen.
#[derive(Default)]
pub struct Notifications {
    entries: VecDeque<NotificationEntry>,
    toast_until: Option<Instant>,
}

impl Notifications {
    pub fn push(&mut self, entry: NotificationEntry) {
        self.push_at(entry, Instant::now());
    }

    fn push_at(&mut self, entry: NotificationEntry, now: Instant) {
        if self.entries.len() == HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.toast_until = Some(now + TOAST_DURATION);
    }

    /// The newest notice, while its toast is still showing.
    pub fn active_toast(&self) -> Option<&NotificationEntry> {
        self.active_toast_at(Instant::now())
    }

    fn active_toast_at(&self, now: Instant) -> Option<&NotificationEntry> {
        match self.toast_until {
            Some(until) if now < until => self.entries.back(),
            _ => None,
        }
    }

    pub fn dismiss_toast(&mut self) {
        self.toast_until = None;
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &NotificationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
