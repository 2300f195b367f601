//! Bounded notification feed
//!
//! Holds the most recent notifications, newest first. Pushing beyond the
//! capacity drops the oldest entry. Only `mark_as_read` and `clear_all`
//! mutate entries after insertion.

use std::collections::VecDeque;
use std::time::Duration;
use crate::models::{Notification, Priority};

/// Default number of retained notifications
pub const DEFAULT_FEED_CAPACITY: usize = 50;

/// Visual style of a transient alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStyle {
    Danger,
    Warning,
    Success,
}

impl AlertStyle {
    /// Hex color used by the dashboard for this style
    pub fn color(&self) -> &'static str {
        match self {
            AlertStyle::Danger => "#ef4444",
            AlertStyle::Warning => "#f59e0b",
            AlertStyle::Success => "#10b981",
        }
    }
}

/// Transient alert raised for each incoming notification
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub duration: Duration,
    pub style: AlertStyle,
}

impl Alert {
    pub fn for_notification(notification: &Notification) -> Self {
        let (duration, style) = match notification.priority {
            Priority::High => (Duration::from_secs(8), AlertStyle::Danger),
            Priority::Medium => (Duration::from_secs(5), AlertStyle::Warning),
            Priority::Low => (Duration::from_secs(5), AlertStyle::Success),
        };

        Self {
            title: notification.title.clone(),
            message: notification.message.clone(),
            duration,
            style,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationFeed {
    entries: VecDeque<Notification>,
    capacity: usize,
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl NotificationFeed {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Prepend a notification, truncating to capacity, and return its alert
    pub fn push(&mut self, notification: Notification) -> Alert {
        let alert = Alert::for_notification(&notification);
        self.entries.push_front(notification);
        self.entries.truncate(self.capacity);
        alert
    }

    /// Entries newest first
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    /// Mark every entry with this id as read; unknown ids are ignored.
    ///
    /// Returns whether any entry changed.
    pub fn mark_as_read(&mut self, id: i64) -> bool {
        let mut changed = false;
        for notification in self.entries.iter_mut().filter(|n| n.id == id && !n.read) {
            notification.read = true;
            changed = true;
        }
        changed
    }

    /// Drop all entries locally; the backend is not informed
    pub fn clear_all(&mut self) {
        self.entries.clear();
    }
}
