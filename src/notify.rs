//! Notification layer.
//!
//! A bounded stack of transient messages. Only `max_visible` are shown at a
//! time; the rest wait in a queue. Visible messages expire `auto_hide` after
//! they were first shown. Identical messages are not stacked twice, and each
//! channel keeps at most one message alive: posting on a channel closes its
//! previous message.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub level: Level,
    pub message: String,
    shown_at: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub max_visible: usize,
    pub auto_hide_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_visible: 5,
            auto_hide_secs: 5,
        }
    }
}

#[derive(Debug)]
pub struct Notifications {
    visible: Vec<Notification>,
    pending: VecDeque<Notification>,
    channels: HashMap<&'static str, NotificationId>,
    max_visible: usize,
    auto_hide: Duration,
    next_id: u64,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(NotificationConfig::default())
    }
}

impl Notifications {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            visible: Vec::new(),
            pending: VecDeque::new(),
            channels: HashMap::new(),
            max_visible: config.max_visible.max(1),
            auto_hide: Duration::from_secs(config.auto_hide_secs),
            next_id: 0,
        }
    }

    /// Posts on `channel`, closing whatever that channel showed before. A
    /// duplicate of another channel's message stays owned by that channel.
    pub fn post(
        &mut self,
        channel: &'static str,
        level: Level,
        message: impl Into<String>,
    ) -> NotificationId {
        if let Some(previous) = self.channels.remove(channel) {
            self.close(previous);
        }
        let fresh = NotificationId(self.next_id);
        let id = self.enqueue(level, message, Instant::now());
        if id == fresh {
            self.channels.insert(channel, id);
        }
        id
    }

    /// Adds a message. A message identical to one already visible or queued
    /// is dropped and the existing id returned.
    pub fn enqueue(
        &mut self,
        level: Level,
        message: impl Into<String>,
        now: Instant,
    ) -> NotificationId {
        let message = message.into();
        if let Some(existing) = self
            .visible
            .iter()
            .chain(self.pending.iter())
            .find(|n| n.message == message)
        {
            return existing.id;
        }

        let id = NotificationId(self.next_id);
        self.next_id += 1;
        tracing::debug!(?level, %message, "notification");
        self.pending.push_back(Notification {
            id,
            level,
            message,
            shown_at: None,
        });
        self.promote(now);
        id
    }

    pub fn close(&mut self, id: NotificationId) {
        self.visible.retain(|n| n.id != id);
        self.pending.retain(|n| n.id != id);
        self.channels.retain(|_, v| *v != id);
    }

    /// Expires old messages and promotes queued ones into freed slots.
    pub fn tick(&mut self, now: Instant) {
        let auto_hide = self.auto_hide;
        let expired: Vec<NotificationId> = self
            .visible
            .iter()
            .filter(|n| n.shown_at.is_some_and(|t| now.duration_since(t) >= auto_hide))
            .map(|n| n.id)
            .collect();
        for id in expired {
            self.close(id);
        }
        self.promote(now);
    }

    pub fn visible(&self) -> &[Notification] {
        &self.visible
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn promote(&mut self, now: Instant) {
        while self.visible.len() < self.max_visible {
            let Some(mut next) = self.pending.pop_front() else {
                break;
            };
            next.shown_at = Some(now);
            self.visible.push(next);
        }
    }
}
