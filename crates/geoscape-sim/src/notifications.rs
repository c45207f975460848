//! Ordered queue of pop-up notifications.
//!
//! The clock does not step while anything is queued; the screen layer pops one
//! entry at a time and the next `advance` resumes once the queue is empty.

use std::collections::VecDeque;

use geoscape_core::events::{Notification, QueuedNotification};
use geoscape_core::types::GameTime;

#[derive(Debug, Default)]
pub struct NotificationQueue {
    queue: VecDeque<QueuedNotification>,
    next_seq: u64,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: GameTime, notification: Notification) {
        tracing::debug!(
            target: "geoscape::clock",
            seq = self.next_seq,
            ?notification,
            "notification.queued"
        );
        self.queue.push_back(QueuedNotification {
            seq: self.next_seq,
            time,
            notification,
        });
        self.next_seq += 1;
    }

    pub fn front(&self) -> Option<&QueuedNotification> {
        self.queue.front()
    }

    /// Remove the oldest notification.
    pub fn pop(&mut self) -> Option<QueuedNotification> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedNotification> {
        self.queue.iter()
    }
}
