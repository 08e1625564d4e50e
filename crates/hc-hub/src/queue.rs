// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-session outbound queue and its backpressure policy (spec
//! §4.7): bounded capacity, oldest-non-critical-dropped on overflow,
//! critical frames (`auth-*`, `intervention`) never dropped.

use std::collections::VecDeque;

use hc_core::HubError;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::protocol::ServerFrame;

/// A bounded, drop-oldest-non-critical outbound frame queue for one
/// session's writer task.
pub struct OutboundQueue {
    capacity: usize,
    inner: Mutex<VecDeque<ServerFrame>>,
    notify: Notify,
}

impl OutboundQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
        }
    }

    /// Enqueue `frame`, applying the backpressure policy when full.
    ///
    /// If there's room, the frame is simply appended. If the queue is
    /// full, the oldest non-critical frame is evicted to make room for
    /// the new one. If no non-critical frame exists to evict:
    /// - a critical incoming frame cannot be delivered either, so the
    ///   session must be closed (`Err(HubError::SlowConsumer)`);
    /// - a non-critical incoming frame is itself simply dropped (the
    ///   queue is entirely critical backlog, which will drain on its
    ///   own; losing one more notification is the intended policy).
    pub fn push(&self, frame: ServerFrame) -> Result<(), HubError> {
        let mut inner = self.inner.lock();
        if inner.len() < self.capacity {
            inner.push_back(frame);
        } else {
            match inner.iter().position(|f| !f.is_critical()) {
                Some(idx) => {
                    inner.remove(idx);
                    inner.push_back(frame);
                }
                None if frame.is_critical() => {
                    drop(inner);
                    return Err(HubError::SlowConsumer);
                }
                None => {}
            }
        }
        drop(inner);
        self.notify.notify_one();
        Ok(())
    }

    /// Wait for and pop the next queued frame, in FIFO order.
    pub async fn pop(&self) -> ServerFrame {
        loop {
            if let Some(frame) = self.inner.lock().pop_front() {
                return frame;
            }
            self.notify.notified().await;
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
