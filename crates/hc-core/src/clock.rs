// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! Monotonic-clock abstraction.
//!
//! Lock and task-timeout expiry arithmetic uses a monotonic clock; wall
//! clock is reserved for human-readable timestamps in serialized records.
//! Tests inject a [`FakeClock`] so expiry logic is deterministic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic instant, used for expiry comparisons.
    fn now(&self) -> Instant;
    /// Wall-clock epoch milliseconds, used only for serialized timestamps.
    fn epoch_ms(&self) -> u64;
}

#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// A clock whose `now()`/`epoch_ms()` are advanced explicitly by tests.
///
/// `Instant` has no stable public constructor, so `FakeClock` anchors to a
/// real `Instant::now()` taken at creation and reports `anchor + offset`.
#[derive(Clone)]
pub struct FakeClock {
    anchor: Instant,
    offset_ms: Arc<AtomicU64>,
    epoch_base_ms: u64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            anchor: Instant::now(),
            offset_ms: Arc::new(AtomicU64::new(0)),
            epoch_base_ms: 1_700_000_000_000,
        }
    }

    pub fn advance(&self, ms: u64) {
        self.offset_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.anchor + std::time::Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }

    fn epoch_ms(&self) -> u64 {
        self.epoch_base_ms + self.offset_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
