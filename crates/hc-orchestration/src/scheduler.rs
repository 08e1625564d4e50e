// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task-claim timeout scheduling, generalized from the teacher's
//! job-step timer scheduler to a single `TaskId`-keyed deadline table.

use hc_core::{Clock, TaskId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tracks one pending deadline per in-progress task.
#[derive(Default)]
pub struct Scheduler {
    deadlines: HashMap<TaskId, Instant>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule (or reschedule) a timeout for `task_id`, firing `duration`
    /// from `now`.
    pub fn set_timeout<C: Clock>(&mut self, clock: &C, task_id: TaskId, duration: Duration) {
        self.deadlines.insert(task_id, clock.now() + duration);
    }

    /// Cancel a pending timeout, e.g. on completion or manual assignment
    /// change.
    pub fn cancel(&mut self, task_id: &TaskId) {
        self.deadlines.remove(task_id);
    }

    /// Drain and return every task whose deadline has passed.
    pub fn fired<C: Clock>(&mut self, clock: &C) -> Vec<TaskId> {
        let now = clock.now();
        let fired: Vec<TaskId> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &fired {
            self.deadlines.remove(id);
        }
        fired
    }

    pub fn has_pending(&self) -> bool {
        !self.deadlines.is_empty()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
