// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! Edit entity: one submitted change to a shared file.

use crate::id::SessionId;
use serde::{Deserialize, Serialize};

/// Default window within which two edits to the same file by different
/// sessions constitute a conflict.
pub const EDIT_CONFLICT_WINDOW_MS: u64 = 5_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edit {
    pub file: String,
    /// Opaque op payload; schema validation is the emitting agent's
    /// responsibility. The hub never interprets the shape of an edit.
    pub op: serde_json::Value,
    pub version_clock: u64,
    pub session_ref: SessionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditConflictReport {
    pub conflict: bool,
    pub conflicts: Vec<Edit>,
}

impl Edit {
    /// Two edits conflict when they touch the same file, come from
    /// different sessions, and fall within [`EDIT_CONFLICT_WINDOW_MS`] of
    /// each other. Symmetric regardless of argument order.
    pub fn conflicts_with(&self, other: &Edit) -> bool {
        self.file == other.file
            && self.session_ref != other.session_ref
            && self.version_clock.abs_diff(other.version_clock) < EDIT_CONFLICT_WINDOW_MS
    }
}

#[cfg(test)]
#[path = "edit_tests.rs"]
mod tests;
