// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow state and the memory-entry envelope persisted under a
//! workspace's `memory/` subtree.

use hc_core::WorkflowId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub workflow_id: WorkflowId,
    pub status: WorkflowStatus,
    pub data: Value,
    pub started_at_ms: u64,
    pub updated_at_ms: u64,
}

/// On-disk shape of one `memory/<key>.json` entry. Workflow snapshots
/// live separately in `orchestration-state.json`; this is exclusively
/// for values stored through the memory `store`/`retrieve`/`list` ops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub key: String,
    pub value: Value,
    pub stored_at_ms: u64,
}
