// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! Task entity and its state machine.

use crate::id::{AgentId, TaskId};
use crate::perspective::Perspective;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Fields supplied by a client when creating a task.
#[derive(Debug, Clone, Default)]
pub struct TaskConfig {
    pub kind: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub dependencies: Vec<TaskId>,
    pub required_perspectives: Vec<Perspective>,
    pub evidence_required: bool,
    pub deadline_ms: Option<u64>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(default)]
    pub assigned_to: Option<AgentId>,
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    #[serde(default)]
    pub required_perspectives: Vec<Perspective>,
    #[serde(default)]
    pub evidence_required: bool,
    pub created_at_ms: u64,
    #[serde(default)]
    pub deadline_ms: Option<u64>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Free-form passthrough metadata, not interpreted by the engine.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Task {
    pub fn new(task_id: TaskId, config: TaskConfig, now_ms: u64) -> Self {
        Self {
            task_id,
            kind: config.kind,
            description: config.description,
            priority: config.priority.unwrap_or(Priority::Medium),
            status: TaskStatus::Pending,
            assigned_to: None,
            dependencies: config.dependencies,
            required_perspectives: config.required_perspectives,
            evidence_required: config.evidence_required,
            created_at_ms: now_ms,
            deadline_ms: config.deadline_ms,
            result: None,
            tags: config.tags,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.status, TaskStatus::Pending)
    }

    /// A task that is in progress always has an assignee.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            TaskStatus::InProgress => self.assigned_to.is_some(),
            _ => true,
        }
    }
}

/// Fixed compatibility map from task kind to compatible agent modes,
/// used to filter candidates during auto-assignment.
pub fn compatible_modes(task_kind: &str) -> &'static [&'static str] {
    match task_kind {
        "code" => &["coder", "tdd", "debugger"],
        "review" => &["reviewer", "tester", "analyzer"],
        "design" => &["architect", "designer"],
        "research" => &["researcher", "analyzer"],
        "documentation" => &["documenter"],
        _ => &[],
    }
}

pub fn build_compatibility_table() -> HashMap<&'static str, &'static [&'static str]> {
    let mut m = HashMap::new();
    for kind in ["code", "review", "design", "research", "documentation"] {
        m.insert(kind, compatible_modes(kind));
    }
    m
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
