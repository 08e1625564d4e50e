// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! Errors local to the orchestration engine, translated to
//! [`hc_core::HubError`] at the hub boundary.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("agent not found: {0}")]
    AgentNotFound(String),
    #[error("agent is busy")]
    AgentBusy,
    #[error("task is locked")]
    Locked,
    #[error("claim conflict")]
    ClaimConflict,
    #[error("memory key not found: {0}")]
    MemoryNotFound(String),
    #[error("workflow not found: {0}")]
    WorkflowNotFound(String),
    #[error("status update attempted by non-owner")]
    Forbidden,
}

impl From<EngineError> for hc_core::HubError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::TaskNotFound(id) => hc_core::HubError::NotFound(id),
            EngineError::AgentNotFound(id) => hc_core::HubError::NotFound(id),
            EngineError::MemoryNotFound(key) => hc_core::HubError::NotFound(key),
            EngineError::WorkflowNotFound(id) => hc_core::HubError::NotFound(id),
            EngineError::AgentBusy => hc_core::HubError::Forbidden("agent is busy".to_string()),
            EngineError::Locked => hc_core::HubError::Locked,
            EngineError::ClaimConflict => hc_core::HubError::ClaimConflict,
            EngineError::Forbidden => hc_core::HubError::Forbidden("not the task owner".to_string()),
        }
    }
}

impl From<hc_locks::LockError> for EngineError {
    fn from(err: hc_locks::LockError) -> Self {
        match err {
            hc_locks::LockError::NotHeld => EngineError::Locked,
            hc_locks::LockError::AlreadyClaimed => EngineError::ClaimConflict,
        }
    }
}
