// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! The error taxonomy shared by every crate so the hub can translate
//! any domain error into a uniform `{error: {code, message}}` response
//! frame.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, PartialEq)]
#[serde(tag = "code", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HubError {
    #[error("authentication failed: {0}")]
    AuthFailed(String),
    #[error("task is locked")]
    Locked,
    #[error("claim conflict")]
    ClaimConflict,
    #[error("edit conflict")]
    Conflict,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("contribution rejected: {0}")]
    Intervention(String),
    #[error("slow consumer")]
    SlowConsumer,
    #[error("internal error")]
    Internal,
}

impl HubError {
    /// Stable wire code, independent of `Display`'s human message.
    pub fn code(&self) -> &'static str {
        match self {
            HubError::AuthFailed(_) => "AUTH_FAILED",
            HubError::Locked => "LOCKED",
            HubError::ClaimConflict => "CLAIM_CONFLICT",
            HubError::Conflict => "CONFLICT",
            HubError::NotFound(_) => "NOT_FOUND",
            HubError::Forbidden(_) => "FORBIDDEN",
            HubError::Intervention(_) => "INTERVENTION",
            HubError::SlowConsumer => "SLOW_CONSUMER",
            HubError::Internal => "INTERNAL",
        }
    }

    /// Whether a caller may retry after some delay.
    pub fn retryable(&self) -> bool {
        matches!(self, HubError::Locked)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
