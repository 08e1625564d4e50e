// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors local to lock and claim operations, translated to
//! [`hc_core::HubError`] at the hub boundary.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("lock not held by this agent with this token")]
    NotHeld,
    #[error("task already has a non-completed claim")]
    AlreadyClaimed,
}

impl From<LockError> for hc_core::HubError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::NotHeld => hc_core::HubError::Locked,
            LockError::AlreadyClaimed => hc_core::HubError::ClaimConflict,
        }
    }
}
