// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
//! Local error type for the diversity crate, translated to
//! [`hc_core::HubError`] at the orchestration boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiversityError {
    #[error("contribution rejected: {reason}")]
    Rejected { reason: String },
}

impl From<DiversityError> for hc_core::HubError {
    fn from(err: DiversityError) -> Self {
        match err {
            DiversityError::Rejected { reason } => hc_core::HubError::Intervention(reason),
        }
    }
}
