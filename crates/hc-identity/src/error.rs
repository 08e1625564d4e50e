// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors local to identity registration and authentication.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("display name already registered to a different agent")]
    NameTaken,
    #[error("auth token does not match the stored token for this display name")]
    TokenMismatch,
    #[error("unknown agent id")]
    NotFound,
}

impl From<IdentityError> for hc_core::HubError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NameTaken => hc_core::HubError::AuthFailed("NAME_TAKEN".into()),
            IdentityError::TokenMismatch => hc_core::HubError::AuthFailed("AUTH_FAILED".into()),
            IdentityError::NotFound => hc_core::HubError::NotFound("agent".into()),
        }
    }
}
