// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hc-storage: atomic JSON persistence, workspace path layout and
//! configuration loading for the HarmonyCode hub.

pub mod atomic;
pub mod config;
pub mod paths;

pub use atomic::{load_if_present, write_atomic, StorageError};
pub use config::{Config, DiversityConfig, SwarmMode};
pub use paths::Workspace;
