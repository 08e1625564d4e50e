// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hc-hub: the Connection Hub. Demultiplexes inbound WebSocket frames,
//! dispatches them against the identity store, orchestration engine and
//! diversity enforcer, and fans outbound frames back out, per spec §4.7.

pub mod dispatch;
pub mod hub;
pub mod protocol;
pub mod queue;
pub mod state;

pub use dispatch::{handle, event_to_frame, Outbound, Recipient, SessionCtx};
pub use hub::{ConnectionHub, LiveSession};
pub use protocol::{ClientFrame, ServerFrame};
pub use queue::OutboundQueue;
pub use state::HubState;
