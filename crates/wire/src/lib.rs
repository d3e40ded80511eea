// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session protocol between the agent and the platform.
//!
//! Wire format: one JSON object per WebSocket text frame. Inbound frames are
//! job requests; outbound frames are report events addressed to the request
//! that caused them.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod frame;
mod wire;

pub use frame::Outbound;
pub use wire::{
    decode_outbound, decode_request, encode_outbound, request_address, ProtocolError, MAX_FRAME_LEN,
};
