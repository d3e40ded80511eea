// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON encoding of protocol frames.

use ag_core::{ExecutionId, JobRequest, RequestRef};
use thiserror::Error;

use crate::Outbound;

/// Largest inbound frame accepted (16 MiB). Webhook payloads are big but not
/// that big.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode an inbound job request frame.
pub fn decode_request(frame: &str) -> Result<JobRequest, ProtocolError> {
    check_len(frame)?;
    Ok(serde_json::from_str(frame)?)
}

/// Topic and addressing fields of a request that failed to decode.
///
/// Lets the agent answer a malformed request instead of dropping it. `None`
/// when the frame is not a JSON object with a string `topic`.
pub fn request_address(frame: &str) -> Option<(String, RequestRef)> {
    check_len(frame).ok()?;
    let value: serde_json::Value = serde_json::from_str(frame).ok()?;
    let topic = value.get("topic")?.as_str()?.to_owned();
    let text = |field: &str| value.get(field).and_then(serde_json::Value::as_str).map(str::to_owned);
    let req = RequestRef { execution: text("execution").map(ExecutionId::new), current_step: text("currentStep") };
    Some((topic, req))
}

/// Encode a report frame for sending.
pub fn encode_outbound(frame: &Outbound) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(frame)?)
}

/// Decode a report frame (the platform side of the protocol; used in tests
/// and by tooling that replays agent output).
pub fn decode_outbound(frame: &str) -> Result<Outbound, ProtocolError> {
    check_len(frame)?;
    Ok(serde_json::from_str(frame)?)
}

fn check_len(frame: &str) -> Result<(), ProtocolError> {
    if frame.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge { len: frame.len(), max: MAX_FRAME_LEN });
    }
    Ok(())
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
