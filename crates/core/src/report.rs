// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Report events sent back to the platform.
//!
//! Every job produces zero or more `Progress` events followed by exactly one
//! terminal event: `Result` or `Exception`, never both.

use crate::ExecutionId;
use serde::{Deserialize, Serialize};

/// Identifies the request a report answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRef {
    pub execution: Option<ExecutionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
}

/// Output stream of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Stdout,
    Stderr,
}

crate::simple_display! {
    Stream {
        Stdout => "stdout",
        Stderr => "stderr",
    }
}

/// A progress, result or exception report.
///
/// `stdout`/`stderr` are always serialized, as `null` when unused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ReportEvent {
    Progress { stdout: Option<String>, stderr: Option<String> },
    Result { stdout: Option<String>, stderr: Option<String> },
    Exception { message: String },
}

impl ReportEvent {
    /// Wire name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportEvent::Progress { .. } => "progress",
            ReportEvent::Result { .. } => "result",
            ReportEvent::Exception { .. } => "exception",
        }
    }

    /// A progress event carrying one chunk of `stream`.
    pub fn chunk(stream: Stream, chunk: impl Into<String>) -> Self {
        match stream {
            Stream::Stdout => ReportEvent::Progress { stdout: Some(chunk.into()), stderr: None },
            Stream::Stderr => ReportEvent::Progress { stdout: None, stderr: Some(chunk.into()) },
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReportEvent::Progress { .. })
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
