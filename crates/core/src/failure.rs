// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed command failures.
//!
//! The platform only sees [`FailureKind`]'s `Display` text (`EXIT CODE <n>`
//! for ordinary exits); everything else stays structured for logs and tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a command counts as failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// The process exited with a non-zero code.
    #[error("EXIT CODE {code}")]
    Exited { code: i32 },
    /// The process was terminated by a signal.
    #[error("KILLED BY SIGNAL {signal}")]
    Signaled { signal: i32 },
    /// The process could not be started at all.
    #[error("{message}")]
    SpawnFailed { message: String },
    /// The process outlived the configured command timeout and was killed.
    #[error("TIMED OUT AFTER {after_ms}ms")]
    TimedOut { after_ms: u64 },
}

/// A failed command with enough context to explain the failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("command #{index} `{command}` failed: {kind}")]
pub struct CommandFailure {
    pub index: usize,
    pub command: String,
    pub kind: FailureKind,
    /// Last bytes written to stderr before the failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr_tail: Option<String>,
}

impl CommandFailure {
    pub fn new(command: &crate::Command, kind: FailureKind) -> Self {
        Self { index: command.index, command: command.line.clone(), kind, stderr_tail: None }
    }

    pub fn with_stderr_tail(mut self, tail: Option<String>) -> Self {
        self.stderr_tail = tail.filter(|t| !t.is_empty());
        self
    }

    /// Exit code, when the process exited on its own.
    pub fn exit_code(&self) -> Option<i32> {
        match self.kind {
            FailureKind::Exited { code } => Some(code),
            _ => None,
        }
    }

    /// Message reported to the platform in the job's `exception` event.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

#[cfg(test)]
#[path = "failure_tests.rs"]
mod tests;
