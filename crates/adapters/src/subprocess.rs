// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded subprocess execution for adapter-owned tools (git).
//!
//! User commands are not run through here: those stream their output and
//! have no default timeout. This helper is for short tool invocations whose
//! output is only inspected after exit.

use std::process::{Output, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

/// Upper bound for `git clone`.
pub const GIT_CLONE_TIMEOUT: Duration = Duration::from_secs(600);

/// Upper bound for `git checkout`.
pub const GIT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("{label}: failed to spawn: {source}")]
    Spawn {
        label: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{label}: timed out after {}s", timeout.as_secs())]
    TimedOut { label: String, timeout: Duration },
}

/// Run `cmd` to completion, capturing stdout/stderr, killing it if it takes
/// longer than `timeout`.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    label: &str,
) -> Result<Output, SubprocessError> {
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(SubprocessError::Spawn { label: label.to_string(), source }),
        Err(_) => {
            tracing::warn!(label, timeout_secs = timeout.as_secs(), "subprocess timed out");
            Err(SubprocessError::TimedOut { label: label.to_string(), timeout })
        }
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
