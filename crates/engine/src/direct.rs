// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot commands run without a shell or workspace.
//!
//! The exit code is reported inside the `result` event rather than as an
//! exception: `stdout` carries `EXIT CODE 0` on success, `stderr` carries
//! `EXIT CODE <n>` otherwise. Only a process that cannot be started ends in
//! an exception.

use std::path::PathBuf;
use std::process::Stdio;

use ag_adapters::Reporter;
use ag_core::{FailureKind, Stream};

use crate::runner::{exit_failure, wait_for};
use crate::stream::drain;

/// How a direct command ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectOutcome {
    Exited(i32),
    Signaled(i32),
    SpawnFailed(String),
}

/// Runs `command` topic jobs.
#[derive(Debug, Clone, Default)]
pub struct DirectCommand {
    /// Working directory; the agent's own when `None`.
    cwd: Option<PathBuf>,
}

impl DirectCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: Some(cwd.into()) }
    }

    /// Split `command` on whitespace, run it, stream its output and emit the
    /// terminal event.
    ///
    /// An empty command line is reported as a spawn failure.
    pub async fn run<R: Reporter>(&self, command: &str, reporter: &R) -> DirectOutcome {
        let mut words = command.split_whitespace();
        let Some(program) = words.next() else {
            let message = "empty command".to_string();
            reporter.exception(message.clone()).await;
            return DirectOutcome::SpawnFailed(message);
        };

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(words).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        tracing::info!(%command, "running direct command");
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                let message = format!("failed to spawn {program}: {e}");
                tracing::warn!(%command, error = %e, "direct command failed to start");
                reporter.exception(message.clone()).await;
                return DirectOutcome::SpawnFailed(message);
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (status, _, _) = tokio::join!(
            wait_for(&mut child, None),
            drain(stdout, Stream::Stdout, reporter),
            drain(stderr, Stream::Stderr, reporter),
        );

        let outcome = match status.and_then(exit_failure) {
            Ok(()) => DirectOutcome::Exited(0),
            Err(FailureKind::Exited { code }) => DirectOutcome::Exited(code),
            Err(FailureKind::Signaled { signal }) => DirectOutcome::Signaled(signal),
            Err(kind) => DirectOutcome::SpawnFailed(kind.to_string()),
        };
        tracing::info!(%command, outcome = ?outcome, "direct command finished");

        match &outcome {
            DirectOutcome::Exited(0) => {
                reporter.result(Some(FailureKind::Exited { code: 0 }.to_string()), None).await
            }
            DirectOutcome::Exited(code) => {
                reporter.result(None, Some(FailureKind::Exited { code: *code }.to_string())).await
            }
            DirectOutcome::Signaled(signal) => {
                reporter.result(None, Some(FailureKind::Signaled { signal: *signal }.to_string())).await
            }
            DirectOutcome::SpawnFailed(message) => reporter.exception(message.clone()).await,
        }
        outcome
    }
}

#[cfg(test)]
#[path = "direct_tests.rs"]
mod tests;
