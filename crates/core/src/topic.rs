// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job topics: the logical event name the platform attaches to a request.

use std::str::FromStr;
use thiserror::Error;

/// What the platform is asking the agent to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Sync the repository to `head_commit.id`.
    Push,
    /// Sync the repository to `pull_request.head.sha`.
    PullRequest,
    /// Sync the repository to `check_suite.head_sha`.
    CheckSuite,
    /// Run one command directly (no shell, no workspace).
    Command,
    /// Run a multi-line script in the execution's workspace.
    Script,
    /// The platform is done with the execution; tear down its workspace.
    ExecutionFinished,
}

crate::simple_display! {
    Topic {
        Push => "push",
        PullRequest => "pull_request",
        CheckSuite => "check_suite",
        Command => "command",
        Script => "script",
        ExecutionFinished => "executionFinished",
    }
}

impl Topic {
    /// Topics that clone and check out the webhook's repository.
    pub fn is_sync(self) -> bool {
        matches!(self, Topic::Push | Topic::PullRequest | Topic::CheckSuite)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown topic: {0:?}")]
pub struct UnknownTopic(pub String);

impl FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "push" => Ok(Topic::Push),
            "pull_request" => Ok(Topic::PullRequest),
            "check_suite" => Ok(Topic::CheckSuite),
            "command" => Ok(Topic::Command),
            // `test_cmd` is the name older platform builds send for scripts
            "script" | "test_cmd" => Ok(Topic::Script),
            "executionFinished" => Ok(Topic::ExecutionFinished),
            other => Err(UnknownTopic(other.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "topic_tests.rs"]
mod tests;
