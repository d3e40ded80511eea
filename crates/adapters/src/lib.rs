// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: the report channel, credential exchange, git.

pub mod credential;
pub mod git;
pub mod report;
pub mod subprocess;

pub use credential::{AccessToken, AppCredentials, CredentialError, GitHubTokenExchange, TokenExchange};
pub use git::{CloneUrl, GitAdapter, GitCall, GitCli, GitError};
pub use report::{ChannelReporter, Reporter};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use credential::FakeTokenExchange;
#[cfg(any(test, feature = "test-support"))]
pub use git::FakeGitAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use report::FakeReporter;
