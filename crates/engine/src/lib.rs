// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ag-engine: job execution for the build agent

pub mod direct;
pub mod dispatch;
pub mod runner;
mod stream;
pub mod sync;
pub mod workspace;

pub use direct::{DirectCommand, DirectOutcome};
pub use dispatch::{DispatchError, Dispatched, Dispatcher, DispatcherConfig};
pub use runner::{CommandRunner, DispatchMode, RunOutcome, RunnerConfig, UnknownDispatchMode, EXECUTION_FINISHED};
pub use sync::{RepositorySynchronizer, SyncError, SyncOutcome};
pub use workspace::{Released, WorkspaceError, WorkspaceManager};
