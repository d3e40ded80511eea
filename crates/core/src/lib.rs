// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ag-core: domain types for the build agent

pub mod macros;

pub mod clock;
pub mod failure;
pub mod id;
pub mod job;
pub mod report;
pub mod script;
pub mod topic;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use failure::{CommandFailure, FailureKind};
pub use id::ExecutionId;
pub use job::{JobRequest, TriggerService, TriggerServiceConfig, Webhook};
pub use report::{ReportEvent, RequestRef, Stream};
pub use script::Command;
pub use topic::{Topic, UnknownTopic};
