// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build agent daemon library
//!
//! Configuration, logging and the platform session behind the `agentd`
//! binary.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod logging;
pub mod session;

pub use config::{Config, ConfigError, FileConfig};
pub use session::{Session, SessionConfig, SessionError};
