// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup for `agentd`.

use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

const LOG_PREFIX: &str = "agentd";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log directory: {0}")]
    Appender(#[from] InitError),
    #[error("tracing already initialized: {0}")]
    Subscriber(#[from] TryInitError),
}

/// Install the global subscriber: stderr always, plus a daily-rolling file
/// under `log_dir` when one is configured.
///
/// `RUST_LOG` controls filtering (default `info`). Keep the returned guard
/// alive for the life of the process or buffered file output is lost.
pub fn init(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();
    let stderr = fmt::layer().with_writer(std::io::stderr);

    let Some(dir) = log_dir else {
        tracing_subscriber::registry().with(filter).with(stderr).try_init()?;
        return Ok(None);
    };

    let (writer, guard) = tracing_appender::non_blocking(file_appender(dir)?);
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()?;
    Ok(Some(guard))
}

fn file_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .build(dir)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
