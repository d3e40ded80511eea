// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! agentd: connects to the platform and runs the jobs it sends.

use std::sync::Arc;

use ag_adapters::{GitCli, GitHubTokenExchange};
use ag_core::SystemClock;
use ag_daemon::{logging, Config, Session, SessionConfig};
use ag_engine::Dispatcher;
use anyhow::Context;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    let _log_guard = logging::init(config.log_dir.as_deref()).context("initializing logging")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), ?config, "starting agentd");
    tokio::fs::create_dir_all(&config.workspace_root)
        .await
        .with_context(|| format!("creating workspace root {}", config.workspace_root.display()))?;

    let dispatcher = Dispatcher::new(
        config.dispatcher(),
        GitHubTokenExchange::new(config.github_api.clone()),
        GitCli,
        SystemClock,
    );
    let session = Session::new(
        SessionConfig {
            url: config.platform_url.clone(),
            token: config.token.clone(),
            reconnect_delay: config.reconnect_delay,
        },
        Arc::new(dispatcher),
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for interrupt");
            return;
        }
        tracing::info!("interrupt received, shutting down");
        on_signal.cancel();
    });

    session.run(cancel).await;
    Ok(())
}
