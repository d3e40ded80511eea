// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routes a job request to the component that handles its topic.

use std::path::PathBuf;

use ag_adapters::git::GITHUB_HOST;
use ag_adapters::{GitAdapter, Reporter, TokenExchange};
use ag_core::{Clock, JobRequest, SystemClock, Topic, UnknownTopic};
use thiserror::Error;

use crate::direct::{DirectCommand, DirectOutcome};
use crate::runner::{CommandRunner, RunOutcome, RunnerConfig};
use crate::sync::{RepositorySynchronizer, SyncOutcome};
use crate::workspace::{Released, WorkspaceError, WorkspaceManager};

/// A request the engine could not take on.
///
/// No terminal event has been emitted when this is returned; the caller owes
/// the platform exactly one exception.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    UnknownTopic(#[from] UnknownTopic),
    #[error("{topic} request is missing `{field}`")]
    MissingField { topic: Topic, field: &'static str },
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

/// What a dispatched job did.
#[derive(Debug)]
pub enum Dispatched {
    Direct(DirectOutcome),
    Synced(SyncOutcome),
    Ran(RunOutcome),
    Released(Released),
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub workspace_root: PathBuf,
    pub git_host: String,
    pub runner: RunnerConfig,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workspace_root: std::env::temp_dir(),
            git_host: GITHUB_HOST.to_string(),
            runner: RunnerConfig::default(),
        }
    }
}

pub struct Dispatcher<T, G, C: Clock = SystemClock> {
    workspaces: WorkspaceManager<C>,
    sync: RepositorySynchronizer<T, G, C>,
    runner: CommandRunner<C>,
    direct: DirectCommand,
}

impl<T, G, C> Dispatcher<T, G, C>
where
    T: TokenExchange,
    G: GitAdapter,
    C: Clock,
{
    pub fn new(config: DispatcherConfig, tokens: T, git: G, clock: C) -> Self {
        let workspaces = WorkspaceManager::with_clock(config.workspace_root, clock);
        Self {
            sync: RepositorySynchronizer::new(workspaces.clone(), tokens, git)
                .with_git_host(config.git_host),
            runner: CommandRunner::new(workspaces.clone(), config.runner),
            direct: DirectCommand::new(),
            workspaces,
        }
    }

    pub fn workspaces(&self) -> &WorkspaceManager<C> {
        &self.workspaces
    }

    /// Handle one job request.
    ///
    /// On `Ok`, the handler has emitted the job's terminal event (except for
    /// `executionFinished`, which reports nothing). On `Err`, nothing
    /// terminal has been emitted.
    pub async fn dispatch<R: Reporter>(
        &self,
        job: &JobRequest,
        reporter: &R,
    ) -> Result<Dispatched, DispatchError> {
        let topic = job.topic()?;
        let missing = |field| DispatchError::MissingField { topic, field };

        tracing::debug!(%topic, execution = ?job.execution, step = ?job.current_step, "dispatching job");
        match topic {
            Topic::Command => {
                let command = nonblank(job.command.as_deref()).ok_or_else(|| missing("command"))?;
                Ok(Dispatched::Direct(self.direct.run(command, reporter).await))
            }
            Topic::Push | Topic::PullRequest | Topic::CheckSuite => {
                Ok(Dispatched::Synced(self.sync.sync(job, reporter).await?))
            }
            Topic::Script => {
                if job.cmd.is_none() {
                    return Err(missing("cmd"));
                }
                Ok(Dispatched::Ran(self.runner.run(job, reporter).await?))
            }
            Topic::ExecutionFinished => {
                let execution = job.execution.as_ref().ok_or_else(|| missing("execution"))?;
                Ok(Dispatched::Released(self.workspaces.release(execution).await?))
            }
        }
    }
}

fn nonblank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
