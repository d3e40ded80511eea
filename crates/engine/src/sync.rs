// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository sync for `push`, `pull_request` and `check_suite` jobs.
//!
//! Exchanges the trigger service's app credentials for an installation
//! token, clones the webhook's repository into the execution's workspace and
//! checks out the commit the webhook points at. Nothing is retried; a failed
//! sync leaves the workspace as it is for the platform to tear down.

use std::path::PathBuf;

use ag_adapters::git::GITHUB_HOST;
use ag_adapters::{AppCredentials, CloneUrl, CredentialError, GitAdapter, GitError, Reporter, TokenExchange};
use ag_core::{Clock, ExecutionId, JobRequest, SystemClock, Topic};
use thiserror::Error;

use crate::workspace::{WorkspaceError, WorkspaceManager};

/// Why a sync did not complete. Reported to the platform as one exception.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{0:?} jobs do not sync a repository")]
    NotASyncTopic(String),
    #[error("webhook payload is missing {0}")]
    MissingField(&'static str),
    #[error("trigger service credentials are missing")]
    MissingCredentials,
    #[error("could not obtain an installation token: {0}")]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Git(#[from] GitError),
}

/// How a sync ended. The terminal event has already been emitted.
#[derive(Debug)]
pub enum SyncOutcome {
    Synced { workspace: PathBuf, repository: String, commit: String },
    Failed(SyncError),
}

/// What to check out where, resolved from the request before any I/O.
#[derive(Debug)]
struct SyncTarget {
    repository: String,
    commit: String,
    installation_id: u64,
    credentials: AppCredentials,
}

impl SyncTarget {
    fn resolve(job: &JobRequest) -> Result<Self, SyncError> {
        let topic = match job.topic() {
            Ok(topic) if topic.is_sync() => topic,
            _ => return Err(SyncError::NotASyncTopic(job.topic.clone())),
        };
        let webhook = job.webhook.as_ref().ok_or(SyncError::MissingField("webhook"))?;
        let repository = webhook
            .repository_name()
            .filter(|name| !name.is_empty())
            .ok_or(SyncError::MissingField("repository.full_name"))?;
        let installation_id =
            webhook.installation_id().ok_or(SyncError::MissingField("installation.id"))?;
        let commit = webhook
            .target_commit(topic)
            .filter(|sha| !sha.is_empty())
            .ok_or(SyncError::MissingField(commit_field(topic)))?;
        let service = job.trigger_service.as_ref().ok_or(SyncError::MissingCredentials)?;

        Ok(Self {
            repository: repository.to_string(),
            commit: commit.to_string(),
            installation_id,
            credentials: AppCredentials::from_config(&service.config),
        })
    }
}

fn commit_field(topic: Topic) -> &'static str {
    match topic {
        Topic::PullRequest => "pull_request.head.sha",
        Topic::CheckSuite => "check_suite.head_sha",
        _ => "head_commit.id",
    }
}

/// Brings an execution's workspace to the commit a webhook refers to.
#[derive(Debug, Clone)]
pub struct RepositorySynchronizer<T, G, C: Clock = SystemClock> {
    workspaces: WorkspaceManager<C>,
    tokens: T,
    git: G,
    git_host: String,
}

impl<T, G, C> RepositorySynchronizer<T, G, C>
where
    T: TokenExchange,
    G: GitAdapter,
    C: Clock,
{
    pub fn new(workspaces: WorkspaceManager<C>, tokens: T, git: G) -> Self {
        Self { workspaces, tokens, git, git_host: GITHUB_HOST.to_string() }
    }

    /// Clone from `host` instead of github.com (GitHub Enterprise).
    pub fn with_git_host(mut self, host: impl Into<String>) -> Self {
        self.git_host = host.into();
        self
    }

    /// Sync the job's repository and emit its terminal event.
    ///
    /// Only a workspace that cannot be allocated is returned as an error; it
    /// is returned before any event is emitted.
    pub async fn sync<R: Reporter>(
        &self,
        job: &JobRequest,
        reporter: &R,
    ) -> Result<SyncOutcome, WorkspaceError> {
        let execution = self.workspaces.key_for(job.execution.as_ref());

        let target = match SyncTarget::resolve(job) {
            Ok(target) => target,
            Err(e) => return Ok(self.fail(&execution, e, reporter).await),
        };
        let workspace = self.workspaces.allocate(Some(&execution)).await?;

        match self.sync_into(&execution, &target, &workspace, reporter).await {
            Ok(()) => {
                tracing::info!(
                    %execution,
                    repository = %target.repository,
                    commit = %target.commit,
                    path = %workspace.display(),
                    "repository synced"
                );
                let message = format!("Checked out {}@{}", target.repository, target.commit);
                reporter.result(Some(message), None).await;
                Ok(SyncOutcome::Synced {
                    workspace,
                    repository: target.repository,
                    commit: target.commit,
                })
            }
            Err(e) => Ok(self.fail(&execution, e, reporter).await),
        }
    }

    async fn sync_into<R: Reporter>(
        &self,
        execution: &ExecutionId,
        target: &SyncTarget,
        workspace: &std::path::Path,
        reporter: &R,
    ) -> Result<(), SyncError> {
        say(reporter, format!("Workspace {}", workspace.display())).await;
        say(reporter, format!("Requesting access token for installation {}", target.installation_id)).await;
        let token = self.tokens.installation_token(&target.credentials, target.installation_id).await?;

        let url = CloneUrl::with_token(&self.git_host, &target.repository, &token);
        say(reporter, format!("Cloning {}", target.repository)).await;
        tracing::info!(%execution, %url, path = %workspace.display(), "cloning");
        self.git.clone_repo(&url, workspace).await.map_err(|e| scrub(&url, e))?;

        say(reporter, format!("Checking out {}", target.commit)).await;
        self.git.checkout(workspace, &target.commit).await?;
        Ok(())
    }

    async fn fail<R: Reporter>(&self, execution: &ExecutionId, error: SyncError, reporter: &R) -> SyncOutcome {
        tracing::warn!(%execution, error = %error, "sync failed");
        reporter.exception(error.to_string()).await;
        SyncOutcome::Failed(error)
    }
}

async fn say<R: Reporter>(reporter: &R, line: String) {
    reporter.progress(Some(format!("{line}\n")), None).await;
}

/// Git may echo the clone URL in its error output.
fn scrub(url: &CloneUrl, error: GitError) -> SyncError {
    match error {
        GitError::Failed { op, message } => {
            SyncError::Git(GitError::Failed { op, message: url.redact(&message) })
        }
        other => SyncError::Git(other),
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
