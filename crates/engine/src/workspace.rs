// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace directories, one per execution.
//!
//! The mapping from execution id to directory is deterministic
//! (`<root>/<execution>`), so every phase of an execution (sync, then one or
//! more scripts) lands in the same place without any bookkeeping. Deletion
//! only happens when the platform says the execution is finished.

use std::io;
use std::path::{Path, PathBuf};

use ag_core::{Clock, ExecutionId, SystemClock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("invalid execution id for a workspace: {0:?}")]
    InvalidKey(String),
    #[error("failed to create workspace {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to delete workspace {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("workspace path {} exists but is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

/// Result of [`WorkspaceManager::release`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Released {
    Deleted(PathBuf),
    /// Nothing was there; releasing is idempotent.
    Absent(PathBuf),
}

/// Allocates and releases execution workspaces under a root directory.
#[derive(Debug, Clone)]
pub struct WorkspaceManager<C: Clock = SystemClock> {
    root: PathBuf,
    clock: C,
}

impl WorkspaceManager<SystemClock> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_clock(root, SystemClock)
    }
}

impl<C: Clock> WorkspaceManager<C> {
    pub fn with_clock(root: impl Into<PathBuf>, clock: C) -> Self {
        Self { root: root.into(), clock }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The execution id a request is keyed under, falling back to the
    /// current timestamp when the request carries none.
    pub fn key_for(&self, execution: Option<&ExecutionId>) -> ExecutionId {
        match execution {
            Some(id) => id.clone(),
            None => ExecutionId::from_timestamp(self.clock.epoch_ms()),
        }
    }

    /// Directory for `execution`, without touching the filesystem.
    pub fn path_for(&self, execution: &ExecutionId) -> Result<PathBuf, WorkspaceError> {
        if !execution.is_path_safe() {
            return Err(WorkspaceError::InvalidKey(execution.to_string()));
        }
        Ok(self.root.join(execution.as_str()))
    }

    /// Return the workspace for `execution`, creating it if needed.
    ///
    /// Idempotent: an existing directory is returned unchanged.
    pub async fn allocate(&self, execution: Option<&ExecutionId>) -> Result<PathBuf, WorkspaceError> {
        let key = self.key_for(execution);
        let path = self.path_for(&key)?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => {
                tracing::debug!(execution = %key, path = %path.display(), "reusing workspace");
                return Ok(path);
            }
            Ok(_) => return Err(WorkspaceError::NotADirectory(path)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(WorkspaceError::Create { path, source }),
        }

        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| WorkspaceError::Create { path: path.clone(), source })?;
        tracing::info!(execution = %key, path = %path.display(), "created workspace");
        Ok(path)
    }

    /// Recursively delete the workspace for `execution`.
    ///
    /// A missing directory is not an error.
    pub async fn release(&self, execution: &ExecutionId) -> Result<Released, WorkspaceError> {
        let path = self.path_for(execution)?;
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => {
                tracing::info!(%execution, path = %path.display(), "deleted workspace");
                Ok(Released::Deleted(path))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(%execution, path = %path.display(), "no workspace to delete");
                Ok(Released::Absent(path))
            }
            Err(source) => Err(WorkspaceError::Delete { path, source }),
        }
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
