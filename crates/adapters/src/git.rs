// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git operations for repository sync.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::credential::AccessToken;
use crate::subprocess::{run_with_timeout, SubprocessError, GIT_CHECKOUT_TIMEOUT, GIT_CLONE_TIMEOUT};

/// Default host repositories are cloned from.
pub const GITHUB_HOST: &str = "github.com";

const REDACTED: &str = "<redacted>";

#[derive(Debug, Error)]
pub enum GitError {
    #[error(transparent)]
    Subprocess(#[from] SubprocessError),
    #[error("git {op} failed: {message}")]
    Failed { op: &'static str, message: String },
    #[error("refusing to check out {0:?}: not a commit reference")]
    InvalidRef(String),
}

/// A clone URL that may embed an access token.
///
/// `Display` and `Debug` never show the token; only [`CloneUrl::expose_secret`]
/// does, and that is handed straight to git.
#[derive(Clone, PartialEq, Eq)]
pub struct CloneUrl {
    url: String,
    token: Option<String>,
}

impl CloneUrl {
    /// `https://x-access-token:<token>@<host>/<repo>`
    pub fn with_token(host: &str, repo: &str, token: &AccessToken) -> Self {
        let token = token.expose_secret().to_string();
        Self { url: format!("https://x-access-token:{}@{}/{}", token, host, repo), token: Some(token) }
    }

    /// A URL without credentials (public repositories, local paths).
    pub fn plain(url: impl Into<String>) -> Self {
        Self { url: url.into(), token: None }
    }

    pub fn expose_secret(&self) -> &str {
        &self.url
    }

    /// Scrub the token from text that may echo the URL (git error output).
    pub fn redact(&self, text: &str) -> String {
        match &self.token {
            Some(token) if !token.is_empty() => text.replace(token.as_str(), REDACTED),
            _ => text.to_string(),
        }
    }
}

impl fmt::Display for CloneUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redact(&self.url))
    }
}

impl fmt::Debug for CloneUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CloneUrl({})", self)
    }
}

/// Clone and checkout, the two steps of a repository sync.
#[async_trait]
pub trait GitAdapter: Clone + Send + Sync + 'static {
    /// Clone `url` into `dest` (which may exist but must be empty).
    async fn clone_repo(&self, url: &CloneUrl, dest: &Path) -> Result<(), GitError>;

    /// Check out `commit` in the working tree at `repo`.
    async fn checkout(&self, repo: &Path, commit: &str) -> Result<(), GitError>;
}

/// Git adapter that shells out to the `git` binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct GitCli;

impl GitCli {
    fn command() -> Command {
        let mut cmd = Command::new("git");
        cmd.env("GIT_TERMINAL_PROMPT", "0").env_remove("GIT_DIR").env_remove("GIT_WORK_TREE");
        cmd
    }
}

#[async_trait]
impl GitAdapter for GitCli {
    async fn clone_repo(&self, url: &CloneUrl, dest: &Path) -> Result<(), GitError> {
        let mut cmd = Self::command();
        cmd.arg("clone").arg("--quiet").arg(url.expose_secret()).arg(dest);

        let output = run_with_timeout(cmd, GIT_CLONE_TIMEOUT, "git clone").await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::Failed { op: "clone", message: url.redact(stderr.trim()) });
        }
        Ok(())
    }

    async fn checkout(&self, repo: &Path, commit: &str) -> Result<(), GitError> {
        if commit.is_empty() || commit.starts_with('-') {
            return Err(GitError::InvalidRef(commit.to_string()));
        }

        let mut cmd = Self::command();
        cmd.arg("-C").arg(repo).args(["checkout", "--quiet", commit]);

        let output = run_with_timeout(cmd, GIT_CHECKOUT_TIMEOUT, "git checkout").await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::Failed { op: "checkout", message: stderr.trim().to_string() });
        }
        Ok(())
    }
}

/// Recorded git call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    /// Clone with the (unredacted) URL, so tests can check token placement
    Clone { url: String, dest: PathBuf },
    Checkout { repo: PathBuf, commit: String },
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{CloneUrl, GitAdapter, GitCall, GitError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::path::Path;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeGitState {
        calls: Vec<GitCall>,
        fail_clone: Option<String>,
        fail_checkout: Option<String>,
    }

    /// Fake git adapter for testing
    #[derive(Clone, Default)]
    pub struct FakeGitAdapter {
        inner: Arc<Mutex<FakeGitState>>,
    }

    impl FakeGitAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every clone fail with `message`
        pub fn fail_clone(self, message: &str) -> Self {
            self.inner.lock().fail_clone = Some(message.to_string());
            self
        }

        /// Make every checkout fail with `message`
        pub fn fail_checkout(self, message: &str) -> Self {
            self.inner.lock().fail_checkout = Some(message.to_string());
            self
        }

        pub fn calls(&self) -> Vec<GitCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl GitAdapter for FakeGitAdapter {
        async fn clone_repo(&self, url: &CloneUrl, dest: &Path) -> Result<(), GitError> {
            let mut inner = self.inner.lock();
            inner.calls.push(GitCall::Clone {
                url: url.expose_secret().to_string(),
                dest: dest.to_path_buf(),
            });
            match &inner.fail_clone {
                Some(message) => Err(GitError::Failed { op: "clone", message: message.clone() }),
                None => Ok(()),
            }
        }

        async fn checkout(&self, repo: &Path, commit: &str) -> Result<(), GitError> {
            let mut inner = self.inner.lock();
            inner.calls.push(GitCall::Checkout {
                repo: repo.to_path_buf(),
                commit: commit.to_string(),
            });
            match &inner.fail_checkout {
                Some(message) => Err(GitError::Failed { op: "checkout", message: message.clone() }),
                None => Ok(()),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeGitAdapter;

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
