// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for the specs.

pub use ag_adapters::{FakeGitAdapter, FakeReporter, FakeTokenExchange, GitCall};
pub use ag_core::test_support::{command_job, finished_job, script_job, sync_job};
pub use ag_core::{JobRequest, ReportEvent, Stream, SystemClock, Topic};
pub use ag_engine::{
    DispatchError, DispatchMode, Dispatched, Dispatcher, DispatcherConfig, Released, RunnerConfig,
};
pub use similar_asserts::assert_eq;
pub use std::path::{Path, PathBuf};

/// An agent with its own workspace root.
pub struct Agent {
    root: tempfile::TempDir,
    pub tokens: FakeTokenExchange,
    pub git: FakeGitAdapter,
    dispatcher: Dispatcher<FakeTokenExchange, FakeGitAdapter, SystemClock>,
}

impl Agent {
    pub fn new() -> Self {
        Self::build(RunnerConfig::default(), FakeTokenExchange::granting("ghs_spec_token"))
    }

    pub fn with_dispatch(dispatch: DispatchMode) -> Self {
        Self::build(RunnerConfig { dispatch, ..Default::default() }, FakeTokenExchange::granting("ghs_spec_token"))
    }

    pub fn with_tokens(tokens: FakeTokenExchange) -> Self {
        Self::build(RunnerConfig::default(), tokens)
    }

    fn build(runner: RunnerConfig, tokens: FakeTokenExchange) -> Self {
        let root = tempfile::tempdir().unwrap();
        let git = FakeGitAdapter::new();
        let config = DispatcherConfig { workspace_root: root.path().to_path_buf(), runner, ..Default::default() };
        let dispatcher = Dispatcher::new(config, tokens.clone(), git.clone(), SystemClock);
        Self { root, tokens, git, dispatcher }
    }

    /// Dispatch `job` with a fresh reporter.
    pub async fn run(&self, job: &JobRequest) -> (Result<Dispatched, DispatchError>, FakeReporter) {
        let reporter = FakeReporter::new();
        let result = self.dispatch_with(job, &reporter).await;
        (result, reporter)
    }

    /// Dispatch `job` reporting to `reporter`.
    pub async fn dispatch_with(
        &self,
        job: &JobRequest,
        reporter: &FakeReporter,
    ) -> Result<Dispatched, DispatchError> {
        self.dispatcher.dispatch(job, reporter).await
    }

    /// Dispatch `job`, expecting it to be accepted.
    pub async fn accept(&self, job: &JobRequest) -> (Dispatched, FakeReporter) {
        let (result, reporter) = self.run(job).await;
        match result {
            Ok(dispatched) => (dispatched, reporter),
            Err(e) => panic!("job rejected: {e}"),
        }
    }

    pub fn workspace(&self, execution: &str) -> PathBuf {
        self.root.path().join(execution)
    }

    /// Names of everything directly under the workspace root.
    pub fn root_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.root.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub fn result(stdout: &str) -> ReportEvent {
    ReportEvent::Result { stdout: Some(stdout.to_string()), stderr: None }
}

pub fn exception(message: &str) -> ReportEvent {
    ReportEvent::Exception { message: message.to_string() }
}
