// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script execution.
//!
//! A script is split into commands (one per non-blank line), each run as
//! `<shell> -c <line>` in the execution's workspace. Output is streamed as
//! progress while the command runs. The first failing command decides the
//! job's outcome; commands that have not started by then never start.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ag_adapters::Reporter;
use ag_core::{Clock, Command, CommandFailure, ExecutionId, FailureKind, JobRequest, Stream, SystemClock};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Child;

use crate::stream::drain;
use crate::workspace::{WorkspaceError, WorkspaceManager};

/// `stdout` of the terminal result when every command exited 0.
pub const EXECUTION_FINISHED: &str = "Execution finished";

/// How the commands of one script are started relative to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Start each command once its predecessor exited 0.
    #[default]
    Sequential,
    /// Start every command immediately; they share the workspace.
    Concurrent,
}

ag_core::simple_display! {
    DispatchMode {
        Sequential => "sequential",
        Concurrent => "concurrent",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dispatch mode {0:?} (expected `sequential` or `concurrent`)")]
pub struct UnknownDispatchMode(pub String);

impl FromStr for DispatchMode {
    type Err = UnknownDispatchMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(DispatchMode::Sequential),
            "concurrent" => Ok(DispatchMode::Concurrent),
            _ => Err(UnknownDispatchMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Interpreter invoked as `<shell> -c <line>`.
    pub shell: String,
    pub dispatch: DispatchMode,
    /// Emit `$ <line>` as stdout progress before each command starts.
    pub echo_commands: bool,
    /// Kill and fail a command that runs longer than this.
    pub command_timeout: Option<Duration>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            dispatch: DispatchMode::default(),
            echo_commands: false,
            command_timeout: None,
        }
    }
}

/// Summary of one script run. The terminal event has already been emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub execution: ExecutionId,
    pub workspace: PathBuf,
    /// Commands whose process was started (or attempted).
    pub dispatched: usize,
    pub succeeded: usize,
    /// Commands skipped because an earlier one had already failed.
    pub abandoned: usize,
    /// The first recorded failure.
    pub failure: Option<CommandFailure>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Failure state shared by every command of one run.
///
/// The flag is checked before each spawn; the slot keeps the first failure
/// only, later ones are logged and dropped.
#[derive(Debug, Default)]
struct FailureState {
    failed: AtomicBool,
    first: Mutex<Option<CommandFailure>>,
}

impl FailureState {
    fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    fn record(&self, failure: CommandFailure) {
        let mut first = self.first.lock();
        if first.is_none() {
            *first = Some(failure);
        } else {
            tracing::debug!(%failure, "additional command failure");
        }
        self.failed.store(true, Ordering::Release);
    }

    fn take(&self) -> Option<CommandFailure> {
        self.first.lock().take()
    }
}

enum Finished {
    Succeeded,
    Failed,
    Abandoned,
}

/// Runs script jobs inside their execution's workspace.
#[derive(Debug, Clone)]
pub struct CommandRunner<C: Clock = SystemClock> {
    workspaces: WorkspaceManager<C>,
    config: Arc<RunnerConfig>,
}

impl<C: Clock> CommandRunner<C> {
    pub fn new(workspaces: WorkspaceManager<C>, config: RunnerConfig) -> Self {
        Self { workspaces, config: Arc::new(config) }
    }

    /// Run the job's script and emit its terminal event.
    ///
    /// A workspace that cannot be allocated is returned as an error with no
    /// event emitted.
    pub async fn run<R: Reporter>(
        &self,
        job: &JobRequest,
        reporter: &R,
    ) -> Result<RunOutcome, WorkspaceError> {
        let execution = self.workspaces.key_for(job.execution.as_ref());
        let workspace = self.workspaces.allocate(Some(&execution)).await?;
        let commands = job.commands();

        tracing::info!(
            %execution,
            commands = commands.len(),
            mode = %self.config.dispatch,
            path = %workspace.display(),
            "running script"
        );

        let outcome = self.run_commands(execution, workspace, commands, reporter).await;
        match &outcome.failure {
            None => {
                tracing::info!(execution = %outcome.execution, dispatched = outcome.dispatched, "script finished");
                reporter.result(Some(EXECUTION_FINISHED.to_string()), None).await;
            }
            Some(failure) => {
                tracing::warn!(
                    execution = %outcome.execution,
                    dispatched = outcome.dispatched,
                    abandoned = outcome.abandoned,
                    exit_code = ?failure.exit_code(),
                    %failure,
                    "script failed"
                );
                reporter.exception(failure.message()).await;
            }
        }
        Ok(outcome)
    }

    async fn run_commands<R: Reporter>(
        &self,
        execution: ExecutionId,
        workspace: PathBuf,
        commands: Vec<Command>,
        reporter: &R,
    ) -> RunOutcome {
        let failures = Arc::new(FailureState::default());
        let task = CommandTask {
            execution: execution.clone(),
            cwd: Arc::from(workspace.as_path()),
            config: Arc::clone(&self.config),
            failures: Arc::clone(&failures),
            reporter: reporter.clone(),
            clock: self.workspaces.clock().clone(),
        };

        let mut finished = Vec::with_capacity(commands.len());
        match self.config.dispatch {
            DispatchMode::Sequential => {
                for command in commands {
                    finished.push(task.execute(command).await);
                }
            }
            DispatchMode::Concurrent => {
                let handles: Vec<_> = commands
                    .into_iter()
                    .map(|command| {
                        let task = task.clone();
                        (command.clone(), tokio::spawn(async move { task.execute(command).await }))
                    })
                    .collect();
                for (command, handle) in handles {
                    match handle.await {
                        Ok(done) => finished.push(done),
                        Err(e) => {
                            tracing::error!(%execution, index = command.index, error = %e, "command task died");
                            let kind = FailureKind::SpawnFailed { message: format!("command task died: {e}") };
                            failures.record(CommandFailure::new(&command, kind));
                            finished.push(Finished::Failed);
                        }
                    }
                }
            }
        }

        let mut outcome = RunOutcome {
            execution,
            workspace,
            dispatched: 0,
            succeeded: 0,
            abandoned: 0,
            failure: failures.take(),
        };
        for done in finished {
            match done {
                Finished::Succeeded => {
                    outcome.dispatched += 1;
                    outcome.succeeded += 1;
                }
                Finished::Failed => outcome.dispatched += 1,
                Finished::Abandoned => outcome.abandoned += 1,
            }
        }
        outcome
    }
}

/// Everything one command needs, cloneable into a spawned task.
#[derive(Clone)]
struct CommandTask<R, C> {
    execution: ExecutionId,
    cwd: Arc<Path>,
    config: Arc<RunnerConfig>,
    failures: Arc<FailureState>,
    reporter: R,
    clock: C,
}

impl<R: Reporter, C: Clock> CommandTask<R, C> {
    async fn execute(&self, command: Command) -> Finished {
        if self.failures.is_failed() {
            tracing::debug!(execution = %self.execution, index = command.index, "abandoned after earlier failure");
            return Finished::Abandoned;
        }

        if self.config.echo_commands {
            self.reporter.progress(Some(format!("$ {}\n", command.line)), None).await;
        }

        tracing::info!(
            execution = %self.execution,
            index = command.index,
            command = %command.line,
            "dispatching command"
        );
        let started = self.clock.now();
        let result = self.spawn_and_wait(&command).await;
        let elapsed_ms = self.clock.now().saturating_duration_since(started).as_millis() as u64;

        match result {
            Ok(()) => {
                tracing::info!(execution = %self.execution, index = command.index, exit_code = 0, elapsed_ms, "command exited");
                Finished::Succeeded
            }
            Err(failure) => {
                tracing::warn!(
                    execution = %self.execution,
                    index = command.index,
                    exit_code = ?failure.exit_code(),
                    elapsed_ms,
                    kind = %failure.kind,
                    "command failed"
                );
                self.failures.record(failure);
                Finished::Failed
            }
        }
    }

    async fn spawn_and_wait(&self, command: &Command) -> Result<(), CommandFailure> {
        let mut cmd = tokio::process::Command::new(&self.config.shell);
        cmd.arg("-c")
            .arg(&command.line)
            .current_dir(&*self.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|e| {
            let message = format!("failed to spawn {}: {}", self.config.shell, e);
            CommandFailure::new(command, FailureKind::SpawnFailed { message })
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (status, _, stderr) = tokio::join!(
            wait_for(&mut child, self.config.command_timeout),
            drain(stdout, Stream::Stdout, &self.reporter),
            drain(stderr, Stream::Stderr, &self.reporter),
        );

        status
            .and_then(exit_failure)
            .map_err(|kind| CommandFailure::new(command, kind).with_stderr_tail(Some(stderr.tail)))
    }
}

/// Wait for `child`, killing it and its process group once `limit` has
/// passed.
///
/// The group kill reaches processes the shell started, which would otherwise
/// hold the output pipes open past the limit.
pub(crate) async fn wait_for(child: &mut Child, limit: Option<Duration>) -> Result<ExitStatus, FailureKind> {
    let Some(limit) = limit else {
        return child.wait().await.map_err(wait_error);
    };
    match tokio::time::timeout(limit, child.wait()).await {
        Ok(status) => status.map_err(wait_error),
        Err(_) => {
            #[cfg(unix)]
            kill_group(child);
            if let Err(e) = child.kill().await {
                tracing::warn!(error = %e, "failed to kill timed-out command");
            }
            Err(FailureKind::TimedOut { after_ms: limit.as_millis() as u64 })
        }
    }
}

/// SIGKILL the process group led by `child`.
#[cfg(unix)]
fn kill_group(child: &Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        tracing::warn!(pid, error = %e, "failed to kill timed-out process group");
    }
}

fn wait_error(e: std::io::Error) -> FailureKind {
    FailureKind::SpawnFailed { message: format!("failed to wait for command: {e}") }
}

/// `Ok` for a zero exit, otherwise why the process did not succeed.
pub(crate) fn exit_failure(status: ExitStatus) -> Result<(), FailureKind> {
    if status.success() {
        return Ok(());
    }
    if let Some(code) = status.code() {
        return Err(FailureKind::Exited { code });
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(FailureKind::Signaled { signal });
        }
    }
    Err(FailureKind::Exited { code: -1 })
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dispatched, {} succeeded, {} abandoned", self.dispatched, self.succeeded, self.abandoned)?;
        if let Some(failure) = &self.failure {
            write!(f, " ({failure})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
