// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ag_adapters::FakeReporter;
use ag_core::ReportEvent;

#[tokio::test]
async fn zero_exit_reports_on_stdout() {
    let reporter = FakeReporter::new();
    let outcome = DirectCommand::new().run("echo hello world", &reporter).await;

    assert_eq!(outcome, DirectOutcome::Exited(0));
    assert_eq!(reporter.text(Stream::Stdout), "hello world\n");
    assert_eq!(
        reporter.terminal(),
        ReportEvent::Result { stdout: Some("EXIT CODE 0".into()), stderr: None }
    );
}

#[tokio::test]
async fn nonzero_exit_reports_on_stderr() {
    let reporter = FakeReporter::new();
    let outcome = DirectCommand::new().run("false", &reporter).await;

    assert_eq!(outcome, DirectOutcome::Exited(1));
    assert_eq!(
        reporter.terminal(),
        ReportEvent::Result { stdout: None, stderr: Some("EXIT CODE 1".into()) }
    );
}

#[tokio::test]
async fn arguments_are_not_shell_expanded() {
    let reporter = FakeReporter::new();
    DirectCommand::new().run("echo $HOME *", &reporter).await;
    assert_eq!(reporter.text(Stream::Stdout), "$HOME *\n");
}

#[tokio::test]
async fn runs_in_configured_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker"), "").unwrap();
    let reporter = FakeReporter::new();

    DirectCommand::in_dir(dir.path()).run("ls", &reporter).await;
    assert_eq!(reporter.text(Stream::Stdout), "marker\n");
}

#[yare::parameterized(
    missing_program = { "definitely-not-a-real-program-xyz --flag" },
    empty           = { "   " },
)]
fn unstartable_command_is_an_exception(command: &str) {
    tokio::runtime::Runtime::new().unwrap().block_on(async {
        let reporter = FakeReporter::new();
        let outcome = DirectCommand::new().run(command, &reporter).await;

        assert!(matches!(outcome, DirectOutcome::SpawnFailed(_)), "{outcome:?}");
        assert_eq!(reporter.events().len(), 1);
        assert!(reporter.exception_message().is_some());
    });
}
