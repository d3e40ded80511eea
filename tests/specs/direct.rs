// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Direct command specs

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn zero_exit_is_reported_on_stdout() {
    let agent = Agent::new();
    let (_, reporter) = agent.accept(&command_job("echo direct")).await;

    assert_eq!(
        reporter.events(),
        vec![ReportEvent::chunk(Stream::Stdout, "direct\n"), result("EXIT CODE 0")]
    );
}

#[tokio::test]
async fn nonzero_exit_is_a_result_not_an_exception() {
    let agent = Agent::new();
    let (_, reporter) = agent.accept(&command_job("sh -c exit")).await;
    assert_eq!(reporter.terminals(), vec![result("EXIT CODE 0")]);

    let (_, reporter) = agent.accept(&command_job("ls /definitely/not/here")).await;
    let terminals = reporter.terminals();
    assert_eq!(terminals.len(), 1);
    assert!(
        matches!(&terminals[0], ReportEvent::Result { stdout: None, stderr: Some(s) } if s.starts_with("EXIT CODE ") && s != "EXIT CODE 0"),
        "{terminals:?}"
    );
}

#[tokio::test]
async fn unknown_program_is_an_exception() {
    let agent = Agent::new();
    let (_, reporter) = agent.accept(&command_job("no-such-program-anywhere")).await;

    assert_eq!(reporter.terminals().len(), 1);
    assert!(reporter.exception_message().is_some());
}

#[tokio::test]
async fn direct_commands_leave_no_workspace() {
    let agent = Agent::new();
    agent.accept(&command_job("true")).await;
    assert_eq!(agent.root_entries(), Vec::<String>::new());
}
