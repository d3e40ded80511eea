// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script execution specs

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn last_line_failure_is_the_exception() {
    let agent = Agent::new();
    let (dispatched, reporter) = agent.accept(&script_job("exec-1", "echo A\necho B\nexit 1")).await;

    let outcome = match dispatched {
        Dispatched::Ran(outcome) => outcome,
        other => panic!("not a script run: {other:?}"),
    };
    assert_eq!(outcome.dispatched, 3);
    assert_eq!(
        reporter.events(),
        vec![ReportEvent::chunk(Stream::Stdout, "A\n"), ReportEvent::chunk(Stream::Stdout, "B\n"), exception("EXIT CODE 1")]
    );
}

#[tokio::test]
async fn blank_script_spawns_nothing() {
    let agent = Agent::new();
    let (dispatched, reporter) = agent.accept(&script_job("exec-1", "\n  \n")).await;

    let outcome = match dispatched {
        Dispatched::Ran(outcome) => outcome,
        other => panic!("not a script run: {other:?}"),
    };
    assert_eq!(outcome.dispatched, 0);
    assert_eq!(reporter.events(), vec![result("Execution finished")]);
}

#[tokio::test]
async fn each_nonblank_line_is_one_process() {
    let agent = Agent::new();
    let script = "echo $$ >> pids\n\n   \necho $$ >> pids\n  echo $$ >> pids  \n";
    let (_, reporter) = agent.accept(&script_job("exec-1", script)).await;

    let pids = std::fs::read_to_string(agent.workspace("exec-1").join("pids")).unwrap();
    let mut unique: Vec<&str> = pids.lines().collect();
    unique.dedup();
    assert_eq!(unique.len(), 3);
    assert_eq!(reporter.terminals(), vec![result("Execution finished")]);
}

#[tokio::test]
async fn success_has_no_exception() {
    let agent = Agent::new();
    let (_, reporter) = agent.accept(&script_job("exec-1", "true\necho ok >&2\ntrue")).await;

    assert_eq!(reporter.exception_message(), None);
    assert_eq!(reporter.terminals().len(), 1);
    assert_eq!(reporter.text(Stream::Stderr), "ok\n");
}

#[tokio::test]
async fn stream_order_is_preserved() {
    let agent = Agent::new();
    let script = "for i in 1 2 3 4 5; do echo out$i; echo err$i >&2; done";
    let (_, reporter) = agent.accept(&script_job("exec-1", script)).await;

    assert_eq!(reporter.text(Stream::Stdout), "out1\nout2\nout3\nout4\nout5\n");
    assert_eq!(reporter.text(Stream::Stderr), "err1\nerr2\nerr3\nerr4\nerr5\n");
}

#[tokio::test]
async fn output_streams_before_the_command_exits() {
    let agent = Agent::new();
    let job = script_job("exec-1", "echo early; sleep 0.5; echo late");
    let reporter = FakeReporter::new();

    let running = {
        let reporter = reporter.clone();
        async move {
            tokio::time::sleep(std::time::Duration::from_millis(250)).await;
            reporter.text(Stream::Stdout)
        }
    };
    let (seen_midway, _) = tokio::join!(running, agent_dispatch(&agent, &job, &reporter));

    assert_eq!(seen_midway, "early\n");
    assert_eq!(reporter.text(Stream::Stdout), "early\nlate\n");
}

async fn agent_dispatch(agent: &Agent, job: &JobRequest, reporter: &FakeReporter) {
    agent.dispatch_with(job, reporter).await.unwrap();
}

#[tokio::test]
async fn workspace_persists_across_scripts() {
    let agent = Agent::new();
    agent.accept(&script_job("exec-1", "mkdir -p target && echo v1 > target/out")).await;
    let (_, reporter) = agent.accept(&script_job("exec-1", "cat target/out")).await;

    assert_eq!(reporter.text(Stream::Stdout), "v1\n");
}

#[tokio::test]
async fn concurrent_mode_starts_all_commands() {
    let agent = Agent::with_dispatch(DispatchMode::Concurrent);
    let script = "sleep 0.3; echo slow\necho fast";
    let (_, reporter) = agent.accept(&script_job("exec-1", script)).await;

    assert_eq!(reporter.chunks(Stream::Stdout), vec!["fast\n", "slow\n"]);
    assert_eq!(reporter.terminals(), vec![result("Execution finished")]);
}

#[tokio::test]
async fn concurrent_failure_is_reported_once() {
    let agent = Agent::with_dispatch(DispatchMode::Concurrent);
    let (_, reporter) = agent.accept(&script_job("exec-1", "exit 7\nexit 7\nexit 7")).await;

    assert_eq!(reporter.terminals(), vec![exception("EXIT CODE 7")]);
}
