// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace lifecycle specs

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn finished_unknown_execution_is_silent() {
    let agent = Agent::new();
    let (result, reporter) = agent.run(&finished_job("never-seen")).await;

    assert!(matches!(result, Ok(Dispatched::Released(Released::Absent(_)))), "{result:?}");
    assert!(reporter.events().is_empty(), "{:?}", reporter.events());
}

#[tokio::test]
async fn sync_script_finish() {
    let agent = Agent::new();
    agent.accept(&sync_job(Topic::Push, "exec-1", "octo/widgets", "abc")).await;
    agent.accept(&script_job("exec-1", "echo artifact > build.out")).await;
    assert!(agent.workspace("exec-1").join("build.out").is_file());

    let (dispatched, reporter) = agent.accept(&finished_job("exec-1")).await;
    assert!(matches!(dispatched, Dispatched::Released(Released::Deleted(_))));
    assert!(!agent.workspace("exec-1").exists());
    assert!(reporter.events().is_empty(), "{:?}", reporter.events());
}

#[tokio::test]
async fn executions_do_not_share_workspaces() {
    let agent = Agent::new();
    agent.accept(&script_job("exec-a", "touch only-a")).await;
    let (_, reporter) = agent.accept(&script_job("exec-b", "ls")).await;

    assert_eq!(reporter.text(Stream::Stdout), "");
    assert_eq!(agent.root_entries(), vec!["exec-a".to_string(), "exec-b".to_string()]);
}

#[tokio::test]
async fn unknown_topic_is_rejected_without_events() {
    let agent = Agent::new();
    let job = JobRequest { topic: "release".into(), ..Default::default() };
    let (result, reporter) = agent.run(&job).await;

    assert!(matches!(result, Err(DispatchError::UnknownTopic(_))), "{result:?}");
    assert!(reporter.events().is_empty(), "{:?}", reporter.events());
}

#[tokio::test]
async fn path_escaping_execution_is_rejected() {
    let agent = Agent::new();
    let (result, reporter) = agent.run(&script_job("../outside", "touch escaped")).await;

    assert!(matches!(result, Err(DispatchError::Workspace(_))), "{result:?}");
    assert!(reporter.events().is_empty(), "{:?}", reporter.events());
    assert!(!Path::new(&agent.workspace("..")).join("outside").exists());
}
