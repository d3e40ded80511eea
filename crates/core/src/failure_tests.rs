// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::Command;

fn command(line: &str) -> Command {
    Command { index: 2, line: line.to_string() }
}

#[yare::parameterized(
    exited   = { FailureKind::Exited { code: 1 }, "EXIT CODE 1" },
    exited_2 = { FailureKind::Exited { code: 127 }, "EXIT CODE 127" },
    signaled = { FailureKind::Signaled { signal: 9 }, "KILLED BY SIGNAL 9" },
    spawn    = { FailureKind::SpawnFailed { message: "No such file or directory (os error 2)".into() }, "No such file or directory (os error 2)" },
    timeout  = { FailureKind::TimedOut { after_ms: 1500 }, "TIMED OUT AFTER 1500ms" },
)]
fn platform_message(kind: FailureKind, expected: &str) {
    assert_eq!(CommandFailure::new(&command("x"), kind).message(), expected);
}

#[test]
fn display_includes_command_text() {
    let failure = CommandFailure::new(&command("exit 3"), FailureKind::Exited { code: 3 });
    assert_eq!(failure.to_string(), "command #2 `exit 3` failed: EXIT CODE 3");
}

#[test]
fn exit_code_only_for_exits() {
    let exited = CommandFailure::new(&command("false"), FailureKind::Exited { code: 1 });
    let killed = CommandFailure::new(&command("sleep 9"), FailureKind::Signaled { signal: 15 });
    assert_eq!(exited.exit_code(), Some(1));
    assert_eq!(killed.exit_code(), None);
}

#[test]
fn empty_stderr_tail_is_dropped() {
    let failure = CommandFailure::new(&command("false"), FailureKind::Exited { code: 1 })
        .with_stderr_tail(Some(String::new()));
    assert_eq!(failure.stderr_tail, None);

    let failure = failure.with_stderr_tail(Some("boom\n".to_string()));
    assert_eq!(failure.stderr_tail.as_deref(), Some("boom\n"));
}
