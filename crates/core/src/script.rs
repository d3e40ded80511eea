// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script parsing: one command per non-blank line.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One shell invocation derived from a single non-blank script line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Position among the script's commands (blank lines not counted).
    pub index: usize,
    /// The line, trimmed of surrounding whitespace. Never empty.
    pub line: String,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} `{}`", self.index, self.line)
    }
}

/// Split a script into commands.
///
/// Lines are split on `\n`, trimmed (which also drops a trailing `\r`), and
/// blank lines are discarded before indices are assigned.
pub fn parse(script: &str) -> Vec<Command> {
    script
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, line)| Command { index, line: line.to_string() })
        .collect()
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
