// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.
//!
//! Empty values count as unset. Flag and millisecond values that do not
//! parse are ignored.

use std::path::PathBuf;
use std::time::Duration;

/// Config file: AGENT_CONFIG > <config dir>/agentd/config.toml (if present)
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = var("AGENT_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("agentd").join("config.toml")).filter(|p| p.is_file())
}

/// WebSocket URL of the platform.
pub fn platform_url() -> Option<String> {
    var("AGENT_PLATFORM_URL")
}

/// Bearer token presented when connecting to the platform.
pub fn token() -> Option<String> {
    var("AGENT_TOKEN")
}

pub fn workspace_root() -> Option<PathBuf> {
    var("AGENT_WORKSPACE_ROOT").map(PathBuf::from)
}

pub fn shell() -> Option<String> {
    var("AGENT_SHELL")
}

/// `sequential` or `concurrent`; validated by the config layer.
pub fn dispatch() -> Option<String> {
    var("AGENT_DISPATCH")
}

/// Echo each command line as progress before running it.
pub fn echo_commands() -> Option<bool> {
    flag("AGENT_ECHO_COMMANDS")
}

pub fn command_timeout() -> Option<Duration> {
    millis("AGENT_COMMAND_TIMEOUT_MS")
}

/// Base URL of the GitHub REST API (GitHub Enterprise installs differ).
pub fn github_api() -> Option<String> {
    var("AGENT_GITHUB_API")
}

pub fn git_host() -> Option<String> {
    var("AGENT_GIT_HOST")
}

/// Directory for daily-rolling log files; stderr only when unset.
pub fn log_dir() -> Option<PathBuf> {
    var("AGENT_LOG_DIR").map(PathBuf::from)
}

/// Delay between a lost connection and the next connect attempt.
pub fn reconnect_delay() -> Option<Duration> {
    millis("AGENT_RECONNECT_MS")
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn flag(name: &str) -> Option<bool> {
    match var(name)?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn millis(name: &str) -> Option<Duration> {
    var(name).and_then(|s| s.trim().parse::<u64>().ok()).map(Duration::from_millis)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
