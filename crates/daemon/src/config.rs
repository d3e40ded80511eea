// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: an optional TOML file, then environment overrides.
//!
//! ```toml
//! platform_url = "wss://platform.example/agent"
//! token = "..."
//! workspace_root = "/var/tmp/agentd"
//! shell = "bash"
//! dispatch = "sequential"      # or "concurrent"
//! echo_commands = false
//! command_timeout_ms = 3600000
//! github_api = "https://api.github.com"
//! git_host = "github.com"
//! log_dir = "/var/log/agentd"
//! reconnect_ms = 5000
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ag_adapters::credential::GITHUB_API;
use ag_adapters::git::GITHUB_HOST;
use ag_engine::{DispatchMode, DispatcherConfig, RunnerConfig, UnknownDispatchMode};
use serde::Deserialize;
use thiserror::Error;

use crate::env;

const DEFAULT_RECONNECT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no platform URL configured (set AGENT_PLATFORM_URL or `platform_url`)")]
    MissingPlatformUrl,
    #[error("AGENT_DISPATCH: {0}")]
    Dispatch(#[from] UnknownDispatchMode),
}

/// The config file as written; everything optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub platform_url: Option<String>,
    pub token: Option<String>,
    pub workspace_root: Option<PathBuf>,
    pub shell: Option<String>,
    pub dispatch: Option<DispatchMode>,
    pub echo_commands: Option<bool>,
    pub command_timeout_ms: Option<u64>,
    pub github_api: Option<String>,
    pub git_host: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub reconnect_ms: Option<u64>,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Fill in whatever the environment sets, env taking precedence.
    pub fn with_env(mut self) -> Result<Self, ConfigError> {
        fn over<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        over(&mut self.platform_url, env::platform_url());
        over(&mut self.token, env::token());
        over(&mut self.workspace_root, env::workspace_root());
        over(&mut self.shell, env::shell());
        over(&mut self.dispatch, env::dispatch().map(|raw| raw.parse::<DispatchMode>()).transpose()?);
        over(&mut self.echo_commands, env::echo_commands());
        over(&mut self.command_timeout_ms, env::command_timeout().map(|d| d.as_millis() as u64));
        over(&mut self.github_api, env::github_api());
        over(&mut self.git_host, env::git_host());
        over(&mut self.log_dir, env::log_dir());
        over(&mut self.reconnect_ms, env::reconnect_delay().map(|d| d.as_millis() as u64));
        Ok(self)
    }
}

/// Resolved daemon configuration.
#[derive(Clone, PartialEq)]
pub struct Config {
    pub platform_url: String,
    pub token: Option<String>,
    pub workspace_root: PathBuf,
    pub runner: RunnerConfig,
    pub github_api: String,
    pub git_host: String,
    pub log_dir: Option<PathBuf>,
    pub reconnect_delay: Duration,
}

impl Config {
    /// Load from the config file (if any) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match env::config_path() {
            Some(path) => FileConfig::read(&path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file.with_env()?)
    }

    /// Apply defaults. The platform URL has none.
    pub fn resolve(file: FileConfig) -> Result<Self, ConfigError> {
        let platform_url = file.platform_url.ok_or(ConfigError::MissingPlatformUrl)?;
        let defaults = RunnerConfig::default();

        Ok(Self {
            platform_url,
            token: file.token,
            workspace_root: file.workspace_root.unwrap_or_else(std::env::temp_dir),
            runner: RunnerConfig {
                shell: file.shell.unwrap_or(defaults.shell),
                dispatch: file.dispatch.unwrap_or(defaults.dispatch),
                echo_commands: file.echo_commands.unwrap_or(defaults.echo_commands),
                command_timeout: file.command_timeout_ms.map(Duration::from_millis),
            },
            github_api: file.github_api.unwrap_or_else(|| GITHUB_API.to_string()),
            git_host: file.git_host.unwrap_or_else(|| GITHUB_HOST.to_string()),
            log_dir: file.log_dir,
            reconnect_delay: file.reconnect_ms.map(Duration::from_millis).unwrap_or(DEFAULT_RECONNECT),
        })
    }

    pub fn dispatcher(&self) -> DispatcherConfig {
        DispatcherConfig {
            workspace_root: self.workspace_root.clone(),
            git_host: self.git_host.clone(),
            runner: self.runner.clone(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("platform_url", &self.platform_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("workspace_root", &self.workspace_root)
            .field("runner", &self.runner)
            .field("github_api", &self.github_api)
            .field("git_host", &self.git_host)
            .field("log_dir", &self.log_dir)
            .field("reconnect_delay", &self.reconnect_delay)
            .finish()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
