// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job requests as delivered by the platform.
//!
//! A request is one unit of work: a repository sync, a direct command, a
//! script, or a teardown signal. Which one is decided by `topic`; the other
//! fields are optional because each topic only needs a subset of them.

use crate::report::RequestRef;
use crate::topic::{Topic, UnknownTopic};
use crate::ExecutionId;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One platform-initiated unit of work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub topic: String,
    #[serde(default)]
    pub execution: Option<ExecutionId>,
    /// Single command line (direct-command topic only).
    #[serde(default)]
    pub command: Option<String>,
    /// Multi-line script (script topic only).
    #[serde(default)]
    pub cmd: Option<String>,
    /// Opaque step label, echoed back in every report.
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub trigger_service: Option<TriggerService>,
    #[serde(default)]
    pub webhook: Option<Webhook>,
}

impl JobRequest {
    pub fn topic(&self) -> Result<Topic, UnknownTopic> {
        self.topic.parse()
    }

    /// The addressing half of the request that reports carry back.
    ///
    /// Never includes trigger-service credentials or the webhook body.
    pub fn request_ref(&self) -> RequestRef {
        RequestRef { execution: self.execution.clone(), current_step: self.current_step.clone() }
    }

    /// Script lines as commands, blank lines dropped.
    pub fn commands(&self) -> Vec<crate::Command> {
        self.cmd.as_deref().map(crate::script::parse).unwrap_or_default()
    }
}

/// The source-control service that triggered the execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerService {
    #[serde(default)]
    pub config: TriggerServiceConfig,
}

/// GitHub App credentials stored on the platform for a trigger service.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerServiceConfig {
    /// OAuth client secret of the app.
    #[serde(default)]
    pub secret: String,
    /// PEM-encoded RSA private key of the app.
    #[serde(default)]
    pub pem: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub app_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub client_id: String,
}

impl fmt::Debug for TriggerServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerServiceConfig")
            .field("secret", &"<redacted>")
            .field("pem", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// The subset of a GitHub webhook payload the agent reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub installation: Option<Installation>,
    #[serde(default)]
    pub head_commit: Option<HeadCommit>,
    #[serde(default)]
    pub pull_request: Option<PullRequest>,
    #[serde(default)]
    pub check_suite: Option<CheckSuite>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installation {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadCommit {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub head: PullRequestHead,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestHead {
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSuite {
    pub head_sha: String,
}

impl Webhook {
    pub fn repository_name(&self) -> Option<&str> {
        self.repository.as_ref().map(|r| r.full_name.as_str())
    }

    pub fn installation_id(&self) -> Option<u64> {
        self.installation.as_ref().map(|i| i.id)
    }

    /// The commit a sync for `topic` should check out.
    pub fn target_commit(&self, topic: Topic) -> Option<&str> {
        match topic {
            Topic::Push => self.head_commit.as_ref().map(|c| c.id.as_str()),
            Topic::PullRequest => self.pull_request.as_ref().map(|pr| pr.head.sha.as_str()),
            Topic::CheckSuite => self.check_suite.as_ref().map(|cs| cs.head_sha.as_str()),
            Topic::Command | Topic::Script | Topic::ExecutionFinished => None,
        }
    }
}

/// `appId` arrives as a JSON number or string; either id may be null.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Str(s)) => s,
        Some(Raw::Num(n)) => n.to_string(),
        None => String::new(),
    })
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
