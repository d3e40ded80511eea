// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ag_core::{ReportEvent, RequestRef};
use serde::{Deserialize, Serialize};

/// A report event addressed to the request that produced it.
///
/// Serialized flat: `{"type": .., "topic": .., "req": {..}, "data": {..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outbound {
    pub topic: String,
    pub req: RequestRef,
    #[serde(flatten)]
    pub event: ReportEvent,
}

impl Outbound {
    pub fn new(topic: impl Into<String>, req: RequestRef, event: ReportEvent) -> Self {
        Self { topic: topic.into(), req, event }
    }
}
