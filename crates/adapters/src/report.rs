// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Report channel back to the platform.
//!
//! Every component that talks to the platform receives a [`Reporter`]
//! explicitly; nothing reaches for an ambient socket. Delivery is
//! fire-and-forget: a reporter never retries, and a closed channel is logged
//! rather than surfaced, since reliability belongs to the session layer.

use ag_core::{ReportEvent, RequestRef};
use ag_wire::Outbound;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Sink for one job's report events.
#[async_trait]
pub trait Reporter: Clone + Send + Sync + 'static {
    /// Deliver one event.
    async fn emit(&self, event: ReportEvent);

    /// Live output. Either side may be `None`.
    async fn progress(&self, stdout: Option<String>, stderr: Option<String>) {
        self.emit(ReportEvent::Progress { stdout, stderr }).await
    }

    /// Terminal success (or, for direct commands, terminal exit report).
    async fn result(&self, stdout: Option<String>, stderr: Option<String>) {
        self.emit(ReportEvent::Result { stdout, stderr }).await
    }

    /// Terminal failure.
    async fn exception(&self, message: String) {
        self.emit(ReportEvent::Exception { message }).await
    }
}

/// Reporter bound to one request, writing frames into the session's
/// outbound queue.
#[derive(Clone, Debug)]
pub struct ChannelReporter {
    tx: mpsc::Sender<Outbound>,
    topic: String,
    req: RequestRef,
}

impl ChannelReporter {
    pub fn new(tx: mpsc::Sender<Outbound>, topic: impl Into<String>, req: RequestRef) -> Self {
        Self { tx, topic: topic.into(), req }
    }
}

#[async_trait]
impl Reporter for ChannelReporter {
    async fn emit(&self, event: ReportEvent) {
        let kind = event.kind();
        let frame = Outbound::new(self.topic.clone(), self.req.clone(), event);
        if self.tx.send(frame).await.is_err() {
            tracing::warn!(
                topic = %self.topic,
                execution = ?self.req.execution,
                kind,
                "report dropped: session channel closed"
            );
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::Reporter;
    use ag_core::{ReportEvent, Stream};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Fake reporter that records every event in order
    #[derive(Clone, Default)]
    pub struct FakeReporter {
        events: Arc<Mutex<Vec<ReportEvent>>>,
    }

    impl FakeReporter {
        pub fn new() -> Self {
            Self::default()
        }

        /// All recorded events
        pub fn events(&self) -> Vec<ReportEvent> {
            self.events.lock().clone()
        }

        /// Progress chunks written to `stream`, in order
        pub fn chunks(&self, stream: Stream) -> Vec<String> {
            self.events
                .lock()
                .iter()
                .filter_map(|e| match (e, stream) {
                    (ReportEvent::Progress { stdout: Some(s), .. }, Stream::Stdout) => {
                        Some(s.clone())
                    }
                    (ReportEvent::Progress { stderr: Some(s), .. }, Stream::Stderr) => {
                        Some(s.clone())
                    }
                    _ => None,
                })
                .collect()
        }

        /// Concatenated output of `stream`
        pub fn text(&self, stream: Stream) -> String {
            self.chunks(stream).concat()
        }

        /// Terminal events (`result` / `exception`)
        pub fn terminals(&self) -> Vec<ReportEvent> {
            self.events.lock().iter().filter(|e| e.is_terminal()).cloned().collect()
        }

        /// The single terminal event, panicking if there is not exactly one
        pub fn terminal(&self) -> ReportEvent {
            let terminals = self.terminals();
            assert_eq!(terminals.len(), 1, "expected one terminal event, got {:?}", terminals);
            terminals[0].clone()
        }

        /// Message of the terminal exception, if that is how the job ended
        pub fn exception_message(&self) -> Option<String> {
            self.terminals().into_iter().find_map(|e| match e {
                ReportEvent::Exception { message } => Some(message),
                _ => None,
            })
        }
    }

    #[async_trait]
    impl Reporter for FakeReporter {
        async fn emit(&self, event: ReportEvent) {
            self.events.lock().push(event);
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeReporter;

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
