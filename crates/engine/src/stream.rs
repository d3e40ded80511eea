// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child output pumped into progress events as it is read.

use ag_adapters::Reporter;
use ag_core::{ReportEvent, Stream};
use tokio::io::{AsyncRead, AsyncReadExt};

const READ_BUF_LEN: usize = 8 * 1024;

/// How much trailing stderr is kept for failure context.
pub(crate) const TAIL_LEN: usize = 1024;

/// Decodes a byte stream into UTF-8 chunks.
///
/// A multi-byte sequence split across two reads is held back until the rest
/// arrives; bytes that can never be valid are replaced with U+FFFD.
#[derive(Debug, Default)]
pub(crate) struct Utf8Chunker {
    pending: Vec<u8>,
}

impl Utf8Chunker {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Option<String> {
        self.pending.extend_from_slice(bytes);

        let mut text = String::new();
        let mut consumed = 0;
        while consumed < self.pending.len() {
            match std::str::from_utf8(&self.pending[consumed..]) {
                Ok(valid) => {
                    text.push_str(valid);
                    consumed = self.pending.len();
                }
                Err(e) => {
                    let valid_end = consumed + e.valid_up_to();
                    text.push_str(&String::from_utf8_lossy(&self.pending[consumed..valid_end]));
                    match e.error_len() {
                        Some(bad) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            consumed = valid_end + bad;
                        }
                        // Incomplete sequence at the end: keep it for the next read.
                        None => {
                            consumed = valid_end;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..consumed);
        (!text.is_empty()).then_some(text)
    }

    /// Whatever is left once the stream hits EOF.
    pub(crate) fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.pending).into_owned())
        }
    }
}

/// What a pumped stream produced, besides the events themselves.
#[derive(Debug, Default)]
pub(crate) struct Pumped {
    /// Last [`TAIL_LEN`] bytes of text (rounded to a char boundary).
    pub tail: String,
}

impl Pumped {
    fn record(&mut self, text: &str) {
        self.tail.push_str(text);
        if self.tail.len() > TAIL_LEN {
            let mut cut = self.tail.len() - TAIL_LEN;
            while !self.tail.is_char_boundary(cut) {
                cut += 1;
            }
            self.tail.drain(..cut);
        }
    }
}

/// Read `reader` to EOF, emitting one progress event per decoded chunk.
pub(crate) async fn pump<R, P>(mut reader: R, stream: Stream, reporter: &P) -> Pumped
where
    R: AsyncRead + Unpin,
    P: Reporter,
{
    let mut buf = vec![0u8; READ_BUF_LEN];
    let mut chunker = Utf8Chunker::default();
    let mut pumped = Pumped::default();

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if let Some(text) = chunker.push(&buf[..n]) {
                    pumped.record(&text);
                    reporter.emit(ReportEvent::chunk(stream, text)).await;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!(%stream, error = %e, "stopped reading child output");
                break;
            }
        }
    }

    if let Some(text) = chunker.finish() {
        pumped.record(&text);
        reporter.emit(ReportEvent::chunk(stream, text)).await;
    }
    pumped
}

/// [`pump`] for a pipe that may not have been captured.
pub(crate) async fn drain<R, P>(reader: Option<R>, stream: Stream, reporter: &P) -> Pumped
where
    R: AsyncRead + Unpin,
    P: Reporter,
{
    match reader {
        Some(reader) => pump(reader, stream, reporter).await,
        None => Pumped::default(),
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
