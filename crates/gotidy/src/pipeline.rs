// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Two-stage event pipeline
//!
//! Raw lines arrive on a bounded channel fed by one reader per input stream.
//! The producer task decodes and aggregates them and hands finalized entries
//! to the consumer, which drives the [`Renderer`] on the calling task:
//!
//! ```text
//! readers --lines--> producer (decode, aggregate) --messages--> renderer
//! ```
//!
//! The aggregator lives entirely inside the producer task. Dropping the
//! message receiver (the renderer gave up) stops the producer at its next
//! send.

use std::io::{BufRead, Write};

use gotidy_events::{Action, Aggregator, TestEntry, decode_line};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::render::{ReportError, Renderer, Summary};

/// Capacity of the raw line channel
pub const LINE_CHANNEL_CAPACITY: usize = 1024;

/// Capacity of the producer to renderer channel
pub const MESSAGE_CHANNEL_CAPACITY: usize = 1;

/// What the producer hands to the renderer
#[derive(Debug)]
pub enum Message {
    /// A finalized entry, with its subtests
    Entry(TestEntry),
    /// A line that could not be decoded, as read
    Malformed(String),
    /// A line of compiler output from a `build-output` event
    BuildOutput(String),
    /// Entries still unfinished at end of input
    Incomplete(Vec<TestEntry>),
}

/// Create the raw line channel
#[must_use]
pub fn line_channel() -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
    mpsc::channel(LINE_CHANNEL_CAPACITY)
}

fn strip_line_ending(buf: &[u8]) -> String {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

/// Forward every line of an async stream into `tx`
///
/// Invalid UTF-8 is replaced rather than treated as an error. The task ends
/// at end of stream, on a read error, or when the receiver is gone.
pub fn spawn_line_reader<R>(
    name: &'static str,
    reader: R,
    tx: mpsc::Sender<String>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(strip_line_ending(&buf)).await.is_err() {
                        debug!(stream = name, "line receiver dropped");
                        break;
                    }
                }
                Err(err) => {
                    warn!(stream = name, error = %err, "failed to read stream");
                    break;
                }
            }
        }
    })
}

/// Forward every line of standard input into `tx`
///
/// Reads on a dedicated thread: a blocking read of stdin cannot be
/// cancelled, and must not keep the runtime from shutting down.
pub fn spawn_stdin_reader(tx: mpsc::Sender<String>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut stdin = std::io::stdin().lock();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match stdin.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.blocking_send(strip_line_ending(&buf)).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(stream = "stdin", error = %err, "failed to read stream");
                    break;
                }
            }
        }
    })
}

/// Decode and aggregate lines until the line channel closes
///
/// Sends each finalized entry, each malformed line and each line of compiler
/// output as it is found, then the unfinished entries, if any.
pub async fn produce(mut lines: mpsc::Receiver<String>, tx: mpsc::Sender<Message>) {
    let mut aggregator = Aggregator::new();

    while let Some(line) = lines.recv().await {
        let message = match decode_line(&line) {
            Ok(Some(event)) if event.action == Action::BuildOutput => {
                Message::BuildOutput(event.output.trim_end_matches(['\n', '\r']).to_string())
            }
            Ok(Some(event)) => match aggregator.apply(event) {
                Some(entry) => Message::Entry(entry),
                None => continue,
            },
            Ok(None) => continue,
            Err(err) => {
                debug!(error = %err, "malformed line");
                Message::Malformed(line)
            }
        };

        if tx.send(message).await.is_err() {
            debug!("renderer stopped, abandoning stream");
            return;
        }
    }

    let unfinished = aggregator.finish();
    if !unfinished.is_empty() {
        info!(count = unfinished.len(), "flushing unfinished entries");
        if tx.send(Message::Incomplete(unfinished)).await.is_err() {
            debug!("renderer stopped, unfinished entries dropped");
        }
    }
}

/// Feed every message into the renderer, then finish the report
///
/// # Errors
///
/// Returns the first rendering error; remaining messages are not read.
pub async fn consume<W: Write>(
    mut rx: mpsc::Receiver<Message>,
    renderer: &mut Renderer<W>,
) -> Result<Summary, ReportError> {
    while let Some(message) = rx.recv().await {
        match message {
            Message::Entry(entry) => renderer.entry(entry)?,
            Message::Malformed(line) => renderer.malformed(line)?,
            Message::BuildOutput(line) => renderer.build_output(line),
            Message::Incomplete(entries) => renderer.incomplete(entries),
        }
    }

    renderer.finish()
}

/// Run the producer and the consumer until the line channel is drained
///
/// # Errors
///
/// Returns the renderer's error; the producer is stopped in that case.
pub async fn run_pipeline<W: Write>(
    lines: mpsc::Receiver<String>,
    renderer: &mut Renderer<W>,
) -> Result<Summary, ReportError> {
    let (tx, rx) = mpsc::channel(MESSAGE_CHANNEL_CAPACITY);
    let producer = tokio::spawn(produce(lines, tx));

    let result = consume(rx, renderer).await;
    if result.is_err() {
        producer.abort();
    }

    match producer.await {
        Err(err) if !err.is_cancelled() => warn!(error = %err, "producer task failed"),
        _ => {}
    }

    result
}
