// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Running `go test -json` and mapping the outcome to an exit code
//!
//! The child's stdout and stderr are both read into the pipeline, so build
//! errors printed on stderr show up in the report's error section. The exit
//! code is decided once the pipeline drained and the child exited:
//!
//! - the child's own code if it exited non-zero;
//! - otherwise `1` if the report failed or recorded failures;
//! - otherwise `0`.

use std::io::Write;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::Config;
use crate::pipeline::{line_channel, run_pipeline, spawn_line_reader, spawn_stdin_reader};
use crate::render::{ReportError, Renderer, Summary};

/// Errors running the wrapped command
#[derive(Debug, Error)]
pub enum RunError {
    /// The command could not be started
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Waiting for the command failed
    #[error("Failed to wait for `{program}`: {source}")]
    Wait {
        /// Program being waited for
        program: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// Build `<go> test -json <args...>` with piped output
#[must_use]
pub fn go_test_command(config: &Config) -> Command {
    let mut command = Command::new(&config.go);
    command
        .arg("test")
        .arg("-json")
        .args(&config.args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    command
}

/// Map the child status and the report outcome to a process exit code
#[must_use]
pub fn exit_code(child: Option<ExitStatus>, report: &Result<Summary, ReportError>) -> u8 {
    if let Some(status) = child
        && !status.success()
    {
        return status
            .code()
            .and_then(|code| u8::try_from(code).ok())
            .filter(|code| *code != 0)
            .unwrap_or(1);
    }

    match report {
        Ok(summary) if summary.is_success() => 0,
        _ => 1,
    }
}

/// Render a stream read from standard input
pub async fn run_stdin<W: Write>(renderer: &mut Renderer<W>) -> u8 {
    let (tx, rx) = line_channel();
    // Detached: the thread ends with stdin or with the line receiver
    let _reader = spawn_stdin_reader(tx);

    let report = run_pipeline(rx, renderer).await;
    exit_code(None, &report)
}

/// Run `go test -json` and render its output
///
/// # Errors
///
/// Returns an error if the command cannot be started or waited for.
pub async fn run_go_test<W: Write>(
    config: &Config,
    renderer: &mut Renderer<W>,
) -> Result<u8, RunError> {
    let mut command = go_test_command(config);
    info!(program = %config.go, args = ?config.args, "running go test");

    let mut child = command.spawn().map_err(|source| RunError::Spawn {
        program: config.go.clone(),
        source,
    })?;

    let (tx, rx) = line_channel();
    let mut readers = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_line_reader("stdout", stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_line_reader("stderr", stderr, tx.clone()));
    }
    drop(tx);

    let report = run_pipeline(rx, renderer).await;

    let status = child.wait().await.map_err(|source| RunError::Wait {
        program: config.go.clone(),
        source,
    })?;
    for reader in readers {
        if let Err(err) = reader.await {
            debug!(error = %err, "reader task failed");
        }
    }

    debug!(?status, "go test exited");
    Ok(exit_code(Some(status), &report))
}

/// Run according to the configuration
///
/// # Errors
///
/// Returns an error if the wrapped command cannot be run.
pub async fn run<W: Write>(config: &Config, renderer: &mut Renderer<W>) -> Result<u8, RunError> {
    if config.stdin {
        return Ok(run_stdin(renderer).await);
    }

    run_go_test(config, renderer).await
}
