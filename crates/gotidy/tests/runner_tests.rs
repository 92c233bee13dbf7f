// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Tests for running a child process in place of `go`
//!
//! Standard unix programs stand in for the go tool: `true` and `false` for
//! exit codes, `echo` for output that is not an event stream.

#![cfg(unix)]

use gotidy::config::Config;
use gotidy::render::Renderer;
use gotidy::runner::{RunError, run};
use gotidy_diagnostics::Styles;
use similar_asserts::assert_eq;

fn config(go: &str, args: &[&str]) -> Config {
    Config {
        go: go.to_string(),
        args: args.iter().map(|arg| (*arg).to_string()).collect(),
        ..Default::default()
    }
}

async fn run_with(config: &Config) -> (Result<u8, RunError>, String) {
    let mut renderer = Renderer::new(Vec::new(), Styles::plain());
    let result = run(config, &mut renderer).await;
    let output = String::from_utf8(renderer.into_inner()).expect("Report should be UTF-8");
    (result, output)
}

#[tokio::test]
async fn test_clean_child_exits_zero() {
    let (result, output) = run_with(&config("true", &[])).await;

    assert_eq!(result.expect("Should run"), 0);
    assert_eq!(output, "\nFinished in 0.00s\n0 tests\n");
}

#[tokio::test]
async fn test_failing_child_exit_code_is_kept() {
    let (result, _) = run_with(&config("false", &[])).await;
    assert_eq!(result.expect("Should run"), 1);
}

#[tokio::test]
async fn test_child_output_that_is_not_json() {
    let (result, output) = run_with(&config("echo", &["./..."])).await;

    assert_eq!(result.expect("Should run"), 1);
    assert_eq!(
        output,
        "\nErrors:\ntest -json ./...\n\nFinished in 0.00s\n0 tests\n"
    );
}

#[tokio::test]
async fn test_missing_program_is_a_spawn_error() {
    let (result, output) = run_with(&config("gotidy-no-such-program", &[])).await;

    let err = result.expect_err("Should fail to spawn");
    assert!(matches!(&err, RunError::Spawn { program, .. } if program == "gotidy-no-such-program"));
    assert!(err.to_string().contains("gotidy-no-such-program"));
    assert!(output.is_empty());
}
