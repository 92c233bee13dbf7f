//! gotidy: run `go test -json` and print a tidy, grouped report
//!
//! Package lines stream as packages finish. Skipped and failed tests follow
//! as grouped blocks, then a one-line summary.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};

use gotidy::config::Config;
use gotidy::render::Renderer;
use gotidy::runner;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = Config::parse();

    // Logs go to stderr; stdout carries the report only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    config.validate().context("Invalid arguments")?;
    debug!(?config, "starting gotidy");

    let mut renderer = Renderer::new(std::io::stdout(), config.styles());
    match runner::run(&config, &mut renderer).await {
        Ok(code) => Ok(ExitCode::from(code)),
        Err(err) => {
            error!(error = %err, "go test could not be run");
            Ok(ExitCode::from(1))
        }
    }
}
