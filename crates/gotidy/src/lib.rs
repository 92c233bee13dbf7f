//! gotidy library
//!
//! This module exports the pieces of the `gotidy` binary (configuration, the
//! event pipeline, report rendering and the `go test` runner) for use in
//! integration tests and as a library.

pub mod config;
pub mod pipeline;
pub mod render;
pub mod runner;

/// Commonly used items
pub mod prelude {
    pub use crate::config::{Color, Config, ConfigError};
    pub use crate::pipeline::{Message, run_pipeline};
    pub use crate::render::{ReportError, Renderer, Summary};
    pub use crate::runner::{RunError, exit_code, run};
}
