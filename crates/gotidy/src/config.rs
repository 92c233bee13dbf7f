//! Configuration for gotidy
//!
//! This module provides the command-line interface: where the event stream
//! comes from, how the report is colored, and logging options.

use clap::{Parser, ValueEnum};
use gotidy_diagnostics::Styles;

/// Run `go test -json` and print a tidy, grouped report
#[derive(Parser, Debug, Clone)]
#[command(name = "gotidy")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Read a `go test -json` stream from standard input
    ///
    /// Use this when piping, e.g. `go test -json ./... | gotidy --stdin`.
    /// Without it, gotidy runs `go test -json` itself.
    #[arg(long, default_value = "false")]
    pub stdin: bool,

    /// When to colorize the report
    #[arg(long, value_enum, default_value_t = Color::Auto, env = "GOTIDY_COLOR")]
    pub color: Color,

    /// Program used to run the tests
    #[arg(long, default_value = "go", env = "GOTIDY_GO")]
    pub go: String,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr and never mix with the report.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - only errors are logged
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Arguments forwarded to `go test -json`, e.g. `./... -run TestName`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stdin: false,
            color: Color::default(),
            go: "go".to_string(),
            verbose: false,
            quiet: false,
            args: Vec::new(),
        }
    }
}

/// Report coloring choice
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Color {
    /// Colorize when stdout supports it
    #[default]
    Auto,
    /// Always colorize
    Always,
    /// Never colorize
    Never,
}

impl Color {
    /// Whether output to `stream` should be colorized
    #[must_use]
    pub fn should_colorize(self, stream: supports_color::Stream) -> bool {
        match self {
            Color::Auto => supports_color::on_cached(stream).is_some(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `--stdin` is combined with arguments for `go test`
    /// - the test program is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stdin && !self.args.is_empty() {
            return Err(ConfigError::StdinWithArgs(self.args.join(" ")));
        }

        if self.go.trim().is_empty() {
            return Err(ConfigError::EmptyGo);
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::ERROR
        } else {
            tracing::Level::WARN
        }
    }

    /// Report styles for standard output
    #[must_use]
    pub fn styles(&self) -> Styles {
        if self.color.should_colorize(supports_color::Stream::Stdout) {
            Styles::colorized()
        } else {
            Styles::plain()
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Arguments given while reading from stdin
    #[error("--stdin does not run go test, so arguments cannot be forwarded: {0}")]
    StdinWithArgs(String),

    /// The test program is empty
    #[error("--go must name a program")]
    EmptyGo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.stdin);
        assert_eq!(config.color, Color::Auto);
        assert_eq!(config.go, "go");
        assert!(!config.verbose);
        assert!(!config.quiet);
        assert!(config.args.is_empty());
    }

    #[test]
    fn test_parse_forwarded_args() {
        let config = Config::try_parse_from(["gotidy", "./...", "-run", "TestTotal"])
            .expect("Should parse");
        assert_eq!(config.args, vec!["./...", "-run", "TestTotal"]);
    }

    #[test]
    fn test_parse_forwarded_args_after_separator() {
        let config = Config::try_parse_from(["gotidy", "-q", "--", "-v", "-count=1", "./..."])
            .expect("Should parse");
        assert!(config.quiet);
        assert!(!config.verbose);
        assert_eq!(config.args, vec!["-v", "-count=1", "./..."]);
    }

    #[test]
    fn test_parse_color() {
        let config =
            Config::try_parse_from(["gotidy", "--color", "never"]).expect("Should parse");
        assert_eq!(config.color, Color::Never);
        assert!(!config.styles().is_colorized());

        let config =
            Config::try_parse_from(["gotidy", "--color", "always"]).expect("Should parse");
        assert!(config.styles().is_colorized());

        assert!(Config::try_parse_from(["gotidy", "--color", "sometimes"]).is_err());
    }

    #[test]
    fn test_log_level_default() {
        let config = Config::default();
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_log_level_verbose() {
        let config = Config {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_log_level_quiet() {
        let config = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_validate_stdin_with_args() {
        let config = Config {
            stdin: true,
            args: vec!["./...".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StdinWithArgs(args)) if args == "./..."
        ));
    }

    #[test]
    fn test_validate_empty_go() {
        let config = Config {
            go: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyGo)));
    }

    #[test]
    fn test_validate_defaults() {
        assert!(Config::default().validate().is_ok());
        assert!(
            Config {
                stdin: true,
                ..Default::default()
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
