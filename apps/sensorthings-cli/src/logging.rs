//! Log output for the sensor-things CLI.
//!
//! Library events are emitted through `tracing`; this module installs the
//! `fmt` subscriber once at startup. `RUST_LOG` takes precedence over the
//! verbosity flags.

use std::fmt;
use tracing_subscriber::EnvFilter;

/// Verbosity selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only (`-s`)
    Silent,
    #[default]
    Normal,
    /// Per-record progress and HTTP requests (`-v`)
    Verbose,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, silent: bool) -> Self {
        if verbose {
            Self::Verbose
        } else if silent {
            Self::Silent
        } else {
            Self::Normal
        }
    }

    fn level(&self) -> &'static str {
        match self {
            Self::Silent => "error",
            Self::Normal => "info",
            Self::Verbose => "debug",
        }
    }

    /// Filter directive; the HTTP stack is clamped to `warn`.
    pub fn directive(&self) -> String {
        format!("{},reqwest=warn,hyper=warn,hyper_util=warn", self.level())
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.level())
    }
}

/// Initialize the global subscriber. Later calls are ignored.
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
