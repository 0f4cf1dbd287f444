use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Problems with a business unit's configuration artifacts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config root path was given for business unit '{0}'")]
    RootUnset(String),

    #[error("{what} does not exist: {}", path.display())]
    Missing { what: &'static str, path: PathBuf },

    #[error("unable to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to create output directory {}: {source}", path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid target '{entry}': {reason}")]
    InvalidTarget { entry: String, reason: String },
}

/// Failure of a single engine invocation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed while waiting for the engine: {0}")]
    Wait(#[source] io::Error),

    #[error("engine exited with {}", code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}")))]
    ExitStatus { code: Option<i32> },

    #[error("engine did not finish within {after:?} and was killed")]
    Timeout { after: Duration },

    #[error("engine finished but wrote no artifact at {}", path.display())]
    NoArtifact { path: PathBuf },
}

/// Violations of the contract between the engine and the aggregator.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("engine reported unknown state '{state}' for {host}:{port}")]
    UnknownState {
        host: String,
        port: u16,
        state: String,
    },
}
