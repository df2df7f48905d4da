//! Error types for the harness.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while driving the simulator.
///
/// A failure is terminal for the case that produced it only; sweeps and
/// regression lists keep going so a full report is always produced.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The child process could not be started (missing binary, spawn error).
    #[error("Execution of command '{command}' failed. {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The child process ran but exited unsuccessfully.
    ///
    /// A child terminated by a signal is reported with code -1.
    #[error("Execution of command '{command}' gave return code {code}")]
    ExitStatus { command: String, code: i32 },

    /// An output, reference or capture file could not be opened or written.
    #[error("Couldn't open file '{}'. {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration in '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        HarnessError::File {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
