//! Error surface of the drivers
//!
//! The core kernels assume valid inputs and assert their invariants; only
//! file I/O produces recoverable errors, and those are fatal to the run.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the drivers and the checkpoint layer.
#[derive(Debug, Error)]
pub enum SimError {
    /// Opening, reading or writing a checkpoint or energy file failed.
    #[error("i/o on {}: {source}", path.display())]
    Io {
        /// File the operation touched
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
}

impl SimError {
    /// Attach the offending path to an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SimError::Io {
            path: path.into(),
            source,
        }
    }
}
