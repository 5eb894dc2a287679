//! Error types for the bubble burst solver.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by grid construction, bursting, and configuration loading.
///
/// Budget exhaustion is not an error: a search that runs out of visits
/// still returns its best line in a [`crate::search::SearchReport`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid move: ({row}, {col}) is empty, out of bounds, or has no same-colored neighbor")]
    InvalidMove { row: usize, col: usize },

    #[error("malformed grid: {reason}")]
    MalformedGrid { reason: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedGrid {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
