//! Error types for the point table and station configuration

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building a station
#[derive(Debug, Error)]
pub enum TableError {
    /// A collection already holds one point per 16-bit index
    #[error("{collection} index space exhausted")]
    IndexSpaceExhausted { collection: &'static str },

    /// Point or device wiring failed
    #[error(transparent)]
    Sim(#[from] dnp_sim::SimError),

    /// No configuration directory could be determined
    #[error("could not determine configuration path")]
    NoConfigPath,

    /// Configuration file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON for a station
    #[error("invalid station configuration: {0}")]
    Json(#[from] serde_json::Error),
}
