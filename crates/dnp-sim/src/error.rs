//! Error types for the simulation layer

use thiserror::Error;

/// Errors that can occur while wiring points and devices
#[derive(Debug, Error)]
pub enum SimError {
    /// A point or output was registered twice
    #[error("point {name} already has index {existing}, cannot assign {requested}")]
    IndexAlreadyAssigned {
        name: String,
        existing: u16,
        requested: u16,
    },

    /// A device worker thread could not be started
    #[error("failed to spawn worker for {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
