use thiserror::Error;
use tilestream_core::ChunkSystemError;

/// Simulation error type
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Map configuration error: {0}")]
    Map(#[from] ChunkSystemError),

    #[error("Invalid setting {name}={value:?}: {reason}")]
    InvalidSetting {
        name: &'static str,
        value: String,
        reason: String,
    },
}
