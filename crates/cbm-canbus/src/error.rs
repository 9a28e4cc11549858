//! CAN transport error types.

use thiserror::Error;

/// Errors that can occur on the CAN transport.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to open CAN socket on {interface}: {source}")]
    Open {
        interface: String,
        source: std::io::Error,
    },

    #[error("failed to bind CAN socket to {interface}: {source}")]
    Bind {
        interface: String,
        source: std::io::Error,
    },

    #[error("CAN send failed: {0}")]
    Send(std::io::Error),

    #[error("CAN receive failed: {0}")]
    Recv(std::io::Error),

    #[error("invalid CAN frame: {0}")]
    Frame(String),

    #[error("transport is closed")]
    Closed,
}

/// Convenience alias for transport results.
pub type BusResult<T> = Result<T, BusError>;
