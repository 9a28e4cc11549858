//! Gateway error types.

use thiserror::Error;

/// Which slot table a mapping file populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapDirection {
    Input,
    Output,
}

impl std::fmt::Display for MapDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Errors fatal to gateway startup. Steady-state transport hiccups are
/// logged and absorbed by the engine, never surfaced here.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("cannot open {direction} mapping file {path}: {source}")]
    MappingFileMissing {
        direction: MapDirection,
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Protocol(#[from] cbm_protocol::ProtocolError),

    #[error(transparent)]
    Bus(#[from] cbm_canbus::BusError),
}

/// Convenience alias for gateway results.
pub type GatewayResult<T> = Result<T, GatewayError>;
