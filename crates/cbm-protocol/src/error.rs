//! Protocol error types.

use thiserror::Error;

/// Errors from decoding inbound frames or building the bus identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unhandled opcode 0x{opcode:02X}")]
    UnknownOpcode { opcode: u8 },

    #[error("frame too short: {len} bytes, accessory events need 5")]
    ShortFrame { len: usize },

    #[error("major priority {0} out of range (0-2)")]
    MajorPriorityOutOfRange(u8),

    #[error("minor priority {0} out of range (0-3)")]
    MinorPriorityOutOfRange(u8),

    #[error("CAN identifier 0x{0:04X} does not fit in 11 bits")]
    IdOutOfRange(u16),
}
