//! Wire types for the CBUS accessory-event subset the gateway speaks.
//!
//! Only the long accessory events and the matching status request are
//! modelled here (`ACON`/`ACOF`/`AREQ`/`ARON`/`AROF`). Everything else on
//! the bus is out of scope for I/O mirroring and decodes to
//! [`ProtocolError::UnknownOpcode`] so callers can ignore it explicitly.

pub mod error;
pub mod frame;
pub mod id;

pub use error::ProtocolError;
pub use frame::{EventFrame, Opcode, EVENT_FRAME_LEN};
pub use id::{CanId, DEFAULT_BASE_ID};
