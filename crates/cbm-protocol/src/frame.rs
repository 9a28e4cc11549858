//! Accessory-event frames: one opcode byte plus big-endian device and
//! event numbers. Five bytes on the wire for every opcode handled here.

use crate::error::ProtocolError;

/// Wire length of every frame this crate encodes or decodes.
pub const EVENT_FRAME_LEN: usize = 5;

/// The closed set of opcodes the gateway handles.
///
/// Values are the CBUS long-event opcodes. Primary events and their
/// response variants (sent in reply to a status request) carry the same
/// meaning for I/O mirroring and are treated identically downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// ACON — accessory ON event.
    AccessoryOn = 0x90,
    /// ACOF — accessory OFF event.
    AccessoryOff = 0x91,
    /// AREQ — accessory status request.
    StatusRequest = 0x92,
    /// ARON — accessory ON response to a status request.
    AccessoryOnResponse = 0x93,
    /// AROF — accessory OFF response to a status request.
    AccessoryOffResponse = 0x94,
}

impl Opcode {
    /// Decode an opcode byte, rejecting anything outside the handled set.
    pub fn from_byte(byte: u8) -> Result<Self, ProtocolError> {
        match byte {
            0x90 => Ok(Self::AccessoryOn),
            0x91 => Ok(Self::AccessoryOff),
            0x92 => Ok(Self::StatusRequest),
            0x93 => Ok(Self::AccessoryOnResponse),
            0x94 => Ok(Self::AccessoryOffResponse),
            other => Err(ProtocolError::UnknownOpcode { opcode: other }),
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// True for both ON variants (primary and response).
    pub fn is_on_event(self) -> bool {
        matches!(self, Self::AccessoryOn | Self::AccessoryOnResponse)
    }

    /// True for both OFF variants (primary and response).
    pub fn is_off_event(self) -> bool {
        matches!(self, Self::AccessoryOff | Self::AccessoryOffResponse)
    }
}

/// A decoded accessory event: opcode + (device, event) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventFrame {
    pub opcode: Opcode,
    /// Device (node) number, 1-65534 for bound slots.
    pub device: u16,
    /// Event number, 0-65534.
    pub event: u16,
}

impl EventFrame {
    pub fn new(opcode: Opcode, device: u16, event: u16) -> Self {
        Self {
            opcode,
            device,
            event,
        }
    }

    /// ACON for `state = true`, ACOF for `state = false`.
    pub fn accessory(device: u16, event: u16, state: bool) -> Self {
        let opcode = if state {
            Opcode::AccessoryOn
        } else {
            Opcode::AccessoryOff
        };
        Self::new(opcode, device, event)
    }

    /// AREQ asking producers of `(device, event)` to re-announce state.
    pub fn status_request(device: u16, event: u16) -> Self {
        Self::new(Opcode::StatusRequest, device, event)
    }

    /// Encode to the 5-byte wire layout.
    pub fn encode(&self) -> [u8; EVENT_FRAME_LEN] {
        let d = self.device.to_be_bytes();
        let e = self.event.to_be_bytes();
        [self.opcode.as_byte(), d[0], d[1], e[0], e[1]]
    }

    /// Decode from a frame payload. Extra trailing bytes are tolerated
    /// (longer opcodes share the same 5-byte prefix); short payloads and
    /// unhandled opcodes are rejected.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < EVENT_FRAME_LEN {
            return Err(ProtocolError::ShortFrame { len: data.len() });
        }
        let opcode = Opcode::from_byte(data[0])?;
        Ok(Self {
            opcode,
            device: u16::from_be_bytes([data[1], data[2]]),
            event: u16::from_be_bytes([data[3], data[4]]),
        })
    }
}
