//! 11-bit CAN identifier packing.
//!
//! The bus identifier is the base address with two priority fields OR-ed
//! into the high bits: `base | major << 9 | minor << 7`. It is computed
//! once at startup and reused for every transmitted frame.

use crate::error::ProtocolError;

/// Default base identifier used when none is configured.
pub const DEFAULT_BASE_ID: u16 = 0x2FF;

/// Highest value an 11-bit identifier can take.
const MAX_CAN_ID: u16 = 0x7FF;

/// A validated, precomputed 11-bit CAN identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanId(u16);

impl CanId {
    /// Pack `base` with the priority fields. Major priority must be 0-2
    /// (3 is not allowed on the bus), minor 0-3, and the packed result
    /// must still fit in 11 bits.
    pub fn new(base: u16, major_priority: u8, minor_priority: u8) -> Result<Self, ProtocolError> {
        if major_priority > 2 {
            return Err(ProtocolError::MajorPriorityOutOfRange(major_priority));
        }
        if minor_priority > 3 {
            return Err(ProtocolError::MinorPriorityOutOfRange(minor_priority));
        }
        if base > MAX_CAN_ID {
            return Err(ProtocolError::IdOutOfRange(base));
        }
        let packed = base | (u16::from(major_priority) << 9) | (u16::from(minor_priority) << 7);
        if packed > MAX_CAN_ID {
            return Err(ProtocolError::IdOutOfRange(packed));
        }
        Ok(Self(packed))
    }

    pub fn raw(self) -> u16 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_with_zero_priorities() {
        assert_eq!(CanId::new(DEFAULT_BASE_ID, 0, 0).unwrap().raw(), 0x2FF);
    }

    #[test]
    fn priorities_pack_into_high_bits() {
        // 0x7F | 2 << 9 | 3 << 7 = 0x7F | 0x400 | 0x180
        assert_eq!(CanId::new(0x7F, 2, 3).unwrap().raw(), 0x5FF);
        assert_eq!(CanId::new(0x10, 1, 0).unwrap().raw(), 0x210);
    }

    #[test]
    fn priority_ranges_enforced() {
        assert_eq!(
            CanId::new(0x10, 3, 0),
            Err(ProtocolError::MajorPriorityOutOfRange(3))
        );
        assert_eq!(
            CanId::new(0x10, 0, 4),
            Err(ProtocolError::MinorPriorityOutOfRange(4))
        );
    }

    #[test]
    fn base_must_fit_eleven_bits() {
        assert_eq!(CanId::new(0x800, 0, 0), Err(ProtocolError::IdOutOfRange(0x800)));
        assert!(CanId::new(MAX_CAN_ID, 0, 0).is_ok());
    }
}
