//! NEC code word packing.
//!
//! Pure bit manipulation, no hardware dependencies.
//!
//! # Word Layout
//!
//! ```text
//!  31      24 23      16 15       8 7        0
//! [ !command ][ command ][ !address ][ address ]
//!                        [   extended address  ]
//! ```
//!
//! Bits leave the transmitter LSB first, so `address` bit 0 is the first
//! data bit on the wire.

/// Build a standard NEC code word from a command and an 8-bit address.
///
/// Both bytes are followed by their one's complement.
///
/// ```
/// use rust_nec_tx::code::encode;
///
/// assert_eq!(encode(0x10, 0x34), 0xEF10_CB34);
/// ```
#[inline]
pub const fn encode(command: u8, address: u8) -> u32 {
    encode_extended(command, (address as u16) | ((!address as u16) << 8))
}

/// Build an extended NEC code word from a command and a 16-bit address.
///
/// The address fills the low half verbatim; only the command is complemented.
#[inline]
pub const fn encode_extended(command: u8, address: u16) -> u32 {
    (address as u32) | ((command as u32) << 16) | ((!command as u32) << 24)
}

/// A 32-bit NEC code word with field accessors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NecCode(u32);

impl NecCode {
    /// Standard code: 8-bit address and command, both complemented.
    pub const fn new(command: u8, address: u8) -> Self {
        Self(encode(command, address))
    }

    /// Extended code: 16-bit address, complemented command.
    pub const fn extended(command: u8, address: u16) -> Self {
        Self(encode_extended(command, address))
    }

    /// Wrap a raw word as-is.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Bits [7:0].
    #[inline]
    pub const fn address(self) -> u8 {
        self.0 as u8
    }

    /// Bits [15:8].
    #[inline]
    pub const fn address_inv(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Bits [15:0].
    #[inline]
    pub const fn extended_address(self) -> u16 {
        self.0 as u16
    }

    /// Bits [23:16].
    #[inline]
    pub const fn command(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Bits [31:24].
    #[inline]
    pub const fn command_inv(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// True if the command byte is followed by its complement.
    #[inline]
    pub const fn has_valid_command(self) -> bool {
        self.command() == !self.command_inv()
    }

    /// True if both address and command carry their complements.
    ///
    /// Extended codes usually fail the address half of this check.
    #[inline]
    pub const fn is_standard(self) -> bool {
        self.has_valid_command() && self.address() == !self.address_inv()
    }
}

impl From<u32> for NecCode {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<NecCode> for u32 {
    fn from(code: NecCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let code = encode(0x10, 0x34);
        assert_eq!(code & 0xFF, 0x34);
        assert_eq!((code >> 8) & 0xFF, 0xCB);
        assert_eq!((code >> 16) & 0xFF, 0x10);
        assert_eq!(code >> 24, 0xEF);
    }

    #[test]
    fn test_encode_extended_keeps_address() {
        let code = encode_extended(0x45, 0xBEEF);
        assert_eq!(code, 0xBA45_BEEF);
    }

    #[test]
    fn test_standard_is_extended_with_complemented_address() {
        assert_eq!(encode(0x07, 0x00), encode_extended(0x07, 0xFF00));
    }

    #[test]
    fn test_nec_code_accessors() {
        let code = NecCode::new(0x1C, 0x04);
        assert_eq!(code.address(), 0x04);
        assert_eq!(code.address_inv(), 0xFB);
        assert_eq!(code.command(), 0x1C);
        assert_eq!(code.command_inv(), 0xE3);
        assert_eq!(code.extended_address(), 0xFB04);
        assert!(code.is_standard());
    }

    #[test]
    fn test_extended_code_is_not_standard() {
        let code = NecCode::extended(0x1C, 0x1234);
        assert!(code.has_valid_command());
        assert!(!code.is_standard());
    }

    #[test]
    fn test_raw_round_trip() {
        let code = NecCode::from(0xDEAD_BEEF);
        assert_eq!(u32::from(code), 0xDEAD_BEEF);
        assert!(!code.has_valid_command());
    }
}
