//! Code word packing tests

use rust_nec_tx::code::{encode, encode_extended, NecCode};

#[test]
fn test_encode_all_pairs_layout() {
    for command in 0..=u8::MAX {
        for address in 0..=u8::MAX {
            let code = encode(command, address);
            assert_eq!(code as u8, address);
            assert_eq!((code >> 8) as u8, !address);
            assert_eq!((code >> 16) as u8, command);
            assert_eq!((code >> 24) as u8, !command);
        }
    }
}

#[test]
fn test_encode_known_word() {
    assert_eq!(encode(0x10, 0x34), 0xEF10_CB34);
}

#[test]
fn test_encode_extended_all_commands() {
    for command in 0..=u8::MAX {
        let code = encode_extended(command, 0x1234);
        assert_eq!(code & 0xFFFF, 0x1234);
        assert_eq!((code >> 16) as u8, command);
        assert_eq!((code >> 24) as u8, !command);
    }
}

#[test]
fn test_standard_codes_validate() {
    for address in [0x00, 0x34, 0x80, 0xFF] {
        let code = NecCode::new(0x5A, address);
        assert!(code.is_standard());
        assert_eq!(code.address(), address);
        assert_eq!(code.command(), 0x5A);
    }
}
