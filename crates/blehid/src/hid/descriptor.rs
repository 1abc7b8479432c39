//! HID report descriptor item tags
//!
//! Each function returns the prefix byte of a short item: the item tag and
//! type in the high six bits, the data size (0, 1, 2 or 4 bytes, encoded as
//! 0..=3) in the low two bits. Data bytes follow the prefix literally in the
//! descriptor array. Nothing is validated; the size is only masked into a byte.

// Main items
pub const fn input(size: u8) -> u8 {
    0x80 | size
}

pub const fn output(size: u8) -> u8 {
    0x90 | size
}

pub const fn collection(size: u8) -> u8 {
    0xA0 | size
}

pub const fn feature(size: u8) -> u8 {
    0xB0 | size
}

pub const fn end_collection(size: u8) -> u8 {
    0xC0 | size
}

// Global items
pub const fn usage_page(size: u8) -> u8 {
    0x04 | size
}

pub const fn logical_minimum(size: u8) -> u8 {
    0x14 | size
}

pub const fn logical_maximum(size: u8) -> u8 {
    0x24 | size
}

pub const fn physical_minimum(size: u8) -> u8 {
    0x34 | size
}

pub const fn physical_maximum(size: u8) -> u8 {
    0x44 | size
}

pub const fn unit_exponent(size: u8) -> u8 {
    0x54 | size
}

pub const fn unit(size: u8) -> u8 {
    0x64 | size
}

pub const fn report_size(size: u8) -> u8 {
    0x74 | size
}

pub const fn report_id(size: u8) -> u8 {
    0x84 | size
}

pub const fn report_count(size: u8) -> u8 {
    0x94 | size
}

// Local items
pub const fn usage(size: u8) -> u8 {
    0x08 | size
}

pub const fn usage_minimum(size: u8) -> u8 {
    0x18 | size
}

pub const fn usage_maximum(size: u8) -> u8 {
    0x28 | size
}

/// Low byte of a 16-bit item value.
pub const fn lsb(value: u16) -> u8 {
    (value & 0xFF) as u8
}

/// High byte of a 16-bit item value.
pub const fn msb(value: u16) -> u8 {
    (value >> 8) as u8
}

// Main item data flags
pub const DATA_ARRAY_ABSOLUTE: u8 = 0x00;
pub const CONSTANT: u8 = 0x01;
pub const DATA_VARIABLE_ABSOLUTE: u8 = 0x02;
pub const CONSTANT_VARIABLE_ABSOLUTE: u8 = 0x03;
pub const DATA_VARIABLE_RELATIVE: u8 = 0x06;

// Collection types
pub const COLLECTION_PHYSICAL: u8 = 0x00;
pub const COLLECTION_APPLICATION: u8 = 0x01;

// Usage pages
pub const USAGE_PAGE_GENERIC_DESKTOP: u8 = 0x01;
pub const USAGE_PAGE_KEY_CODES: u8 = 0x07;
pub const USAGE_PAGE_LEDS: u8 = 0x08;
pub const USAGE_PAGE_BUTTON: u8 = 0x09;

// Generic desktop usages
pub const USAGE_POINTER: u8 = 0x01;
pub const USAGE_MOUSE: u8 = 0x02;
pub const USAGE_KEYBOARD: u8 = 0x06;
pub const USAGE_X: u8 = 0x30;
pub const USAGE_Y: u8 = 0x31;
pub const USAGE_WHEEL: u8 = 0x38;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_bytes() {
        assert_eq!(usage_page(1), 0x05);
        assert_eq!(usage(1), 0x09);
        assert_eq!(collection(1), 0xA1);
        assert_eq!(end_collection(0), 0xC0);
        assert_eq!(report_id(1), 0x85);
        assert_eq!(input(1), 0x81);
        assert_eq!(output(1), 0x91);
        assert_eq!(feature(2), 0xB2);
        assert_eq!(logical_maximum(2), 0x26);
        assert_eq!(usage_maximum(2), 0x2A);
    }

    #[test]
    fn test_sixteen_bit_split() {
        assert_eq!(lsb(0x7FFF), 0xFF);
        assert_eq!(msb(0x7FFF), 0x7F);
        assert_eq!([logical_maximum(2), lsb(0x00FF), msb(0x00FF)], [0x26, 0xFF, 0x00]);
    }

    #[test]
    fn test_sequence_is_deterministic() {
        let build = || {
            [
                usage_page(1),
                USAGE_PAGE_GENERIC_DESKTOP,
                usage(1),
                USAGE_MOUSE,
                collection(1),
                COLLECTION_APPLICATION,
                end_collection(0),
            ]
        };
        assert_eq!(build(), build());
        assert_eq!(build(), [0x05, 0x01, 0x09, 0x02, 0xA1, 0x01, 0xC0]);
    }
}
