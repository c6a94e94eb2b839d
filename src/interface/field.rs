//! Sub-register field arithmetic.
//!
//! A field is addressed by its most significant bit `bit_start` and its `length`, so it
//! occupies bits `bit_start - length + 1 ..= bit_start`:
//!
//! ```text
//! 76543210 bit numbers
//!    xxx   bit_start = 4, length = 3
//! 00011100 mask
//! ```
//!
//! Callers must keep `length <= bit_start + 1 <= WIDTH`. Out-of-range arguments trip a
//! debug assertion and otherwise produce an unspecified mask; they never panic in release
//! builds.

#[inline]
fn check(bit_start: u8, length: u8, width: u8) {
    debug_assert!(
        (bit_start as u16) < width as u16 && length as u16 <= bit_start as u16 + 1,
        "bit field out of range"
    );
}

#[inline]
fn shift8(bit_start: u8, length: u8) -> u32 {
    (bit_start.wrapping_add(1).wrapping_sub(length) & 0x07) as u32
}

#[inline]
fn shift16(bit_start: u8, length: u8) -> u32 {
    (bit_start.wrapping_add(1).wrapping_sub(length) & 0x0F) as u32
}

/// Mask selecting a field of an 8-bit register.
pub fn mask8(bit_start: u8, length: u8) -> u8 {
    check(bit_start, length, 8);
    let ones = if length >= 8 {
        u8::MAX
    } else {
        (1u8 << length) - 1
    };
    ones.wrapping_shl(shift8(bit_start, length))
}

/// Right-aligned value of a field of `value`.
pub fn extract8(value: u8, bit_start: u8, length: u8) -> u8 {
    (value & mask8(bit_start, length)) >> shift8(bit_start, length)
}

/// `current` with the field replaced by the low `length` bits of `field`.
pub fn insert8(current: u8, bit_start: u8, length: u8, field: u8) -> u8 {
    let mask = mask8(bit_start, length);
    (current & !mask) | (field.wrapping_shl(shift8(bit_start, length)) & mask)
}

/// Mask selecting a field of a 16-bit register.
pub fn mask16(bit_start: u8, length: u8) -> u16 {
    check(bit_start, length, 16);
    let ones = if length >= 16 {
        u16::MAX
    } else {
        (1u16 << length) - 1
    };
    ones.wrapping_shl(shift16(bit_start, length))
}

/// Right-aligned value of a field of `value`.
pub fn extract16(value: u16, bit_start: u8, length: u8) -> u16 {
    (value & mask16(bit_start, length)) >> shift16(bit_start, length)
}

/// `current` with the field replaced by the low `length` bits of `field`.
pub fn insert16(current: u16, bit_start: u8, length: u8, field: u16) -> u16 {
    let mask = mask16(bit_start, length);
    (current & !mask) | (field.wrapping_shl(shift16(bit_start, length)) & mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_matches_worked_example() {
        assert_eq!(mask8(4, 3), 0b0001_1100);
        assert_eq!(mask8(7, 8), 0xFF);
        assert_eq!(mask8(0, 1), 0x01);
        assert_eq!(mask16(15, 4), 0xF000);
    }

    #[test]
    fn extract_right_aligns() {
        // 01101001 with bit_start = 4, length = 3 reads 010.
        assert_eq!(extract8(0b0110_1001, 4, 3), 0b010);
        assert_eq!(extract16(0xABCD, 11, 4), 0xB);
    }

    #[test]
    fn insert_matches_worked_example() {
        // 10101111 with 010 written at bit_start = 4, length = 3 gives 10101011.
        assert_eq!(insert8(0b1010_1111, 4, 3, 0b010), 0b1010_1011);
    }

    #[test]
    fn insert_drops_bits_beyond_length() {
        assert_eq!(insert8(0x00, 3, 2, 0xFF), 0b0000_1100);
        assert_eq!(insert16(0x0000, 9, 2, 0xFFFF), 0x0300);
    }

    #[test]
    fn zero_length_field_is_empty() {
        assert_eq!(mask8(3, 0), 0);
        assert_eq!(insert8(0x5A, 3, 0, 0xFF), 0x5A);
    }
}
