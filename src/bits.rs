//! Bit and nibble extraction for packed segment fields.
//!
//! 4-bit parameters in JPEG marker segments always come in pairs, packed into one byte with the
//! first parameter in the most significant nibble.

/// Returns the bit at `index` of `byte`, where index 0 is the most significant bit and index 7
/// the least significant one.
///
/// # Panics
///
/// Panics if `index` is greater than 7.
#[inline]
pub fn get_bit(byte: u8, index: u8) -> u8 {
    assert!(index < 8, "bit index must be between 0 and 7, inclusive");
    (byte >> (7 - index)) & 1
}

/// Splits `byte` into its (most significant, least significant) 4-bit halves.
#[inline]
pub fn split_byte(byte: u8) -> (u8, u8) {
    (byte >> 4, byte & 0xf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_index() {
        let bytes = [0x80, 0x40, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01];
        for (index, byte) in bytes.into_iter().enumerate() {
            assert_eq!(get_bit(byte, index as u8), 1);
            assert_eq!(get_bit(!byte, index as u8), 0);
        }

        assert_eq!(get_bit(0b1010_0000, 0), 1);
        assert_eq!(get_bit(0b1010_0000, 1), 0);
        assert_eq!(get_bit(0b1010_0000, 2), 1);
    }

    #[test]
    #[should_panic = "bit index must be between 0 and 7"]
    fn bit_index_out_of_range() {
        get_bit(0, 8);
    }

    #[test]
    fn splitting() {
        assert_eq!(split_byte(0x00), (0, 0));
        assert_eq!(split_byte(0x0f), (0, 15));
        assert_eq!(split_byte(0xf0), (15, 0));
        assert_eq!(split_byte(0x55), (5, 5));
        assert_eq!(split_byte(0xaa), (10, 10));
        assert_eq!(split_byte(0x18), (1, 8));
        assert_eq!(split_byte(0x81), (8, 1));
    }
}
