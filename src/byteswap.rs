//! In-place 16-bit endianness flip
//!
//! RGB565 pixel data is often produced in host byte order but transmitted
//! big-endian first; this swaps every 16-bit element of a byte buffer in
//! place.

use crate::error::Error;

/// Swaps the two bytes of every 16-bit element of `buf`, in place.
///
/// The buffer length must be even; odd-length buffers are rejected with
/// [`Error::OddBufferLength`] and left untouched.
///
/// # Example
///
/// ```
/// let mut pixels = [0x12, 0x34, 0x56, 0x78];
/// esp_lcd_bus::swap_bytes(&mut pixels)?;
/// assert_eq!(pixels, [0x34, 0x12, 0x78, 0x56]);
/// # Ok::<(), esp_lcd_bus::Error>(())
/// ```
pub fn swap_bytes(buf: &mut [u8]) -> Result<(), Error> {
    if buf.len() % 2 != 0 {
        return Err(Error::OddBufferLength(buf.len()));
    }
    for pair in buf.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swaps_each_16_bit_element() {
        let mut buf = [0x12, 0x34, 0x56, 0x78];
        swap_bytes(&mut buf).unwrap();
        assert_eq!(buf, [0x34, 0x12, 0x78, 0x56]);
    }

    #[test]
    fn empty_buffer_is_a_no_op() {
        let mut buf: [u8; 0] = [];
        swap_bytes(&mut buf).unwrap();
    }

    #[test]
    fn odd_length_is_rejected_and_untouched() {
        let mut buf = [0x12, 0x34, 0x56];
        assert_eq!(swap_bytes(&mut buf), Err(Error::OddBufferLength(3)));
        assert_eq!(buf, [0x12, 0x34, 0x56]);
    }
}
