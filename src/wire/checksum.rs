//! Additive packet checksum
//!
//! The checksum is the unsigned sum of every byte, wrapping at 2^32. It does
//! not detect reordered bytes, and a pair of edits whose deltas cancel leaves
//! it unchanged. Deployed consumers validate exactly this value, so it must
//! not be replaced by a CRC.

/// Sum of `bytes` as unsigned values, modulo 2^32.
///
/// ```rust
/// use mb1wire::wire::checksum;
///
/// assert_eq!(checksum(&[]), 0);
/// assert_eq!(checksum(b"MB1\0"), 0x4D + 0x42 + 0x31);
/// ```
#[inline]
pub fn checksum(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| acc.wrapping_add(u32::from(b)))
}
