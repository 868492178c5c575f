//! Block check character (BCC)
//!
//! The controller protects every frame with a single byte: the running XOR of
//! the bytes it covers. Command frames carry it over the mnemonic and the
//! `30 03` separator, response frames over everything after the 3-byte header
//! up to (but excluding) the trailing checksum byte.

use tracing::trace;

/// Calculate the XOR block check character of `data`.
///
/// Returns `0` for an empty slice.
///
/// # Examples
///
/// ```
/// use checkweigher_core::checksum;
///
/// assert_eq!(checksum::bcc(b""), 0);
/// assert_eq!(checksum::bcc(&[0x44, 0x53, 0x30, 0x03]), 0x44 ^ 0x53 ^ 0x30 ^ 0x03);
/// ```
pub fn bcc(data: &[u8]) -> u8 {
    let bcc = data.iter().fold(0u8, |acc, byte| acc ^ byte);

    trace!(
        len = data.len(),
        bcc = format!("0x{:02X}", bcc),
        "Calculated BCC"
    );

    bcc
}

/// Verify that `expected` is the BCC of `data`
pub fn verify(data: &[u8], expected: u8) -> bool {
    bcc(data) == expected
}
