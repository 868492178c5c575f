//! Response frame validation and payload extraction

use bytes::Bytes;
use std::fmt;

use crate::{
    checksum,
    constants::response::{HEADER_LEN, MIN_FRAME_LEN, PAYLOAD_OFFSET, TRAILER_LEN},
    error::{Error, Result},
};

/// Data frame received from the controller
///
/// # Frame Structure
///
/// ```text
/// ┌──────────┬──────────┬─────────────┬────────────┬─────┐
/// │  Header  │  Prefix  │   Payload   │ Terminator │ BCC │
/// │ 3 bytes  │ 3 bytes  │   N bytes   │   1 byte   │  1  │
/// └──────────┴──────────┴─────────────┴────────────┴─────┘
///            └──────────────── BCC window ───────────┘
/// ```
///
/// The BCC covers everything after the header up to the BCC itself. A frame
/// that fails this check is rejected and never decoded.
///
/// # Examples
///
/// ```
/// use checkweigher_core::{checksum, ResponseFrame};
///
/// let mut raw = vec![0x43, 0x57, 0x02, b'D', b'S', b'1', b'4', b'2', 0x03];
/// raw.push(checksum::bcc(&raw[3..]));
///
/// let frame = ResponseFrame::parse(raw.into()).unwrap();
/// assert_eq!(frame.payload().as_ref(), b"42");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    raw: Bytes,
}

impl ResponseFrame {
    /// Validate the BCC of `raw` and wrap it
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Buffer is shorter than header, prefix, terminator and BCC
    /// - BCC verification fails
    pub fn parse(raw: Bytes) -> Result<Self> {
        if raw.len() < MIN_FRAME_LEN {
            return Err(Error::FrameTooShort {
                expected: MIN_FRAME_LEN,
                actual: raw.len(),
            });
        }

        let bcc_at = raw.len() - 1;
        let (window, received) = (&raw[HEADER_LEN..bcc_at], raw[bcc_at]);

        if !checksum::verify(window, received) {
            return Err(Error::ChecksumMismatch {
                calculated: checksum::bcc(window),
                received,
            });
        }

        Ok(Self { raw })
    }

    /// Payload bytes, between the prefix and the terminator
    pub fn payload(&self) -> Bytes {
        self.raw.slice(PAYLOAD_OFFSET..self.raw.len() - TRAILER_LEN)
    }

    /// Trailing BCC byte
    pub fn bcc(&self) -> u8 {
        self.raw[self.raw.len() - 1]
    }

    /// Get total frame size
    pub fn size(&self) -> usize {
        self.raw.len()
    }
}

impl fmt::Debug for ResponseFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseFrame")
            .field("size", &self.size())
            .field("header", &hex::encode(&self.raw[..HEADER_LEN]))
            .field("bcc", &format!("0x{:02X}", self.bcc()))
            .field("payload_len", &(self.size() - MIN_FRAME_LEN))
            .finish()
    }
}

impl fmt::Display for ResponseFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame[{}](len={}, bcc=0x{:02X})",
            hex::encode(&self.raw[..HEADER_LEN]),
            self.size(),
            self.bcc()
        )
    }
}

/// Build a valid frame around `payload` (test fixtures and device simulators)
pub fn build(prefix: [u8; 3], payload: &[u8]) -> Bytes {
    let mut raw = Vec::with_capacity(MIN_FRAME_LEN + payload.len());
    raw.extend_from_slice(&[0x43, 0x57, 0x02]);
    raw.extend_from_slice(&prefix);
    raw.extend_from_slice(payload);
    raw.push(0x03);
    raw.push(checksum::bcc(&raw[HEADER_LEN..]));
    raw.into()
}
