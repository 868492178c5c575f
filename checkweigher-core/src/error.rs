//! Error types for checkweigher-core

/// Result type alias for checkweigher-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame is too short to carry header, terminator and BCC
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    FrameTooShort {
        expected: usize,
        actual: usize,
    },

    /// BCC verification failed
    #[error("Checksum mismatch: calculated 0x{calculated:02X}, received 0x{received:02X}")]
    ChecksumMismatch {
        calculated: u8,
        received: u8,
    },

    /// Device aborted the transmission (DLE EOT)
    #[error("Device ended the transmission (DLE EOT)")]
    EndOfTransmission,

    /// Device refused the frame (NAK)
    #[error("Device sent negative acknowledgement (NAK)")]
    NegativeAcknowledge,

    /// Reply matched neither the expected prefix nor a sentinel
    #[error("Unexpected response: expected {expected}, received {received}")]
    UnexpectedResponse {
        expected: String,
        received: String,
    },

    /// Record kind outside {1, 2}
    #[error("Invalid record kind: {0} (expected 1 or 2)")]
    InvalidRecordKind(u8),

    /// Payload is shorter than the declared field widths
    #[error("Payload too short for record kind {kind}: layout needs {required} bytes, got {actual}")]
    PayloadTooShort {
        kind: u8,
        required: usize,
        actual: usize,
    },

    /// Bulk payload is not a whole number of records
    #[error("Bulk payload of {len} bytes is not a multiple of {record_len}")]
    BulkFraming {
        len: usize,
        record_len: usize,
    },

    /// Field bytes are not valid text
    #[error("Field '{field}' is not valid text: {source}")]
    InvalidText {
        field: String,
        #[source]
        source: std::str::Utf8Error,
    },

    /// Field layout table is unusable
    #[error("Invalid field layout: {0}")]
    InvalidLayout(String),

    /// Invalid session state
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),
}

impl Error {
    /// Check if the device answered with something other than the expected reply
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::EndOfTransmission
                | Self::NegativeAcknowledge
                | Self::UnexpectedResponse { .. }
        )
    }

    /// Check if the error comes from turning payload bytes into records
    pub fn is_decoding(&self) -> bool {
        matches!(
            self,
            Self::InvalidRecordKind(_)
                | Self::PayloadTooShort { .. }
                | Self::BulkFraming { .. }
                | Self::InvalidText { .. }
        )
    }

    /// Classify a reply that did not match `expected`
    ///
    /// The sentinels are checked first so that DLE EOT and NAK are reported
    /// by name rather than as a generic mismatch.
    pub fn from_reply(expected: &[u8], received: &[u8]) -> Self {
        use crate::constants::frames;

        if received == frames::DLE_EOT {
            Self::EndOfTransmission
        } else if received == frames::NAK {
            Self::NegativeAcknowledge
        } else {
            Self::UnexpectedResponse {
                expected: hex::encode(expected),
                received: hex::encode(received),
            }
        }
    }
}
