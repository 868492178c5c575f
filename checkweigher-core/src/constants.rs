//! Protocol constants

/// Default controller port
pub const DEFAULT_PORT: u16 = 1001;

/// Default connection timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 5;

/// Default read timeout (seconds)
pub const DEFAULT_READ_TIMEOUT: u64 = 5;

/// Connection attempts before giving up
pub const DEFAULT_RETRY_ATTEMPTS: usize = 5;

/// Delay between connection attempts (milliseconds)
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Handshake and control frames.
///
/// Every frame starts with the station address `C` `W` (`43 57`).
pub mod frames {
    /// Step 1 request: address + ENQ
    pub const ENQUIRE: [u8; 3] = [0x43, 0x57, 0x05];

    /// Step 1 reply (and step 3's expectation minus the last byte): address + DLE `0`
    pub const READY: [u8; 4] = [0x43, 0x57, 0x10, 0x30];

    /// Step 2 reply: address + DLE `1`
    pub const ACCEPTED: [u8; 4] = [0x43, 0x57, 0x10, 0x31];

    /// Step 3 request: address + EOT
    pub const FINALIZE: [u8; 3] = [0x43, 0x57, 0x04];

    /// Step 3 reply, read as 3 bytes
    pub const FINALIZE_EXPECT: [u8; 3] = [0x43, 0x57, 0x05];

    /// Command frame header: address + STX
    pub const COMMAND_HEADER: [u8; 3] = [0x43, 0x57, 0x02];

    /// Command frame separator, covered by the BCC together with the mnemonic
    pub const COMMAND_SEPARATOR: [u8; 2] = [0x30, 0x03];

    /// Device aborted the transmission: address + DLE EOT
    pub const DLE_EOT: [u8; 4] = [0x43, 0x57, 0x10, 0x04];

    /// Negative acknowledgement: address + NAK
    pub const NAK: [u8; 3] = [0x43, 0x57, 0x15];

    /// Data request for even blocks (ACK0)
    pub const REQUEST_EVEN: [u8; 4] = READY;

    /// Data request for odd blocks (ACK1)
    pub const REQUEST_ODD: [u8; 4] = ACCEPTED;
}

/// Response frame geometry and sizes
pub mod response {
    /// Bytes excluded from the BCC at the start of a response frame
    pub const HEADER_LEN: usize = 3;

    /// Offset of the first payload byte
    pub const PAYLOAD_OFFSET: usize = 6;

    /// Bytes after the payload (terminator + BCC)
    pub const TRAILER_LEN: usize = 2;

    /// Smallest frame that still has a header, terminator and BCC
    pub const MIN_FRAME_LEN: usize = PAYLOAD_OFFSET + TRAILER_LEN;

    /// Totals, record kind 1
    pub const TOTALS_PRIMARY_LEN: usize = 164;

    /// Totals, record kind 2
    pub const TOTALS_SECONDARY_LEN: usize = 220;

    /// One block of a bulk transfer
    pub const BULK_BLOCK_LEN: usize = 187;

    /// Blocks in a bulk transfer
    pub const BULK_BLOCK_COUNT: usize = 20;

    /// Payload bytes carried by a frame of `frame_len` bytes
    pub const fn payload_len(frame_len: usize) -> usize {
        frame_len.saturating_sub(MIN_FRAME_LEN)
    }
}

/// Bulk record geometry
pub mod bulk {
    /// Bytes per record
    pub const RECORD_LEN: usize = 9;

    /// Weight digits
    pub const WEIGHT_LEN: usize = 6;
}
