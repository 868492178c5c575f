//! Controller command definitions

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::{checksum, constants::frames};

/// Commands understood by the controller
///
/// Each command is identified on the wire by a 2-character ASCII mnemonic.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// `DC` - clear accumulated data
    ClearData,

    /// `DS` - totals for the current set
    SingleSetTotals,

    /// `DT` - totals for the timed period
    TimedTotals,

    /// `AS` - transfer of the last 500 weighings
    BulkScan,

    /// `PN` - part number (reserved)
    PartNumber,
}

impl Command {
    /// All commands, in mnemonic order of the controller manual
    pub const ALL: [Command; 5] = [
        Self::ClearData,
        Self::SingleSetTotals,
        Self::TimedTotals,
        Self::BulkScan,
        Self::PartNumber,
    ];

    /// Get the 2-character ASCII mnemonic
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::ClearData => "DC",
            Self::SingleSetTotals => "DS",
            Self::TimedTotals => "DT",
            Self::BulkScan => "AS",
            Self::PartNumber => "PN",
        }
    }

    /// Check if the command alters controller state
    pub fn is_destructive(self) -> bool {
        matches!(self, Self::ClearData | Self::TimedTotals)
    }

    /// Check if the command has a response-collection routine
    pub fn is_implemented(self) -> bool {
        !matches!(self, Self::PartNumber)
    }

    /// Build the step 2 handshake frame for this command
    ///
    /// ```text
    /// ┌──────────┬──────────┬───────────┬─────┐
    /// │ 43 57 02 │ mnemonic │   30 03   │ BCC │
    /// │ 3 bytes  │ 2 bytes  │  2 bytes  │  1  │
    /// └──────────┴──────────┴───────────┴─────┘
    /// ```
    ///
    /// The BCC covers the mnemonic and the separator.
    ///
    /// # Examples
    ///
    /// ```
    /// use checkweigher_core::Command;
    ///
    /// let frame = Command::SingleSetTotals.frame();
    /// assert_eq!(&frame[..], &[0x43, 0x57, 0x02, 0x44, 0x53, 0x30, 0x03, 0x24]);
    /// ```
    pub fn frame(self) -> Bytes {
        let mut body = BytesMut::with_capacity(4);
        body.put_slice(self.mnemonic().as_bytes());
        body.put_slice(&frames::COMMAND_SEPARATOR);

        let mut buf = BytesMut::with_capacity(frames::COMMAND_HEADER.len() + body.len() + 1);
        buf.put_slice(&frames::COMMAND_HEADER);
        buf.put_slice(&body);
        buf.put_u8(checksum::bcc(&body));

        buf.freeze()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.mnemonic(), hex::encode(self.mnemonic()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command_mnemonics() {
        assert_eq!(Command::ClearData.mnemonic(), "DC");
        assert_eq!(Command::SingleSetTotals.mnemonic(), "DS");
        assert_eq!(Command::TimedTotals.mnemonic(), "DT");
        assert_eq!(Command::BulkScan.mnemonic(), "AS");
        assert_eq!(Command::PartNumber.mnemonic(), "PN");
    }

    #[test]
    fn test_command_frame_bulk_scan() {
        let frame = Command::BulkScan.frame();

        // 41 ^ 53 ^ 30 ^ 03
        assert_eq!(
            frame.as_ref(),
            &[0x43, 0x57, 0x02, 0x41, 0x53, 0x30, 0x03, 0x21]
        );
    }

    #[test]
    fn test_command_frame_checksum_covers_body() {
        for cmd in Command::ALL {
            let frame = cmd.frame();
            assert_eq!(frame.len(), 8);
            assert_eq!(checksum::bcc(&frame[3..7]), frame[7]);
        }
    }

    #[test]
    fn test_destructive_commands() {
        assert!(Command::ClearData.is_destructive());
        assert!(Command::TimedTotals.is_destructive());
        assert!(!Command::SingleSetTotals.is_destructive());
        assert!(!Command::BulkScan.is_destructive());
    }

    #[test]
    fn test_command_display() {
        assert_eq!(Command::SingleSetTotals.to_string(), "DS(4453)");
    }
}
