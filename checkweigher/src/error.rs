//! High-level error types

use checkweigher_core::Command;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] checkweigher_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] checkweigher_transport::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to connect to {addr} after {attempts} attempts: {source}")]
    ConnectFailed {
        addr: String,
        attempts: usize,
        #[source]
        source: checkweigher_transport::Error,
    },

    #[error("Device declined command {command}: {reason}")]
    Declined {
        command: Command,
        #[source]
        reason: checkweigher_core::Error,
    },

    #[error("Command {0} alters controller state and is disabled")]
    CommandDisabled(Command),

    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

/// Error categories as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid field layout
    Configuration,
    /// Could not establish the connection
    Connection,
    /// Send or receive failed mid-exchange
    Transport,
    /// Response frame failed BCC verification
    Checksum,
    /// Unexpected reply, DLE EOT or NAK
    Protocol,
    /// Payload did not match the declared record shape
    Decoding,
    /// Command refused locally
    Usage,
}

impl Error {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        use checkweigher_core::Error as Core;

        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::ConnectFailed { .. } => ErrorKind::Connection,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Declined { .. } => ErrorKind::Protocol,
            Self::CommandDisabled(_) | Self::NotSupported(_) => ErrorKind::Usage,
            Self::Core(e) => match e {
                Core::ChecksumMismatch { .. } | Core::FrameTooShort { .. } => ErrorKind::Checksum,
                Core::InvalidLayout(_) => ErrorKind::Configuration,
                Core::InvalidSessionState(_) => ErrorKind::Usage,
                e if e.is_decoding() => ErrorKind::Decoding,
                _ => ErrorKind::Protocol,
            },
        }
    }

    /// Check if the connection must be closed
    ///
    /// Anything that leaves the exchange half-way through is fatal. A
    /// handshake declined at its first step and commands refused before any
    /// traffic are not.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Declined { .. } | Self::CommandDisabled(_) | Self::NotSupported(_)
        )
    }

    /// Check if re-issuing the command might succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Declined { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkweigher_core::Error as Core;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::from(Core::ChecksumMismatch { calculated: 1, received: 2 }).kind(),
            ErrorKind::Checksum
        );
        assert_eq!(Error::from(Core::NegativeAcknowledge).kind(), ErrorKind::Protocol);
        assert_eq!(
            Error::from(Core::BulkFraming { len: 10, record_len: 9 }).kind(),
            ErrorKind::Decoding
        );
        assert_eq!(
            Error::from(checkweigher_transport::Error::ConnectionClosed).kind(),
            ErrorKind::Transport
        );
        assert_eq!(Error::CommandDisabled(Command::ClearData).kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_declined_is_recoverable() {
        let err = Error::Declined {
            command: Command::SingleSetTotals,
            reason: Core::NegativeAcknowledge,
        };

        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("NAK"));
    }

    #[test]
    fn test_fatal_errors() {
        assert!(Error::from(Core::EndOfTransmission).is_fatal());
        assert!(Error::from(checkweigher_transport::Error::NotConnected).is_fatal());
        assert!(!Error::CommandDisabled(Command::TimedTotals).is_fatal());
    }
}
