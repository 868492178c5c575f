//! Link-level errors

use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No open connection")]
    NotConnected,

    #[error("Connection already open")]
    AlreadyConnected,

    #[error("Connect timed out after {0:?}")]
    ConnectionTimeout(Duration),

    #[error("No data within {0:?}")]
    ReadTimeout(Duration),

    #[error("Controller closed the connection")]
    ConnectionClosed,

    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot resolve {0}")]
    InvalidAddress(String),
}
