//! Transport layer for the checkweigher protocol
//!
//! Provides the TCP link to a controller.

pub mod error;
pub mod tcp;

pub use error::{Error, Result};
pub use tcp::TcpTransport;

use async_trait::async_trait;
use bytes::BytesMut;

/// Transport trait for the controller link
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to device
    async fn connect(&mut self) -> Result<()>;

    /// Disconnect from device (no-op when not connected)
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send raw bytes
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive whatever is available, at most `max_len` bytes (with timeout)
    ///
    /// Never returns an empty buffer: a closed peer is
    /// [`Error::ConnectionClosed`].
    async fn receive(&mut self, max_len: usize) -> Result<BytesMut>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}
