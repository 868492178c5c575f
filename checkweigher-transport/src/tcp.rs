//! TCP link to a controller

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::{error::*, Transport};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// TCP transport with bounded connect and read
pub struct TcpTransport {
    host: String,
    port: u16,
    resolved: Option<SocketAddr>,
    stream: Option<TcpStream>,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl TcpTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            resolved: None,
            stream: None,
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound on each connect attempt
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Bound on each individual read
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Look the host up once and keep the first address
    async fn endpoint(&mut self) -> Result<SocketAddr> {
        if let Some(addr) = self.resolved {
            return Ok(addr);
        }

        let target = format!("{}:{}", self.host, self.port);
        let addr = lookup_host(target.as_str())
            .await
            .map_err(|e| Error::InvalidAddress(format!("{target} ({e})")))?
            .next()
            .ok_or_else(|| Error::InvalidAddress(target.clone()))?;

        self.resolved = Some(addr);
        Ok(addr)
    }

    fn stream(&mut self) -> Result<&mut TcpStream> {
        self.stream.as_mut().ok_or(Error::NotConnected)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Err(Error::AlreadyConnected);
        }

        let addr = self.endpoint().await?;
        debug!("Opening TCP link to {}", addr);

        let stream = match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(stream) => stream?,
            Err(_) => return Err(Error::ConnectionTimeout(self.connect_timeout)),
        };

        // Frames are a few bytes each and strictly request/response
        stream.set_nodelay(true)?;

        self.stream = Some(stream);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };

        debug!("Closing TCP link to {}", self.remote_addr());

        if let Err(e) = stream.shutdown().await {
            trace!("Shutdown failed: {}", e);
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream()?;

        stream.write_all(data).await?;
        stream.flush().await?;

        trace!("Wrote {} bytes", data.len());
        Ok(())
    }

    async fn receive(&mut self, max_len: usize) -> Result<BytesMut> {
        let limit = self.read_timeout;
        let stream = self.stream()?;

        let mut buf = BytesMut::zeroed(max_len);

        let n = match timeout(limit, stream.read(&mut buf)).await {
            Ok(read) => read?,
            Err(_) => {
                warn!("Nothing received within {:?}", limit);
                return Err(Error::ReadTimeout(limit));
            }
        };

        if n == 0 {
            return Err(Error::ConnectionClosed);
        }

        buf.truncate(n);
        trace!("Read {} of up to {} bytes", n, max_len);

        Ok(buf)
    }

    fn remote_addr(&self) -> String {
        match self.resolved {
            Some(addr) => addr.to_string(),
            None => format!("{}:{}", self.host, self.port),
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if self.stream.is_some() {
            warn!("Link to {} dropped without disconnect", self.remote_addr());
        }
    }
}
