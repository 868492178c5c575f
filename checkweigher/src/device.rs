//! High-level controller interface

use std::sync::Arc;

use tracing::{debug, info, warn};

use checkweigher_core::{
    constants::{frames, response},
    decode_bulk, decode_total, Command, FieldLayout, RecordKind, ResponseFrame, Session,
    SessionState,
};
use checkweigher_transport::Transport;
use checkweigher_types::{BulkScan, TotalRecord};

use crate::{
    config::DeviceConfig,
    error::{Error, Result},
    exchange::exchange,
    handshake::{negotiate, Negotiation},
};

/// Data returned by [`Checkweigher::execute`]
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// `DC` completed
    Cleared,

    /// `DS` / `DT` totals, both record kinds merged
    Totals(TotalRecord),

    /// `AS` bulk transfer
    Bulk(BulkScan),
}

/// Checkweigher controller
///
/// Owns the single connection to a controller and runs one command at a time.
///
/// # Examples
///
/// ```no_run
/// use checkweigher::{load_layout, Checkweigher, DeviceConfig};
///
/// #[tokio::main]
/// async fn main() -> checkweigher::Result<()> {
///     let layout = load_layout("./configs/checkweigher.yaml")?;
///     let mut device = Checkweigher::new(DeviceConfig::new("192.168.1.50", 1001), layout);
///
///     let totals = device.single_set_totals().await?;
///     for (name, value) in totals.iter() {
///         println!("{name}: {value}");
///     }
///
///     device.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct Checkweigher {
    transport: Box<dyn Transport>,
    session: Session,
    layout: Arc<FieldLayout>,
    config: DeviceConfig,
}

impl Checkweigher {
    /// Create a controller instance using TCP transport
    pub fn new(config: DeviceConfig, layout: Arc<FieldLayout>) -> Self {
        let transport = Box::new(config.transport());
        Self::with_transport(config, layout, transport)
    }

    /// Create a controller instance over an existing transport
    pub fn with_transport(
        config: DeviceConfig,
        layout: Arc<FieldLayout>,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            transport,
            session: Session::new(),
            layout,
            config,
        }
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Connection settings
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Connect to the controller
    ///
    /// Makes up to `retry_attempts` attempts, pausing `retry_delay` between
    /// them. Does nothing if already connected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectFailed`] with the last failure once every
    /// attempt has failed. No further attempts are made.
    pub async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        let addr = self.config.address();
        let attempts = self.config.retry_attempts.max(1);

        info!("Connecting to {}...", addr);
        self.session.begin_connect()?;

        let mut attempt = 1;
        loop {
            match self.transport.connect().await {
                Ok(()) => {
                    self.session.connected()?;
                    info!("Connected to {}", addr);
                    return Ok(());
                }
                Err(e) if attempt < attempts => {
                    warn!("Failed to connect try {}/{}: {}", attempt, attempts, e);
                    tokio::time::sleep(self.config.retry_delay).await;
                    attempt += 1;
                }
                Err(source) => {
                    self.session.close();
                    return Err(Error::ConnectFailed {
                        addr,
                        attempts,
                        source,
                    });
                }
            }
        }
    }

    /// Disconnect from the controller
    ///
    /// Calling this while disconnected is a no-op.
    pub async fn disconnect(&mut self) -> Result<()> {
        if !self.is_connected() {
            debug!("No connection to close");
            return Ok(());
        }

        info!("Closing connection to {}", self.config.address());

        let result = self.transport.disconnect().await;
        self.session.close();

        result.map_err(Error::from)
    }

    /// `DC`: clear accumulated data
    ///
    /// Disabled unless destructive commands are enabled.
    pub async fn clear_data(&mut self) -> Result<()> {
        self.begin(Command::ClearData).await?;
        info!("Data cleared");
        self.finish(Ok(())).await
    }

    /// `DS`: totals for the current set
    pub async fn single_set_totals(&mut self) -> Result<TotalRecord> {
        self.begin(Command::SingleSetTotals).await?;
        let result = self.collect_totals().await;
        self.finish(result).await
    }

    /// `DT`: totals for the timed period
    ///
    /// Disabled unless destructive commands are enabled.
    pub async fn timed_totals(&mut self) -> Result<TotalRecord> {
        self.begin(Command::TimedTotals).await?;
        let result = self.collect_totals().await;
        self.finish(result).await
    }

    /// `AS`: transfer the stored weighings in 20 blocks
    ///
    /// Each block is a 187-byte frame whose 179-byte payload is not a whole
    /// number of 9-byte records. Blocks of that size are rejected with
    /// [`checkweigher_core::Error::BulkFraming`] rather than decoded with a
    /// partial trailing record, so this fails against a controller sending
    /// that geometry until it is confirmed on a device.
    pub async fn bulk_scan(&mut self) -> Result<BulkScan> {
        self.begin(Command::BulkScan).await?;
        let result = self.collect_bulk().await;
        self.finish(result).await
    }

    /// Run `command` and return its data
    pub async fn execute(&mut self, command: Command) -> Result<Response> {
        match command {
            Command::ClearData => self.clear_data().await.map(|()| Response::Cleared),
            Command::SingleSetTotals => self.single_set_totals().await.map(Response::Totals),
            Command::TimedTotals => self.timed_totals().await.map(Response::Totals),
            Command::BulkScan => self.bulk_scan().await.map(Response::Bulk),
            Command::PartNumber => Err(Error::NotSupported(format!("command {}", command))),
        }
    }

    // Helper methods

    fn ensure_allowed(&self, command: Command) -> Result<()> {
        if !command.is_implemented() {
            return Err(Error::NotSupported(format!("command {}", command)));
        }

        if command.is_destructive() && !self.config.allow_destructive {
            warn!("Not tested (destructive command): {}", command);
            return Err(Error::CommandDisabled(command));
        }

        Ok(())
    }

    /// Connect if needed and negotiate `command`
    async fn begin(&mut self, command: Command) -> Result<()> {
        self.ensure_allowed(command)?;

        if !self.is_connected() {
            self.connect().await?;
        }

        self.session.begin_command(command)?;

        match negotiate(self.transport.as_mut(), command).await {
            Ok(Negotiation::Accepted) => {
                self.session.negotiated()?;
                Ok(())
            }
            Ok(Negotiation::Declined(reason)) => {
                self.session.declined()?;
                Err(Error::Declined { command, reason })
            }
            Err(e) => Err(self.abort(e).await),
        }
    }

    /// Close out the command; any failure while receiving closes the connection
    async fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.session.finish_command()?;
                Ok(value)
            }
            Err(e) => Err(self.abort(e).await),
        }
    }

    async fn abort(&mut self, error: Error) -> Error {
        warn!(
            "Command {:?} failed, closing connection: {}",
            self.session.command(),
            error
        );

        if let Err(e) = self.disconnect().await {
            warn!("Failed to close connection: {}", e);
        }

        error
    }

    async fn request_frame(&mut self, request: &[u8], len: usize) -> Result<ResponseFrame> {
        let raw = exchange(self.transport.as_mut(), request, len, None).await?;
        let frame = ResponseFrame::parse(raw)?;

        debug!("BCC passed: {}", frame);

        Ok(frame)
    }

    async fn collect_totals(&mut self) -> Result<TotalRecord> {
        info!("Requesting totals");

        let mut totals = TotalRecord::new();

        for kind in RecordKind::ALL {
            debug!("Response {}", kind);

            let frame = self.request_frame(&kind.request(), kind.response_len()).await?;
            let record = decode_total(&frame.payload(), kind, &self.layout)?;

            totals.merge(record);
        }

        Ok(totals)
    }

    async fn collect_bulk(&mut self) -> Result<BulkScan> {
        info!("Requesting bulk data");

        let mut scan = BulkScan::new();

        for block in 1..=response::BULK_BLOCK_COUNT {
            debug!("Response {}/{}", block, response::BULK_BLOCK_COUNT);

            let frame = self
                .request_frame(&frames::REQUEST_EVEN, response::BULK_BLOCK_LEN)
                .await?;

            scan.push_block(decode_bulk(&frame.payload())?);
        }

        Ok(scan)
    }
}
