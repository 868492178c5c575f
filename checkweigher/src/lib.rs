//! # checkweigher
//!
//! Client for Yamato CE3000/CE3100 checkweigher controllers.
//!
//! ## Features
//!
//! - Connection with bounded retry and explicit timeouts
//! - The 3-step command handshake (ENQ, command, EOT)
//! - BCC verification of every response frame
//! - Configurable field layout for total records
//!
//! ## Quick Start
//!
//! ```no_run
//! use checkweigher::{load_layout, Checkweigher, DeviceConfig};
//!
//! #[tokio::main]
//! async fn main() -> checkweigher::Result<()> {
//!     let layout = load_layout("./configs/checkweigher.yaml")?;
//!
//!     // Connects on first use
//!     let mut device = Checkweigher::new(DeviceConfig::new("192.168.1.50", 1001), layout);
//!
//!     let scan = device.bulk_scan().await?;
//!     println!("{} blocks", scan.len());
//!
//!     device.disconnect().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod exchange;
pub mod handshake;

// Re-exports
pub use config::{load_layout, ConfigError, DeviceConfig};
pub use device::{Checkweigher, Response};
pub use error::{Error, ErrorKind, Result};
pub use exchange::exchange;
pub use handshake::{negotiate, Negotiation};

// Re-export types
pub use checkweigher_core::{checksum::bcc, Command, FieldLayout, FieldSpec, RecordKind, SessionState};
pub use checkweigher_types::{BulkRecord, BulkScan, TotalRecord};
