//! # checkweigher-core
//!
//! Core protocol implementation for Yamato CE3000/CE3100 checkweigher controllers.
//!
//! This crate provides the low-level protocol primitives:
//! - Block check character (XOR) calculation
//! - Command definitions and command frame encoding
//! - Response frame validation and payload extraction
//! - Field layout table and payload decoders
//! - Protocol constants

pub mod checksum;
pub mod command;
pub mod constants;
pub mod decode;
pub mod error;
pub mod frame;
pub mod layout;
pub mod session;

pub use command::Command;
pub use decode::{decode_bulk, decode_total};
pub use error::{Error, Result};
pub use frame::ResponseFrame;
pub use layout::{FieldLayout, FieldSpec, RecordKind};
pub use session::{Session, SessionState};
