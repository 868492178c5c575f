//! Type definitions for checkweigher

pub mod records;

pub use records::{BulkRecord, BulkScan, TotalRecord};
