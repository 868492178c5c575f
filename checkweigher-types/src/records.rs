//! Records returned by the controller commands

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Totals decoded from one or both total records
///
/// Maps field name to the raw ASCII value. Merging the two record kinds of a
/// request is last-write-wins on a shared field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TotalRecord {
    fields: BTreeMap<String, String>,
}

impl TotalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous value if the name was taken
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(name.into(), value.into())
    }

    /// Get a field value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Move every field of `other` into `self`
    pub fn merge(&mut self, other: TotalRecord) {
        self.fields.extend(other.fields);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.fields
    }
}

impl fmt::Display for TotalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Totals[{} fields]", self.fields.len())
    }
}

/// One weighing from a bulk transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkRecord {
    /// Weight digits (6 characters)
    pub weight: String,

    /// Pass flag (1 character)
    pub pass_flag: String,

    /// Region (1 character)
    pub region: String,

    /// Reserved (1 character)
    pub reserved: String,
}

impl fmt::Display for BulkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Weighing[{}](pass={}, region={})",
            self.weight, self.pass_flag, self.region
        )
    }
}

/// Result of a bulk transfer, one entry per received block in arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BulkScan {
    blocks: Vec<Vec<BulkRecord>>,
}

impl BulkScan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the records of the next block
    pub fn push_block(&mut self, records: Vec<BulkRecord>) {
        self.blocks.push(records);
    }

    /// Records grouped by block
    pub fn blocks(&self) -> &[Vec<BulkRecord>] {
        &self.blocks
    }

    /// All records in arrival order
    pub fn records(&self) -> impl Iterator<Item = &BulkRecord> {
        self.blocks.iter().flatten()
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
