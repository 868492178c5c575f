//! Field layout table for total records
//!
//! The controller sends totals as two fixed-width ASCII records. Which bytes
//! belong to which field differs between firmware versions, so the layout is
//! supplied as configuration rather than hardcoded:
//!
//! ```yaml
//! dataFields:
//!   1:
//!     - name: Product number
//!       size: 4
//!     - name: Total count
//!       size: 7
//!   2:
//!     - name: Over weight count
//!       size: 7
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    constants::{frames, response},
    error::{Error, Result},
};

/// Total record format
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum RecordKind {
    /// First totals block (164-byte frame)
    Primary = 1,

    /// Second totals block (220-byte frame)
    Secondary = 2,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [Self::Primary, Self::Secondary];

    /// Frame that requests this block once the handshake completed
    pub fn request(self) -> [u8; 4] {
        match self {
            Self::Primary => frames::REQUEST_EVEN,
            Self::Secondary => frames::REQUEST_ODD,
        }
    }

    /// Length of the frame the controller answers with
    pub fn response_len(self) -> usize {
        match self {
            Self::Primary => response::TOTALS_PRIMARY_LEN,
            Self::Secondary => response::TOTALS_SECONDARY_LEN,
        }
    }

    /// Payload bytes available to the layout
    pub fn payload_capacity(self) -> usize {
        response::payload_len(self.response_len())
    }
}

impl From<RecordKind> for u8 {
    fn from(kind: RecordKind) -> u8 {
        kind as u8
    }
}

impl TryFrom<u8> for RecordKind {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Primary),
            2 => Ok(Self::Secondary),
            _ => Err(Error::InvalidRecordKind(value)),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// One named, fixed-width field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Key in the decoded record
    pub name: String,

    /// Width in bytes
    pub size: usize,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Ordered field widths per record kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLayout {
    #[serde(rename = "dataFields")]
    data_fields: BTreeMap<u8, Vec<FieldSpec>>,
}

impl FieldLayout {
    /// Create an empty layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fields of `kind`, replacing any previous definition
    pub fn with_fields(mut self, kind: RecordKind, fields: Vec<FieldSpec>) -> Self {
        self.data_fields.insert(kind.into(), fields);
        self
    }

    /// Get the ordered fields of `kind`
    pub fn fields(&self, kind: RecordKind) -> Result<&[FieldSpec]> {
        self.data_fields
            .get(&u8::from(kind))
            .map(Vec::as_slice)
            .ok_or_else(|| Error::InvalidLayout(format!("no fields defined for record kind {kind}")))
    }

    /// Sum of the widths declared for `kind`
    ///
    /// A sum that does not fit in `usize` is an [`Error::InvalidLayout`].
    pub fn total_width(&self, kind: RecordKind) -> Result<usize> {
        self.fields(kind)?
            .iter()
            .try_fold(0usize, |width, f| width.checked_add(f.size))
            .ok_or_else(|| Error::InvalidLayout(format!("field widths of record kind {kind} overflow")))
    }

    /// Check the layout against the frames the controller sends
    ///
    /// Both record kinds must be present, every field must be named and
    /// non-empty, and the declared widths must fit the payload of the kind.
    pub fn validate(&self) -> Result<()> {
        if let Some(kind) = self.data_fields.keys().find(|k| RecordKind::try_from(**k).is_err()) {
            return Err(Error::InvalidLayout(format!(
                "unknown record kind {kind} (expected 1 or 2)"
            )));
        }

        for kind in RecordKind::ALL {
            let fields = self.fields(kind)?;

            if let Some(field) = fields.iter().find(|f| f.name.trim().is_empty()) {
                return Err(Error::InvalidLayout(format!(
                    "record kind {kind} has a field without a name (size {})",
                    field.size
                )));
            }

            if let Some(field) = fields.iter().find(|f| f.size == 0) {
                return Err(Error::InvalidLayout(format!(
                    "field '{}' of record kind {kind} has zero width",
                    field.name
                )));
            }

            let width = self.total_width(kind)?;
            if width > kind.payload_capacity() {
                return Err(Error::InvalidLayout(format!(
                    "record kind {kind} declares {width} bytes but frames carry {}",
                    kind.payload_capacity()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> FieldLayout {
        FieldLayout::new()
            .with_fields(
                RecordKind::Primary,
                vec![FieldSpec::new("a", 3), FieldSpec::new("b", 2)],
            )
            .with_fields(RecordKind::Secondary, vec![FieldSpec::new("c", 10)])
    }

    #[test]
    fn test_record_kind_conversion() {
        assert_eq!(u8::from(RecordKind::Primary), 1);
        assert_eq!(RecordKind::try_from(2).unwrap(), RecordKind::Secondary);
        assert!(matches!(
            RecordKind::try_from(3),
            Err(Error::InvalidRecordKind(3))
        ));
        assert!(matches!(
            RecordKind::try_from(0),
            Err(Error::InvalidRecordKind(0))
        ));
    }

    #[test]
    fn test_record_kind_geometry() {
        assert_eq!(RecordKind::Primary.payload_capacity(), 156);
        assert_eq!(RecordKind::Secondary.payload_capacity(), 212);
        assert_eq!(RecordKind::Primary.request(), [0x43, 0x57, 0x10, 0x30]);
        assert_eq!(RecordKind::Secondary.request(), [0x43, 0x57, 0x10, 0x31]);
    }

    #[test]
    fn test_total_width() {
        let layout = sample();
        assert_eq!(layout.total_width(RecordKind::Primary).unwrap(), 5);
        assert_eq!(layout.total_width(RecordKind::Secondary).unwrap(), 10);
    }

    #[test]
    fn test_validate_ok() {
        sample().validate().unwrap();
    }

    #[test]
    fn test_validate_missing_kind() {
        let layout = FieldLayout::new().with_fields(RecordKind::Primary, vec![FieldSpec::new("a", 1)]);
        assert!(matches!(layout.validate(), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_validate_zero_width() {
        let layout = sample().with_fields(RecordKind::Secondary, vec![FieldSpec::new("c", 0)]);
        assert!(matches!(layout.validate(), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_validate_exceeds_frame() {
        let layout = sample().with_fields(RecordKind::Primary, vec![FieldSpec::new("a", 157)]);
        assert!(matches!(layout.validate(), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_validate_width_overflow() {
        let layout = sample().with_fields(
            RecordKind::Primary,
            vec![FieldSpec::new("a", usize::MAX), FieldSpec::new("b", 2)],
        );

        assert!(matches!(
            layout.total_width(RecordKind::Primary),
            Err(Error::InvalidLayout(_))
        ));
        assert!(matches!(layout.validate(), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_validate_width_overflow_from_yaml() {
        let yaml = r#"
dataFields:
  1:
    - name: a
      size: 18446744073709551615
    - name: b
      size: 2
  2:
    - name: c
      size: 1
"#;
        let layout: FieldLayout = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(layout.validate(), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_deserialize_yaml() {
        let yaml = r#"
dataFields:
  1:
    - name: Product number
      size: 4
    - name: Total count
      size: 7
  2:
    - name: Over weight count
      size: 7
"#;
        let layout: FieldLayout = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            layout.fields(RecordKind::Primary).unwrap(),
            &[
                FieldSpec::new("Product number", 4),
                FieldSpec::new("Total count", 7)
            ]
        );
        assert_eq!(layout.total_width(RecordKind::Secondary).unwrap(), 7);
        layout.validate().unwrap();
    }
}
