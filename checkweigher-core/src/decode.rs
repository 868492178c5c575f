//! Payload decoders
//!
//! Total records are sliced according to a [`FieldLayout`]; bulk records have
//! a fixed 9-byte shape. Neither decoder ever returns a short value: a payload
//! that does not cover the declared widths is an error.

use tracing::{debug, trace};

use checkweigher_types::{BulkRecord, TotalRecord};

use crate::{
    constants::bulk::{RECORD_LEN, WEIGHT_LEN},
    error::{Error, Result},
    layout::{FieldLayout, RecordKind},
};

/// Decode one totals payload into named fields
///
/// Fields are taken in layout order from contiguous, non-overlapping byte
/// ranges starting at offset 0. Trailing payload bytes beyond the declared
/// widths are ignored.
///
/// # Errors
///
/// - [`Error::InvalidLayout`] if the layout has no entry for `kind`
/// - [`Error::PayloadTooShort`] if `payload` is shorter than the summed widths
/// - [`Error::InvalidText`] if a field is not valid UTF-8
///
/// # Examples
///
/// ```
/// use checkweigher_core::{decode_total, FieldLayout, FieldSpec, RecordKind};
///
/// let layout = FieldLayout::new().with_fields(
///     RecordKind::Primary,
///     vec![FieldSpec::new("a", 3), FieldSpec::new("b", 2)],
/// );
///
/// let record = decode_total(b"XYZhi", RecordKind::Primary, &layout).unwrap();
/// assert_eq!(record.get("a"), Some("XYZ"));
/// assert_eq!(record.get("b"), Some("hi"));
/// ```
pub fn decode_total(payload: &[u8], kind: RecordKind, layout: &FieldLayout) -> Result<TotalRecord> {
    let fields = layout.fields(kind)?;

    // Widths whose sum overflows can never be covered by a payload
    let required = fields
        .iter()
        .try_fold(0usize, |width, f| width.checked_add(f.size))
        .unwrap_or(usize::MAX);

    if payload.len() < required {
        return Err(Error::PayloadTooShort {
            kind: kind.into(),
            required,
            actual: payload.len(),
        });
    }

    let mut record = TotalRecord::new();
    let mut cursor = 0;

    for field in fields {
        let end = cursor + field.size;
        debug!("{} - {}:{}", field.name, cursor, field.size);

        let value = text(&payload[cursor..end], &field.name)?;
        record.insert(field.name.clone(), value);

        cursor = end;
    }

    trace!(kind = %kind, fields = record.len(), "Decoded total record");

    Ok(record)
}

/// Decode a bulk payload into consecutive 9-byte records
///
/// ```text
/// ┌──────────────┬───────────┬────────┬──────────┐
/// │    Weight    │ Pass flag │ Region │ Reserved │
/// │   6 bytes    │  1 byte   │ 1 byte │  1 byte  │
/// └──────────────┴───────────┴────────┴──────────┘
/// ```
///
/// # Errors
///
/// - [`Error::BulkFraming`] if the payload is not a whole number of records
/// - [`Error::InvalidText`] if a field is not valid UTF-8
pub fn decode_bulk(payload: &[u8]) -> Result<Vec<BulkRecord>> {
    if payload.len() % RECORD_LEN != 0 {
        return Err(Error::BulkFraming {
            len: payload.len(),
            record_len: RECORD_LEN,
        });
    }

    let records = payload
        .chunks_exact(RECORD_LEN)
        .map(|chunk| {
            Ok(BulkRecord {
                weight: text(&chunk[..WEIGHT_LEN], "weight")?,
                pass_flag: text(&chunk[WEIGHT_LEN..WEIGHT_LEN + 1], "pass flag")?,
                region: text(&chunk[WEIGHT_LEN + 1..WEIGHT_LEN + 2], "region")?,
                reserved: text(&chunk[WEIGHT_LEN + 2..RECORD_LEN], "reserved")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    trace!(records = records.len(), "Decoded bulk block");

    Ok(records)
}

fn text(bytes: &[u8], field: &str) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|source| Error::InvalidText {
            field: field.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FieldSpec;
    use pretty_assertions::assert_eq;

    fn layout() -> FieldLayout {
        FieldLayout::new()
            .with_fields(
                RecordKind::Primary,
                vec![FieldSpec::new("a", 3), FieldSpec::new("b", 2)],
            )
            .with_fields(
                RecordKind::Secondary,
                vec![FieldSpec::new("count", 4), FieldSpec::new("mean", 6)],
            )
    }

    #[test]
    fn test_decode_total() {
        let record = decode_total(b"XYZhi", RecordKind::Primary, &layout()).unwrap();

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a"), Some("XYZ"));
        assert_eq!(record.get("b"), Some("hi"));
    }

    #[test]
    fn test_decode_total_ignores_trailing_bytes() {
        let record = decode_total(b"0012001.50   ", RecordKind::Secondary, &layout()).unwrap();

        assert_eq!(record.get("count"), Some("0012"));
        assert_eq!(record.get("mean"), Some("001.50"));
    }

    #[test]
    fn test_decode_total_short_payload() {
        let result = decode_total(b"XYZh", RecordKind::Primary, &layout());

        assert!(matches!(
            result,
            Err(Error::PayloadTooShort { kind: 1, required: 5, actual: 4 })
        ));
    }

    #[test]
    fn test_decode_total_width_overflow() {
        let layout = FieldLayout::new().with_fields(
            RecordKind::Primary,
            vec![FieldSpec::new("a", usize::MAX), FieldSpec::new("b", 2)],
        );
        let payload = vec![b'0'; RecordKind::Primary.payload_capacity()];

        let result = decode_total(&payload, RecordKind::Primary, &layout);

        assert!(matches!(
            result,
            Err(Error::PayloadTooShort { kind: 1, required: usize::MAX, actual: 156 })
        ));
    }

    #[test]
    fn test_decode_total_missing_kind() {
        let layout = FieldLayout::new().with_fields(RecordKind::Primary, vec![FieldSpec::new("a", 1)]);
        let result = decode_total(b"X", RecordKind::Secondary, &layout);

        assert!(matches!(result, Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_decode_total_invalid_text() {
        let result = decode_total(&[b'X', 0xFF, b'Z', b'h', b'i'], RecordKind::Primary, &layout());

        assert!(matches!(result, Err(Error::InvalidText { field, .. }) if field == "a"));
    }

    #[test]
    fn test_decode_bulk() {
        let records = decode_bulk(b"001234100001250210").unwrap();

        assert_eq!(
            records,
            vec![
                BulkRecord {
                    weight: "001234".into(),
                    pass_flag: "1".into(),
                    region: "0".into(),
                    reserved: "0".into(),
                },
                BulkRecord {
                    weight: "001250".into(),
                    pass_flag: "2".into(),
                    region: "1".into(),
                    reserved: "0".into(),
                },
            ]
        );
    }

    #[test]
    fn test_decode_bulk_empty() {
        assert!(decode_bulk(b"").unwrap().is_empty());
    }

    #[test]
    fn test_decode_bulk_partial_record() {
        let result = decode_bulk(b"0012341000");

        assert!(matches!(
            result,
            Err(Error::BulkFraming { len: 10, record_len: 9 })
        ));
    }
}
