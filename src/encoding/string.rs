//! String branch of the column encoder.
//!
//! Builds the Arrow offsets + concatenated bytes representation from one byte
//! sequence per row. Null rows contribute an empty span but still take an
//! offset slot, so `offsets.len() == row_count + 1` always holds.

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::buffer::{Buffer, OffsetBuffer, ScalarBuffer};

use crate::encoding::{check_row_count, layout_mismatch, RawValues};
use crate::error::{FeatherError, Result};
use crate::null_handling::Validity;
use crate::types::ScalarKind;

/// Encodes one UTF-8 byte sequence per row as a `StringArray`.
pub fn encode_strings(values: RawValues<'_>, validity: Validity, row_count: usize) -> Result<ArrayRef> {
    let rows = match values {
        RawValues::Strings(rows) => rows,
        other => return Err(layout_mismatch(ScalarKind::Utf8, &other)),
    };
    check_row_count(row_count, rows.len())?;

    let total: usize = (0..row_count)
        .filter(|&i| validity.is_valid(i))
        .map(|i| rows[i].len())
        .sum();
    if i32::try_from(total).is_err() {
        return Err(FeatherError::EncodingError(format!(
            "string column holds {} bytes, more than 32-bit offsets can address",
            total
        )));
    }

    let mut offsets: Vec<i32> = Vec::with_capacity(row_count + 1);
    let mut bytes: Vec<u8> = Vec::with_capacity(total);
    offsets.push(0);

    for (i, row) in rows.iter().enumerate() {
        if validity.is_valid(i) {
            std::str::from_utf8(row).map_err(|e| {
                FeatherError::EncodingError(format!("row {} is not valid UTF-8: {}", i, e))
            })?;
            bytes.extend_from_slice(row);
        }
        // Fits: the total was checked against i32::MAX above.
        offsets.push(bytes.len() as i32);
    }

    let offsets = OffsetBuffer::new(ScalarBuffer::from(offsets));
    let array = StringArray::try_new(offsets, Buffer::from_vec(bytes), validity.into_nulls())?;
    Ok(Arc::new(array))
}
