//! This module contains the pure, stateless kernel that converts a host null
//! mask into a packed validity bitmap.
//!
//! The bitmap is packed LSB-first, one bit per row, which is the layout Arrow
//! expects for a `NullBuffer`. A mask with no `true` entries produces no bitmap
//! at all; that decision depends only on the mask contents.

use arrow::buffer::{BooleanBuffer, Buffer, NullBuffer};
use bitvec::prelude::*;

use crate::error::{FeatherError, Result};

/// The validity of one column: an optional bitmap plus its cached null count.
#[derive(Debug, Clone, PartialEq)]
pub struct Validity {
    nulls: Option<NullBuffer>,
    null_count: usize,
    len: usize,
}

impl Validity {
    /// A column of `len` rows with no nulls. No bitmap is materialized.
    pub fn all_valid(len: usize) -> Self {
        Self {
            nulls: None,
            null_count: 0,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// The packed bitmap, or `None` when every row is valid.
    pub fn nulls(&self) -> Option<&NullBuffer> {
        self.nulls.as_ref()
    }

    pub fn into_nulls(self) -> Option<NullBuffer> {
        self.nulls
    }

    /// Returns `true` if row `i` holds a value.
    pub fn is_valid(&self, i: usize) -> bool {
        self.nulls.as_ref().map_or(true, |nb| nb.is_valid(i))
    }
}

/// Builds the validity of a column from a host null mask.
///
/// * `mask == None` means every row is valid.
/// * Otherwise the mask must hold exactly `row_count` entries and bit `i` of
///   the result is `!mask[i]`.
pub fn build_validity(mask: Option<&[bool]>, row_count: usize) -> Result<Validity> {
    let mask = match mask {
        None => return Ok(Validity::all_valid(row_count)),
        Some(mask) => mask,
    };

    if mask.len() != row_count {
        return Err(FeatherError::LengthMismatch {
            expected: row_count,
            actual: mask.len(),
        });
    }

    let null_count = mask.iter().filter(|&&is_null| is_null).count();
    if null_count == 0 {
        return Ok(Validity::all_valid(row_count));
    }

    // Invert polarity while packing: true-means-null becomes 1-means-valid.
    let mut bits: BitVec<u8, Lsb0> = mask.iter().map(|&is_null| !is_null).collect();
    bits.set_uninitialized(false);
    let packed = Buffer::from_vec(bits.into_vec());
    let nulls = NullBuffer::new(BooleanBuffer::new(packed, 0, row_count));
    debug_assert_eq!(nulls.null_count(), null_count);

    Ok(Validity {
        nulls: Some(nulls),
        null_count,
        len: row_count,
    })
}

/// Rebuilds a `NullBuffer` from a packed bitmap read back from a file.
pub fn nulls_from_packed(packed: Vec<u8>, row_count: usize) -> Result<Option<NullBuffer>> {
    let needed = row_count.div_ceil(8);
    if packed.len() < needed {
        return Err(FeatherError::FileFormatError(format!(
            "validity bitmap holds {} bytes, {} rows need {}",
            packed.len(),
            row_count,
            needed
        )));
    }
    let nulls = NullBuffer::new(BooleanBuffer::new(Buffer::from_vec(packed), 0, row_count));
    Ok(Some(nulls).filter(|nb| nb.null_count() > 0))
}

/// Expands a validity into one `bool` per row (`true` = valid).
pub fn validity_bits(nulls: Option<&NullBuffer>, row_count: usize) -> Vec<bool> {
    match nulls {
        Some(nb) => (0..row_count).map(|i| nb.is_valid(i)).collect(),
        None => vec![true; row_count],
    }
}
