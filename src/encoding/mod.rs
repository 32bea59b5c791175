//! The column encoder: the dispatch core of the engine.
//!
//! A host variable arrives as a resolved `ScalarKind`, a borrowed `RawValues`
//! buffer and a `Validity` built by `null_handling`. `encode` selects exactly
//! one branch per kind and produces an Arrow array whose values, validity
//! bitmap and null count describe the column the file writer will append.
//!
//! Encoding is pure. Nothing here touches the output file.

use arrow::array::{Array, ArrayRef};
use arrow::buffer::NullBuffer;

use crate::error::{FeatherError, Result};
use crate::null_handling::Validity;
use crate::types::ScalarKind;

pub mod categorical;
pub mod numeric;
pub mod string;

//==================================================================================
// 1. Host Buffers
//==================================================================================

/// A dense value buffer borrowed from the host for the duration of one encode.
///
/// The typed variants carry the host's own element type. `Bytes` carries an
/// untyped little-endian buffer that is reinterpreted at the declared kind's
/// width.
#[derive(Debug, Clone, Copy)]
pub enum RawValues<'a> {
    Bytes(&'a [u8]),
    Int8(&'a [i8]),
    Int16(&'a [i16]),
    Int32(&'a [i32]),
    Int64(&'a [i64]),
    UInt8(&'a [u8]),
    UInt16(&'a [u16]),
    UInt32(&'a [u32]),
    UInt64(&'a [u64]),
    Float32(&'a [f32]),
    Float64(&'a [f64]),
    Boolean(&'a [bool]),
    /// One independently-lengthed UTF-8 byte sequence per row.
    Strings(&'a [&'a [u8]]),
    /// Zero-based level codes, one per row, plus the ordered distinct levels.
    Categorical {
        codes: &'a [i32],
        levels: &'a [&'a str],
    },
}

impl RawValues<'_> {
    /// A short name for the buffer layout, used in error messages.
    pub fn layout_name(&self) -> &'static str {
        match self {
            Self::Bytes(_) => "untyped bytes",
            Self::Int8(_) => "int8",
            Self::Int16(_) => "int16",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::UInt8(_) => "uint8",
            Self::UInt16(_) => "uint16",
            Self::UInt32(_) => "uint32",
            Self::UInt64(_) => "uint64",
            Self::Float32(_) => "single",
            Self::Float64(_) => "double",
            Self::Boolean(_) => "logical",
            Self::Strings(_) => "string",
            Self::Categorical { .. } => "categorical",
        }
    }
}

pub(crate) fn layout_mismatch(kind: ScalarKind, values: &RawValues<'_>) -> FeatherError {
    FeatherError::EncodingError(format!(
        "declared type '{}' does not match a {} buffer",
        kind.tag(),
        values.layout_name()
    ))
}

pub(crate) fn check_row_count(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(FeatherError::LengthMismatch { expected, actual });
    }
    Ok(())
}

//==================================================================================
// 2. The Encoded Column
//==================================================================================

/// One encoded, named column ready to be appended to a file.
///
/// `array.len()` is the row count, and the array's null buffer is the validity
/// bitmap (absent when the column has no nulls).
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    kind: ScalarKind,
    array: ArrayRef,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ScalarKind, array: ArrayRef) -> Self {
        Self {
            name: name.into(),
            kind,
            array,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub fn array(&self) -> &ArrayRef {
        &self.array
    }

    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.array.null_count()
    }

    pub fn nulls(&self) -> Option<&NullBuffer> {
        self.array.nulls()
    }

    pub fn into_parts(self) -> (String, ScalarKind, ArrayRef) {
        (self.name, self.kind, self.array)
    }
}

//==================================================================================
// 3. Dispatch
//==================================================================================

/// Encodes one host buffer as an Arrow array of the given kind.
pub fn encode(
    kind: ScalarKind,
    values: RawValues<'_>,
    validity: Validity,
    row_count: usize,
) -> Result<ArrayRef> {
    check_row_count(row_count, validity.len())?;

    match kind {
        ScalarKind::Int8 => numeric::encode_numeric::<i8>(values, validity, row_count),
        ScalarKind::Int16 => numeric::encode_numeric::<i16>(values, validity, row_count),
        ScalarKind::Int32 => numeric::encode_numeric::<i32>(values, validity, row_count),
        ScalarKind::Int64 => numeric::encode_numeric::<i64>(values, validity, row_count),
        ScalarKind::UInt8 => numeric::encode_numeric::<u8>(values, validity, row_count),
        ScalarKind::UInt16 => numeric::encode_numeric::<u16>(values, validity, row_count),
        ScalarKind::UInt32 => numeric::encode_numeric::<u32>(values, validity, row_count),
        ScalarKind::UInt64 => numeric::encode_numeric::<u64>(values, validity, row_count),
        ScalarKind::Float32 => numeric::encode_numeric::<f32>(values, validity, row_count),
        ScalarKind::Float64 => numeric::encode_numeric::<f64>(values, validity, row_count),
        ScalarKind::Boolean => numeric::encode_boolean(values, validity, row_count),
        ScalarKind::Utf8 => string::encode_strings(values, validity, row_count),
        ScalarKind::Categorical => categorical::encode_categorical(values, validity, row_count),
    }
}

/// Encodes one host buffer and names the resulting column.
pub fn encode_column(
    name: &str,
    kind: ScalarKind,
    values: RawValues<'_>,
    validity: Validity,
    row_count: usize,
) -> Result<Column> {
    let array = encode(kind, values, validity, row_count)?;
    debug_assert_eq!(array.data_type(), &kind.to_arrow_type());
    Ok(Column::new(name, kind, array))
}

/// Builds a column directly from an existing Arrow array, resolving its kind.
pub fn column_from_array(name: &str, array: ArrayRef) -> Result<Column> {
    let kind = ScalarKind::from_arrow_type(array.data_type())?;
    Ok(Column::new(name, kind, array))
}
