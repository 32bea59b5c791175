// In: src/bridge/host.rs

//! One table variable as the host hands it over.

use crate::encoding::{self, layout_mismatch, Column, RawValues};
use crate::error::Result;
use crate::null_handling::build_validity;
use crate::types::ScalarKind;

/// A named host buffer plus its type tag and optional null mask.
///
/// Nothing is copied until the variable is encoded.
#[derive(Debug, Clone, Copy)]
pub struct HostVariable<'a> {
    pub name: &'a str,
    /// Host class name, e.g. `"int32"` or `"categorical"`.
    pub type_tag: &'a str,
    pub values: RawValues<'a>,
    /// `true` marks a missing row.
    pub nulls: Option<&'a [bool]>,
}

impl<'a> HostVariable<'a> {
    pub fn new(name: &'a str, type_tag: &'a str, values: RawValues<'a>) -> Self {
        Self {
            name,
            type_tag,
            values,
            nulls: None,
        }
    }

    pub fn with_nulls(mut self, nulls: &'a [bool]) -> Self {
        self.nulls = Some(nulls);
        self
    }

    /// Number of rows the value buffer describes for `kind`.
    fn row_count(&self, kind: ScalarKind) -> Result<usize> {
        let rows = match self.values {
            RawValues::Bytes(bytes) => match kind.byte_width() {
                Some(width) => bytes.len() / width,
                None => return Err(layout_mismatch(kind, &self.values)),
            },
            RawValues::Int8(v) => v.len(),
            RawValues::Int16(v) => v.len(),
            RawValues::Int32(v) => v.len(),
            RawValues::Int64(v) => v.len(),
            RawValues::UInt8(v) => v.len(),
            RawValues::UInt16(v) => v.len(),
            RawValues::UInt32(v) => v.len(),
            RawValues::UInt64(v) => v.len(),
            RawValues::Float32(v) => v.len(),
            RawValues::Float64(v) => v.len(),
            RawValues::Boolean(v) => v.len(),
            RawValues::Strings(v) => v.len(),
            RawValues::Categorical { codes, .. } => codes.len(),
        };
        Ok(rows)
    }

    /// Resolves the type tag, builds the validity bitmap and encodes the values.
    pub fn encode(&self) -> Result<Column> {
        let kind = ScalarKind::resolve(self.type_tag)?;
        let rows = self.row_count(kind)?;
        let validity = build_validity(self.nulls, rows)?;
        encoding::encode_column(self.name, kind, self.values, validity, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeatherError;
    use arrow::array::Array;

    #[test]
    fn test_encode_with_nulls() {
        let values = [1i32, 2, 3];
        let nulls = [false, false, true];
        let column = HostVariable::new("A", "int32", RawValues::Int32(&values))
            .with_nulls(&nulls)
            .encode()
            .unwrap();
        assert_eq!(column.kind(), ScalarKind::Int32);
        assert_eq!(column.len(), 3);
        assert_eq!(column.null_count(), 1);
        assert!(column.array().is_null(2));
    }

    #[test]
    fn test_unknown_tag() {
        let values = [1i32];
        let result = HostVariable::new("A", "complex", RawValues::Int32(&values)).encode();
        assert!(matches!(result, Err(FeatherError::UnsupportedType(t)) if t.contains("complex")));
    }

    #[test]
    fn test_mask_length_mismatch() {
        let values = [1.0f64, 2.0];
        let nulls = [false];
        let result = HostVariable::new("A", "double", RawValues::Float64(&values))
            .with_nulls(&nulls)
            .encode();
        assert!(matches!(
            result,
            Err(FeatherError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_untyped_bytes_with_ragged_length() {
        let bytes = [0u8; 7];
        let result = HostVariable::new("A", "int32", RawValues::Bytes(&bytes)).encode();
        assert!(matches!(result, Err(FeatherError::EncodingError(_))));

        let result = HostVariable::new("A", "string", RawValues::Bytes(&bytes)).encode();
        assert!(matches!(result, Err(FeatherError::EncodingError(_))));
    }

    #[test]
    fn test_untyped_bytes_with_exact_length() {
        let bytes = 7i16.to_le_bytes();
        let column = HostVariable::new("A", "int16", RawValues::Bytes(&bytes))
            .encode()
            .unwrap();
        assert_eq!(column.len(), 1);
    }
}
