//! Fixed-width branches of the column encoder.
//!
//! One generic routine covers every integer and float width. The host buffer
//! is taken at exactly the declared width: an `int16` buffer is never accepted
//! for an `int32` column, and an untyped byte buffer must hold exactly
//! `row_count * width` bytes. Values under null positions are copied as-is.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, PrimitiveArray};
use arrow::buffer::{BooleanBuffer, ScalarBuffer};

use crate::encoding::{check_row_count, layout_mismatch, RawValues};
use crate::error::Result;
use crate::kernels::bitcast;
use crate::null_handling::Validity;
use crate::traits::HostNative;
use crate::types::ScalarKind;

/// Encodes a dense fixed-width numeric buffer as a `PrimitiveArray`.
pub fn encode_numeric<T: HostNative>(
    values: RawValues<'_>,
    validity: Validity,
    row_count: usize,
) -> Result<ArrayRef> {
    let dense: Vec<T> = match values {
        RawValues::Bytes(bytes) => bitcast::reinterpret::<T>(bytes, row_count)?,
        other => {
            let slice = T::host_slice(&other).ok_or_else(|| layout_mismatch(T::KIND, &other))?;
            check_row_count(row_count, slice.len())?;
            slice.to_vec()
        }
    };

    let array = PrimitiveArray::<T::Arrow>::try_new(ScalarBuffer::from(dense), validity.into_nulls())?;
    Ok(Arc::new(array))
}

/// Encodes a host logical buffer as a bit-packed `BooleanArray`.
///
/// Untyped byte buffers hold one byte per row; any non-zero byte is `true`.
pub fn encode_boolean(values: RawValues<'_>, validity: Validity, row_count: usize) -> Result<ArrayRef> {
    let bits = match values {
        RawValues::Boolean(flags) => {
            check_row_count(row_count, flags.len())?;
            BooleanBuffer::collect_bool(row_count, |i| flags[i])
        }
        RawValues::Bytes(bytes) => {
            let dense = bitcast::reinterpret::<u8>(bytes, row_count)?;
            BooleanBuffer::collect_bool(row_count, |i| dense[i] != 0)
        }
        other => return Err(layout_mismatch(ScalarKind::Boolean, &other)),
    };

    Ok(Arc::new(BooleanArray::new(bits, validity.into_nulls())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeatherError;
    use crate::kernels::bitcast::as_bytes;
    use crate::null_handling::build_validity;
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::{Float64Type, Int32Type, UInt16Type};

    #[test]
    fn test_int32_with_nulls() {
        let validity = build_validity(Some(&[false, false, true]), 3).unwrap();
        let array = encode_numeric::<i32>(RawValues::Int32(&[1, 2, 3]), validity, 3).unwrap();
        let ints = array.as_primitive::<Int32Type>();
        assert_eq!(ints.null_count(), 1);
        assert_eq!(ints.value(0), 1);
        assert_eq!(ints.value(1), 2);
        assert!(ints.is_null(2));
    }

    #[test]
    fn test_null_positions_keep_their_bits() {
        let validity = build_validity(Some(&[false, true]), 2).unwrap();
        let array =
            encode_numeric::<f64>(RawValues::Float64(&[1.5, f64::NAN]), validity, 2).unwrap();
        let floats = array.as_primitive::<Float64Type>();
        assert!(floats.is_null(1));
        assert!(floats.values()[1].is_nan());
    }

    #[test]
    fn test_untyped_bytes_are_reinterpreted() {
        let host: Vec<u16> = vec![7, 65535, 0];
        let validity = build_validity(None, 3).unwrap();
        let array =
            encode_numeric::<u16>(RawValues::Bytes(as_bytes(&host)), validity, 3).unwrap();
        assert_eq!(array.as_primitive::<UInt16Type>().values().as_ref(), &host[..]);
    }

    #[test]
    fn test_no_implicit_widening() {
        let validity = build_validity(None, 3).unwrap();
        let result = encode_numeric::<i32>(RawValues::Int16(&[1, 2, 3]), validity, 3);
        assert!(matches!(result, Err(FeatherError::EncodingError(_))));
    }

    #[test]
    fn test_no_implicit_narrowing_from_bytes() {
        let host: Vec<i64> = vec![1, 2, 3];
        let validity = build_validity(None, 3).unwrap();
        let result = encode_numeric::<i32>(RawValues::Bytes(as_bytes(&host)), validity, 3);
        assert!(matches!(result, Err(FeatherError::EncodingError(_))));
    }

    #[test]
    fn test_typed_buffer_wrong_row_count() {
        let validity = build_validity(None, 4).unwrap();
        let result = encode_numeric::<u8>(RawValues::UInt8(&[1, 2, 3]), validity, 4);
        assert!(matches!(
            result,
            Err(FeatherError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_boolean_from_flags_and_bytes() {
        let validity = build_validity(Some(&[false, true, false]), 3).unwrap();
        let array =
            encode_boolean(RawValues::Boolean(&[true, true, false]), validity.clone(), 3).unwrap();
        let bools = array.as_boolean();
        assert!(bools.value(0));
        assert!(bools.is_null(1));
        assert!(!bools.value(2));

        let from_bytes = encode_boolean(RawValues::Bytes(&[2, 0, 0]), validity, 3).unwrap();
        assert!(from_bytes.as_boolean().value(0));
        assert!(!from_bytes.as_boolean().value(2));
    }

    #[test]
    fn test_boolean_rejects_numeric_buffer() {
        let validity = build_validity(None, 2).unwrap();
        let result = encode_boolean(RawValues::Float64(&[1.0, 0.0]), validity, 2);
        assert!(matches!(result, Err(FeatherError::EncodingError(msg)) if msg.contains("logical")));
    }
}
