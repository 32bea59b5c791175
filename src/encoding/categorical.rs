//! Categorical branch of the column encoder.
//!
//! The host supplies one zero-based code per row plus the ordered list of
//! distinct levels. The column stores the levels once, as a dictionary, and
//! the codes as its keys.

use std::sync::Arc;

use arrow::array::{ArrayRef, DictionaryArray, Int32Array, StringArray};
use arrow::buffer::ScalarBuffer;
use arrow::datatypes::Int32Type;
use hashbrown::HashSet;
use num_traits::PrimInt;

use crate::encoding::{check_row_count, layout_mismatch, RawValues};
use crate::error::{FeatherError, Result};
use crate::null_handling::Validity;
use crate::types::ScalarKind;

/// Finds the first non-null code outside `[0, num_levels)`.
///
/// Codes under null positions are never inspected.
pub fn find_out_of_range<I: PrimInt>(
    codes: &[I],
    validity: &Validity,
    num_levels: usize,
) -> Option<(usize, i64)> {
    codes.iter().enumerate().find_map(|(row, code)| {
        if !validity.is_valid(row) {
            return None;
        }
        match code.to_usize() {
            Some(idx) if idx < num_levels => None,
            _ => Some((row, code.to_i64().unwrap_or(i64::MAX))),
        }
    })
}

/// Encodes codes + levels as a `DictionaryArray<Int32Type>` over UTF-8 levels.
pub fn encode_categorical(
    values: RawValues<'_>,
    validity: Validity,
    row_count: usize,
) -> Result<ArrayRef> {
    let (codes, levels) = match values {
        RawValues::Categorical { codes, levels } => (codes, levels),
        other => return Err(layout_mismatch(ScalarKind::Categorical, &other)),
    };
    check_row_count(row_count, codes.len())?;

    let mut distinct = HashSet::with_capacity(levels.len());
    if let Some(dup) = levels.iter().find(|level| !distinct.insert(**level)) {
        return Err(FeatherError::EncodingError(format!(
            "categorical level '{}' appears more than once",
            dup
        )));
    }

    if let Some((row, index)) = find_out_of_range(codes, &validity, levels.len()) {
        return Err(FeatherError::DictionaryIndexOutOfRange {
            row,
            index,
            levels: levels.len(),
        });
    }

    let keys = Int32Array::try_new(ScalarBuffer::from(codes.to_vec()), validity.into_nulls())?;
    let dictionary: ArrayRef = Arc::new(StringArray::from(levels.to_vec()));
    let array = DictionaryArray::<Int32Type>::try_new(keys, dictionary)?;
    Ok(Arc::new(array))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::null_handling::build_validity;
    use arrow::array::{Array, AsArray};

    const COLORS: [&str; 2] = ["red", "blue"];

    #[test]
    fn test_codes_within_levels() {
        let validity = build_validity(None, 3).unwrap();
        let array = encode_categorical(
            RawValues::Categorical {
                codes: &[0, 1, 0],
                levels: &COLORS,
            },
            validity,
            3,
        )
        .unwrap();

        let dict = array.as_dictionary::<Int32Type>();
        assert_eq!(dict.keys().values().as_ref(), &[0, 1, 0]);
        let levels = dict.values().as_string::<i32>();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels.value(0), "red");
        assert_eq!(levels.value(1), "blue");
    }

    #[test]
    fn test_code_past_last_level() {
        let validity = build_validity(None, 2).unwrap();
        let result = encode_categorical(
            RawValues::Categorical {
                codes: &[0, 2],
                levels: &COLORS,
            },
            validity,
            2,
        );
        assert!(matches!(
            result,
            Err(FeatherError::DictionaryIndexOutOfRange {
                row: 1,
                index: 2,
                levels: 2
            })
        ));
    }

    #[test]
    fn test_negative_code() {
        let validity = build_validity(None, 1).unwrap();
        let result = encode_categorical(
            RawValues::Categorical {
                codes: &[-1],
                levels: &COLORS,
            },
            validity,
            1,
        );
        assert!(matches!(
            result,
            Err(FeatherError::DictionaryIndexOutOfRange { index: -1, .. })
        ));
    }

    #[test]
    fn test_out_of_range_code_under_null_is_ignored() {
        let validity = build_validity(Some(&[false, true]), 2).unwrap();
        let array = encode_categorical(
            RawValues::Categorical {
                codes: &[1, 99],
                levels: &COLORS,
            },
            validity,
            2,
        )
        .unwrap();
        assert_eq!(array.null_count(), 1);
        assert!(array.is_null(1));
    }

    #[test]
    fn test_duplicate_levels_rejected() {
        let validity = build_validity(None, 1).unwrap();
        let result = encode_categorical(
            RawValues::Categorical {
                codes: &[0],
                levels: &["a", "a"],
            },
            validity,
            1,
        );
        assert!(matches!(result, Err(FeatherError::EncodingError(_))));
    }

    #[test]
    fn test_find_out_of_range_is_generic_over_code_width() {
        let validity = build_validity(None, 3).unwrap();
        assert_eq!(find_out_of_range::<u8>(&[0, 1, 5], &validity, 3), Some((2, 5)));
        assert_eq!(find_out_of_range::<i64>(&[0, 2, 1], &validity, 3), None);
    }
}
