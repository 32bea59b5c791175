//! This module defines the canonical, type-safe representation of the column
//! element types the engine can write.
//!
//! Host type tags are resolved exactly once, here. Everything downstream
//! dispatches on the resolved `ScalarKind` and never looks at the tag again.

use crate::error::{FeatherError, Result};
use arrow::datatypes::DataType as ArrowDataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of internal column element types.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalarKind {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Boolean,
    Utf8,
    Categorical,
}

impl ScalarKind {
    /// Every supported kind, in registry order.
    pub const ALL: [ScalarKind; 13] = [
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Float32,
        Self::Float64,
        Self::Boolean,
        Self::Utf8,
        Self::Categorical,
    ];

    /// Resolves a host class name into a `ScalarKind`.
    ///
    /// Matching is exact and case-sensitive. Compound host classes (`struct`,
    /// `cell`, `table`, `function_handle`, ...) have no scalar representation
    /// and fail with `UnsupportedType`.
    pub fn resolve(type_tag: &str) -> Result<Self> {
        match type_tag {
            "int8" => Ok(Self::Int8),
            "int16" => Ok(Self::Int16),
            "int32" => Ok(Self::Int32),
            "int64" => Ok(Self::Int64),
            "uint8" => Ok(Self::UInt8),
            "uint16" => Ok(Self::UInt16),
            "uint32" => Ok(Self::UInt32),
            "uint64" => Ok(Self::UInt64),
            "single" => Ok(Self::Float32),
            "double" => Ok(Self::Float64),
            "logical" => Ok(Self::Boolean),
            "string" => Ok(Self::Utf8),
            "categorical" => Ok(Self::Categorical),
            other => Err(FeatherError::UnsupportedType(format!(
                "host type tag '{}' has no column representation",
                other
            ))),
        }
    }

    /// Resolves a numeric host class code. Only the primitive classes have
    /// codes; string and categorical columns must be resolved by name.
    pub fn from_class_id(class_id: u32) -> Result<Self> {
        match class_id {
            3 => Ok(Self::Boolean),
            6 => Ok(Self::Float64),
            7 => Ok(Self::Float32),
            8 => Ok(Self::Int8),
            9 => Ok(Self::UInt8),
            10 => Ok(Self::Int16),
            11 => Ok(Self::UInt16),
            12 => Ok(Self::Int32),
            13 => Ok(Self::UInt32),
            14 => Ok(Self::Int64),
            15 => Ok(Self::UInt64),
            other => Err(FeatherError::UnsupportedType(format!(
                "host class id {} has no column representation",
                other
            ))),
        }
    }

    /// The canonical host tag for this kind. `resolve(k.tag()) == Ok(k)`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "single",
            Self::Float64 => "double",
            Self::Boolean => "logical",
            Self::Utf8 => "string",
            Self::Categorical => "categorical",
        }
    }

    /// Converts a `ScalarKind` into the Arrow `DataType` used in memory.
    pub fn to_arrow_type(&self) -> ArrowDataType {
        match self {
            Self::Int8 => ArrowDataType::Int8,
            Self::Int16 => ArrowDataType::Int16,
            Self::Int32 => ArrowDataType::Int32,
            Self::Int64 => ArrowDataType::Int64,
            Self::UInt8 => ArrowDataType::UInt8,
            Self::UInt16 => ArrowDataType::UInt16,
            Self::UInt32 => ArrowDataType::UInt32,
            Self::UInt64 => ArrowDataType::UInt64,
            Self::Float32 => ArrowDataType::Float32,
            Self::Float64 => ArrowDataType::Float64,
            Self::Boolean => ArrowDataType::Boolean,
            Self::Utf8 => ArrowDataType::Utf8,
            Self::Categorical => ArrowDataType::Dictionary(
                Box::new(ArrowDataType::Int32),
                Box::new(ArrowDataType::Utf8),
            ),
        }
    }

    /// Converts an Arrow `DataType` back into a `ScalarKind`.
    pub fn from_arrow_type(arrow_type: &ArrowDataType) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| &kind.to_arrow_type() == arrow_type)
            .ok_or_else(|| {
                FeatherError::UnsupportedType(format!(
                    "Arrow type {:?} has no column representation",
                    arrow_type
                ))
            })
    }

    /// Width in bytes of one host element, or `None` for variable-length kinds.
    /// Booleans arrive from the host as one byte per row.
    pub fn byte_width(&self) -> Option<usize> {
        match self {
            Self::Int8 | Self::UInt8 | Self::Boolean => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float32 => Some(4),
            Self::Int64 | Self::UInt64 | Self::Float64 => Some(8),
            Self::Utf8 | Self::Categorical => None,
        }
    }

    /// Returns `true` for kinds encoded from a dense fixed-width buffer.
    pub fn is_fixed_width(&self) -> bool {
        self.byte_width().is_some()
    }
}

/// Provides the canonical string representation for a `ScalarKind`.
impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_tag_resolves_to_a_unique_kind() {
        let mut seen = HashSet::new();
        for kind in ScalarKind::ALL {
            let resolved = ScalarKind::resolve(kind.tag()).unwrap();
            assert_eq!(resolved, kind);
            assert!(seen.insert(resolved), "{} resolved twice", kind);
        }
        assert_eq!(seen.len(), ScalarKind::ALL.len());
    }

    #[test]
    fn test_unresolvable_tags_are_unsupported() {
        for tag in [
            "struct",
            "cell",
            "function_handle",
            "table",
            "char",
            "datetime",
            "",
            "Double",
            "INT32",
            " int32",
        ] {
            let result = ScalarKind::resolve(tag);
            assert!(
                matches!(result, Err(FeatherError::UnsupportedType(_))),
                "tag {:?} should be unsupported",
                tag
            );
        }
    }

    #[test]
    fn test_class_ids_agree_with_names() {
        let pairs = [
            (3, "logical"),
            (6, "double"),
            (7, "single"),
            (8, "int8"),
            (9, "uint8"),
            (10, "int16"),
            (11, "uint16"),
            (12, "int32"),
            (13, "uint32"),
            (14, "int64"),
            (15, "uint64"),
        ];
        for (id, name) in pairs {
            assert_eq!(
                ScalarKind::from_class_id(id).unwrap(),
                ScalarKind::resolve(name).unwrap()
            );
        }
        for id in [0, 1, 2, 4, 5, 16, 17, 18, 99] {
            assert!(matches!(
                ScalarKind::from_class_id(id),
                Err(FeatherError::UnsupportedType(_))
            ));
        }
    }

    #[test]
    fn test_arrow_type_roundtrip() {
        for kind in ScalarKind::ALL {
            assert_eq!(ScalarKind::from_arrow_type(&kind.to_arrow_type()).unwrap(), kind);
        }
        assert!(ScalarKind::from_arrow_type(&ArrowDataType::Float16).is_err());
    }

    #[test]
    fn test_byte_widths() {
        assert_eq!(ScalarKind::Boolean.byte_width(), Some(1));
        assert_eq!(ScalarKind::UInt16.byte_width(), Some(2));
        assert_eq!(ScalarKind::Float32.byte_width(), Some(4));
        assert_eq!(ScalarKind::Int64.byte_width(), Some(8));
        assert!(!ScalarKind::Utf8.is_fixed_width());
        assert!(!ScalarKind::Categorical.is_fixed_width());
    }
}
