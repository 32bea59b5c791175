//! This module defines the shared traits used at the seams of the engine.
//!
//! `HostNative` ties a host element type to its Arrow primitive type and its
//! `ScalarKind`, so the numeric encoder can be written once. `TableWriter` is
//! the file-format capability the session drives.

use arrow::datatypes::{
    ArrowNativeType, ArrowPrimitiveType, Float32Type, Float64Type, Int16Type, Int32Type,
    Int64Type, Int8Type, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};

use crate::bridge::metadata::TableMetadata;
use crate::encoding::{Column, RawValues};
use crate::error::Result;
use crate::types::ScalarKind;

/// A fixed-width numeric element as the host lays it out in memory.
pub trait HostNative: ArrowNativeType + bytemuck::Pod {
    /// The Arrow primitive type with the same width and signedness.
    type Arrow: ArrowPrimitiveType<Native = Self>;
    /// The kind this element type encodes as.
    const KIND: ScalarKind;

    /// Borrows the typed host slice if `values` carries this element type.
    fn host_slice<'a>(values: &RawValues<'a>) -> Option<&'a [Self]>;
}

macro_rules! impl_host_native {
    ($native:ty, $arrow:ty, $kind:ident) => {
        impl HostNative for $native {
            type Arrow = $arrow;
            const KIND: ScalarKind = ScalarKind::$kind;

            fn host_slice<'a>(values: &RawValues<'a>) -> Option<&'a [Self]> {
                match *values {
                    RawValues::$kind(slice) => Some(slice),
                    _ => None,
                }
            }
        }
    };
}

impl_host_native!(i8, Int8Type, Int8);
impl_host_native!(i16, Int16Type, Int16);
impl_host_native!(i32, Int32Type, Int32);
impl_host_native!(i64, Int64Type, Int64);
impl_host_native!(u8, UInt8Type, UInt8);
impl_host_native!(u16, UInt16Type, UInt16);
impl_host_native!(u32, UInt32Type, UInt32);
impl_host_native!(u64, UInt64Type, UInt64);
impl_host_native!(f32, Float32Type, Float32);
impl_host_native!(f64, Float64Type, Float64);

/// The underlying file-format writer.
///
/// Append order is on-disk column order. `finalize` is called at most once,
/// after every column, and is the only call that makes the output readable.
pub trait TableWriter {
    /// Appends one encoded column. Ownership of the column moves into the writer.
    fn append_column(&mut self, column: Column) -> Result<()>;

    /// Commits table-level metadata and closes the output.
    fn finalize(&mut self, metadata: &TableMetadata) -> Result<()>;
}
