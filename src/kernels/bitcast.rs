//! This module contains the pure, stateless kernel for reinterpreting raw host
//! bytes as typed element slices.
//!
//! Host buffers are little-endian and carry no alignment guarantee. An aligned
//! buffer is viewed in place through `bytemuck`; an unaligned one is read
//! element by element. Either way the element count must match exactly.

use std::mem::size_of;

use bytemuck::{Pod, PodCastError};

use crate::error::{FeatherError, Result};

/// Reinterprets `input_bytes` as exactly `expected_len` elements of `T`.
///
/// A byte length that is not `expected_len * size_of::<T>()` means the host
/// buffer was declared with the wrong element width, which is an
/// `EncodingError`, never a silent truncation or widening.
pub fn reinterpret<T: Pod>(input_bytes: &[u8], expected_len: usize) -> Result<Vec<T>> {
    let width = size_of::<T>();
    let expected_bytes = expected_len.checked_mul(width).ok_or_else(|| {
        FeatherError::EncodingError(format!("{} rows overflow the address space", expected_len))
    })?;

    if input_bytes.len() != expected_bytes {
        return Err(FeatherError::EncodingError(format!(
            "buffer of {} bytes cannot hold {} elements of {} ({} bytes each)",
            input_bytes.len(),
            expected_len,
            std::any::type_name::<T>(),
            width
        )));
    }

    match bytemuck::try_cast_slice::<u8, T>(input_bytes) {
        Ok(typed) => Ok(typed.to_vec()),
        Err(PodCastError::TargetAlignmentGreaterAndInputNotAligned) => Ok(input_bytes
            .chunks_exact(width)
            .map(bytemuck::pod_read_unaligned::<T>)
            .collect()),
        Err(e) => Err(e.into()),
    }
}

/// Views a typed slice as its raw bytes.
pub fn as_bytes<T: Pod>(data: &[T]) -> &[u8] {
    bytemuck::cast_slice(data)
}
