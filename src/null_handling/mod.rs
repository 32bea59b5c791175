//! This module serves as the public API for all null-handling logic.
//!
//! Host tables describe missing values with a dense boolean mask where `true`
//! means "absent". Arrow columns carry the opposite: a packed validity bitmap
//! where a set bit means "present". Everything that crosses that polarity
//! boundary lives here.

/// The kernel that turns host null masks into Arrow-compatible validity bitmaps.
pub mod bitmap;

pub use self::bitmap::{build_validity, nulls_from_packed, validity_bits, Validity};
