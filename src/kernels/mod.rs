//! Pure, stateless byte-level kernels shared by the encoder and the file format.
//!
//! * `bitcast` reinterprets untyped host buffers as typed slices (and back).
//! * `zstd` compresses individual column buffers when the writer is configured to.

pub mod bitcast;
pub mod zstd;
