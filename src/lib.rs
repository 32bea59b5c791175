//! This file is the root of the `feather_bridge` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`bridge`, `encoding`,
//!     `kernels`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the types a host binding needs to write a table.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod encoding;
pub mod error;
pub mod kernels;
pub mod null_handling;
pub mod traits;
pub mod types;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use bridge::{
    write_table, FeatherFileReader, FeatherFileWriter, FeatherWriter, HostMetadata,
    HostVariable, SessionPhase, TableMetadata, TableWriterSession,
};
pub use config::{Compression, WriterConfig};
pub use encoding::{encode, encode_column, Column, RawValues};
pub use error::{FeatherError, Result};
pub use null_handling::{build_validity, Validity};
pub use observability::enable_verbose_logging;
pub use traits::{HostNative, TableWriter};
pub use types::ScalarKind;
