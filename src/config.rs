// In: src/config.rs

//! The single source of truth for writer configuration.
//!
//! `WriterConfig` is created once at the application boundary (from a JSON
//! document or in code) and handed to `FeatherWriter::open`. Every field has a
//! serde default so partial documents are accepted.

use serde::{Deserialize, Serialize};

use crate::error::Result;

//==================================================================================
// I. Core Configuration Enums & Structs
//==================================================================================

/// How individual column buffers are stored on disk.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(tag = "codec", rename_all = "snake_case")]
pub enum Compression {
    /// **Default:** buffers are written as-is and can be memory-mapped by readers.
    #[default]
    None,

    /// Each buffer is compressed independently with Zstandard.
    Zstd {
        #[serde(default = "default_zstd_level")]
        level: i32,
    },
}

/// The single, unified configuration for writing one file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct WriterConfig {
    /// Buffer compression applied by the file writer.
    #[serde(default)]
    pub compression: Compression,

    /// Capacity of the `BufWriter` in front of the output file.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// If true, the file is synced to stable storage after the footer is written.
    #[serde(default = "default_true")]
    pub sync_on_finalize: bool,

    /// Version recorded when the host metadata does not carry one.
    #[serde(default = "default_version")]
    pub default_version: u16,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            buffer_capacity: default_buffer_capacity(),
            sync_on_finalize: true,
            default_version: default_version(),
        }
    }
}

impl WriterConfig {
    /// Parses a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Helper for `serde` to default a boolean field to true.
fn default_true() -> bool {
    true
}

fn default_buffer_capacity() -> usize {
    64 * 1024
}

fn default_version() -> u16 {
    2
}

fn default_zstd_level() -> i32 {
    3
}
