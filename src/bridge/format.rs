// In: src/bridge/format.rs

//! Defines all on-disk structures and constants for the Feather-style file.
//! This is the single source of truth shared by `FeatherFileWriter` and
//! `FeatherFileReader`.
//!
//! ```text
//! "FEA1" | 4 zero bytes
//! column buffers, each starting on an 8-byte boundary, in append order
//! footer JSON
//! footer length: u32 LE
//! "FEA1"
//! ```

use arrow_schema::Schema;
use serde::{Deserialize, Serialize};

use crate::config::Compression;
use crate::types::ScalarKind;

/// The magic number at both ends of a finalized file.
pub const FILE_MAGIC: &[u8; 4] = b"FEA1";
/// Every buffer starts on a multiple of this many bytes.
pub const BUFFER_ALIGNMENT: u64 = 8;
/// Leading magic plus padding up to the first aligned offset.
pub const HEADER_SIZE: u64 = BUFFER_ALIGNMENT;
/// Footer length + trailing magic.
pub const TRAILER_SIZE: u64 = 4 + FILE_MAGIC.len() as u64;

/// Number of padding bytes needed to bring `offset` onto the buffer alignment.
pub fn padding_for(offset: u64) -> u64 {
    (BUFFER_ALIGNMENT - offset % BUFFER_ALIGNMENT) % BUFFER_ALIGNMENT
}

/// What a stored buffer holds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BufferRole {
    /// Packed validity bitmap, LSB-first, bit = 1 means present.
    Validity,
    /// `i32` LE string offsets, `row_count + 1` entries.
    Offsets,
    /// Dense values: fixed-width elements, packed booleans, string bytes or
    /// categorical codes.
    Values,
    /// `i32` LE offsets of the categorical level strings.
    LevelOffsets,
    /// Concatenated UTF-8 bytes of the categorical levels.
    LevelValues,
}

/// The physical location of one buffer within the file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BufferLocation {
    pub role: BufferRole,
    pub offset: u64,
    /// Bytes stored on disk (after compression, if any).
    pub length: u64,
    /// Bytes after decompression. Equal to `length` for uncompressed files.
    pub uncompressed_length: u64,
}

/// Manifest entry for one column, in append order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ColumnManifestEntry {
    pub name: String,
    pub kind: ScalarKind,
    pub num_rows: u64,
    pub null_count: u64,
    /// Number of categorical levels; zero for every other kind.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub num_levels: u64,
    pub buffers: Vec<BufferLocation>,
}

impl ColumnManifestEntry {
    pub fn buffer(&self, role: BufferRole) -> Option<&BufferLocation> {
        self.buffers.iter().find(|b| b.role == role)
    }
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// The file footer, written only when the file is finalized.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileFooter {
    pub description: String,
    pub num_rows: u64,
    pub num_variables: u64,
    pub version: u16,
    pub writer_version: String,
    #[serde(default)]
    pub compression: Compression,
    /// Arrow schema of the table, one field per column in append order.
    pub schema: Schema,
    pub columns: Vec<ColumnManifestEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_for() {
        assert_eq!(padding_for(0), 0);
        assert_eq!(padding_for(1), 7);
        assert_eq!(padding_for(8), 0);
        assert_eq!(padding_for(13), 3);
    }

    #[test]
    fn test_footer_json_skips_zero_levels() {
        let entry = ColumnManifestEntry {
            name: "a".into(),
            kind: ScalarKind::Int32,
            num_rows: 3,
            null_count: 0,
            num_levels: 0,
            buffers: vec![BufferLocation {
                role: BufferRole::Values,
                offset: 8,
                length: 12,
                uncompressed_length: 12,
            }],
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("num_levels"));
        assert!(json.contains("\"values\""));
        let back: ColumnManifestEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
        assert!(back.buffer(BufferRole::Validity).is_none());
    }
}
