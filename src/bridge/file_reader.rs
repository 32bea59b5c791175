// In: src/bridge/file_reader.rs

//! Reads finalized files back into Arrow arrays.
//!
//! The reader is the read-back half of the format: it locates the footer from
//! the trailer, validates every buffer location against the data region, and
//! rebuilds each column with its validity bitmap. Files that were never
//! finalized have no trailer and are rejected on open.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, DictionaryArray, Int32Array, PrimitiveArray, StringArray};
use arrow::buffer::{BooleanBuffer, Buffer, NullBuffer, OffsetBuffer, ScalarBuffer};
use arrow::datatypes::Int32Type;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow_schema::SchemaRef;

use crate::bridge::format::{
    BufferLocation, BufferRole, ColumnManifestEntry, FileFooter, FILE_MAGIC, HEADER_SIZE,
    TRAILER_SIZE,
};
use crate::bridge::metadata::TableMetadata;
use crate::config::Compression;
use crate::error::{FeatherError, Result};
use crate::kernels::{self, bitcast};
use crate::null_handling::nulls_from_packed;
use crate::traits::HostNative;
use crate::types::ScalarKind;

/// A random-access reader over one finalized file.
#[derive(Debug)]
pub struct FeatherFileReader<R: Read + Seek> {
    reader: R,
    footer: FileFooter,
    /// End of the column data region (start of the footer).
    data_end: u64,
}

fn format_error(msg: impl Into<String>) -> FeatherError {
    FeatherError::FileFormatError(msg.into())
}

/// Decoded size of a one-bit-per-row buffer.
fn bitmap_len(rows: usize) -> u64 {
    rows.div_ceil(8) as u64
}

/// Decoded size of `count` elements of `width` bytes each.
fn fixed_len(entry: &ColumnManifestEntry, count: usize, width: usize) -> Result<u64> {
    count
        .checked_mul(width)
        .map(|n| n as u64)
        .ok_or_else(|| format_error(format!("column '{}' declares too many rows", entry.name)))
}

impl FeatherFileReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> FeatherFileReader<R> {
    /// Validates the header and trailer and parses the footer.
    pub fn new(mut reader: R) -> Result<Self> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        if file_len < HEADER_SIZE + TRAILER_SIZE {
            return Err(format_error(format!(
                "file of {} bytes is too small to be a finalized table",
                file_len
            )));
        }

        let mut magic = [0u8; 4];
        reader.seek(SeekFrom::Start(0))?;
        reader.read_exact(&mut magic)?;
        if &magic != FILE_MAGIC {
            return Err(format_error("invalid leading magic number"));
        }

        let mut trailer = [0u8; TRAILER_SIZE as usize];
        reader.seek(SeekFrom::Start(file_len - TRAILER_SIZE))?;
        reader.read_exact(&mut trailer)?;
        if &trailer[4..] != FILE_MAGIC {
            return Err(format_error(
                "missing trailing magic number; the file was never finalized",
            ));
        }

        let footer_len = u64::from(u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]));
        let data_end = (file_len - TRAILER_SIZE)
            .checked_sub(footer_len)
            .filter(|&start| start >= HEADER_SIZE)
            .ok_or_else(|| format_error(format!("footer length {} exceeds the file", footer_len)))?;

        let mut footer_bytes = vec![0u8; footer_len as usize];
        reader.seek(SeekFrom::Start(data_end))?;
        reader.read_exact(&mut footer_bytes)?;
        let footer: FileFooter = serde_json::from_slice(&footer_bytes)?;

        if footer.columns.len() as u64 != footer.num_variables
            || footer.schema.fields().len() != footer.columns.len()
        {
            return Err(format_error(format!(
                "footer lists {} columns but declares {} variables",
                footer.columns.len(),
                footer.num_variables
            )));
        }

        if let Some(entry) = footer.columns.iter().find(|c| c.num_rows != footer.num_rows) {
            return Err(format_error(format!(
                "column '{}' has {} rows, table declares {}",
                entry.name, entry.num_rows, footer.num_rows
            )));
        }

        Ok(Self {
            reader,
            footer,
            data_end,
        })
    }

    pub fn footer(&self) -> &FileFooter {
        &self.footer
    }

    pub fn metadata(&self) -> TableMetadata {
        TableMetadata::new(
            self.footer.description.clone(),
            self.footer.num_rows,
            self.footer.num_variables,
            self.footer.version,
        )
    }

    pub fn schema(&self) -> SchemaRef {
        Arc::new(self.footer.schema.clone())
    }

    pub fn num_columns(&self) -> usize {
        self.footer.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.footer.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn manifest(&self, index: usize) -> Option<&ColumnManifestEntry> {
        self.footer.columns.get(index)
    }

    /// Reads one buffer, decompressing it if the file was written compressed.
    ///
    /// The declared decoded size must equal `expected_len`, checked before
    /// anything is allocated.
    fn read_buffer(&mut self, location: &BufferLocation, expected_len: u64) -> Result<Vec<u8>> {
        let in_bounds = location
            .offset
            .checked_add(location.length)
            .is_some_and(|end| location.offset >= HEADER_SIZE && end <= self.data_end);
        if !in_bounds {
            return Err(format_error(format!(
                "{:?} buffer at {}+{} lies outside the data region",
                location.role, location.offset, location.length
            )));
        }
        if location.uncompressed_length != expected_len {
            return Err(format_error(format!(
                "{:?} buffer declares {} bytes, expected {}",
                location.role, location.uncompressed_length, expected_len
            )));
        }

        let mut stored = vec![0u8; location.length as usize];
        self.reader.seek(SeekFrom::Start(location.offset))?;
        self.reader.read_exact(&mut stored)?;

        match self.footer.compression {
            Compression::None if location.length != location.uncompressed_length => {
                Err(format_error(format!(
                    "uncompressed {:?} buffer stores {} bytes but declares {}",
                    location.role, location.length, location.uncompressed_length
                )))
            }
            Compression::None => Ok(stored),
            Compression::Zstd { .. } => {
                kernels::zstd::decompress(&stored, location.uncompressed_length as usize)
            }
        }
    }

    fn read_role(
        &mut self,
        entry: &ColumnManifestEntry,
        role: BufferRole,
        expected_len: u64,
    ) -> Result<Vec<u8>> {
        let location = entry.buffer(role).cloned().ok_or_else(|| {
            format_error(format!("column '{}' has no {:?} buffer", entry.name, role))
        })?;
        self.read_buffer(&location, expected_len)
    }

    fn read_nulls(&mut self, entry: &ColumnManifestEntry, rows: usize) -> Result<Option<NullBuffer>> {
        if entry.null_count == 0 {
            return Ok(None);
        }
        let packed = self.read_role(entry, BufferRole::Validity, bitmap_len(rows))?;
        let nulls = nulls_from_packed(packed, rows)?;
        let found = nulls.as_ref().map_or(0, |nb| nb.null_count()) as u64;
        if found != entry.null_count {
            return Err(format_error(format!(
                "column '{}' declares {} nulls, bitmap holds {}",
                entry.name, entry.null_count, found
            )));
        }
        Ok(nulls)
    }

    fn read_offsets(&mut self, entry: &ColumnManifestEntry, role: BufferRole, count: usize) -> Result<OffsetBuffer<i32>> {
        let slots = count
            .checked_add(1)
            .ok_or_else(|| format_error(format!("column '{}' declares too many rows", entry.name)))?;
        let bytes = self.read_role(entry, role, fixed_len(entry, slots, 4)?)?;
        let offsets = bitcast::reinterpret::<i32>(&bytes, slots)
            .map_err(|e| format_error(format!("column '{}': {}", entry.name, e)))?;
        if offsets[0] != 0 || offsets.windows(2).any(|w| w[1] < w[0]) {
            return Err(format_error(format!(
                "column '{}' has non-monotonic {:?}",
                entry.name, role
            )));
        }
        Ok(OffsetBuffer::new(ScalarBuffer::from(offsets)))
    }

    /// Reads the bytes spanned by already-validated `offsets`.
    fn read_span(
        &mut self,
        entry: &ColumnManifestEntry,
        role: BufferRole,
        offsets: &OffsetBuffer<i32>,
    ) -> Result<Buffer> {
        let span = offsets.last().copied().unwrap_or(0) as u64;
        let data = self.read_role(entry, role, span)?;
        Ok(Buffer::from_vec(data))
    }

    fn read_primitive<T: HostNative>(
        &mut self,
        entry: &ColumnManifestEntry,
        rows: usize,
        nulls: Option<NullBuffer>,
    ) -> Result<ArrayRef> {
        let len = fixed_len(entry, rows, std::mem::size_of::<T>())?;
        let bytes = self.read_role(entry, BufferRole::Values, len)?;
        let values = bitcast::reinterpret::<T>(&bytes, rows)
            .map_err(|e| format_error(format!("column '{}': {}", entry.name, e)))?;
        let array = PrimitiveArray::<T::Arrow>::try_new(ScalarBuffer::from(values), nulls)?;
        Ok(Arc::new(array))
    }

    /// Reconstructs the column at `index`.
    pub fn column(&mut self, index: usize) -> Result<ArrayRef> {
        let entry = self
            .footer
            .columns
            .get(index)
            .cloned()
            .ok_or_else(|| format_error(format!("no column at index {}", index)))?;
        let rows = usize::try_from(entry.num_rows)
            .map_err(|_| format_error(format!("column '{}' is too long", entry.name)))?;
        let nulls = self.read_nulls(&entry, rows)?;

        match entry.kind {
            ScalarKind::Int8 => self.read_primitive::<i8>(&entry, rows, nulls),
            ScalarKind::Int16 => self.read_primitive::<i16>(&entry, rows, nulls),
            ScalarKind::Int32 => self.read_primitive::<i32>(&entry, rows, nulls),
            ScalarKind::Int64 => self.read_primitive::<i64>(&entry, rows, nulls),
            ScalarKind::UInt8 => self.read_primitive::<u8>(&entry, rows, nulls),
            ScalarKind::UInt16 => self.read_primitive::<u16>(&entry, rows, nulls),
            ScalarKind::UInt32 => self.read_primitive::<u32>(&entry, rows, nulls),
            ScalarKind::UInt64 => self.read_primitive::<u64>(&entry, rows, nulls),
            ScalarKind::Float32 => self.read_primitive::<f32>(&entry, rows, nulls),
            ScalarKind::Float64 => self.read_primitive::<f64>(&entry, rows, nulls),
            ScalarKind::Boolean => {
                let packed = self.read_role(&entry, BufferRole::Values, bitmap_len(rows))?;
                let bits = BooleanBuffer::new(Buffer::from_vec(packed), 0, rows);
                Ok(Arc::new(BooleanArray::new(bits, nulls)))
            }
            ScalarKind::Utf8 => {
                let offsets = self.read_offsets(&entry, BufferRole::Offsets, rows)?;
                let data = self.read_span(&entry, BufferRole::Values, &offsets)?;
                let array = StringArray::try_new(offsets, data, nulls)?;
                Ok(Arc::new(array))
            }
            ScalarKind::Categorical => {
                let len = fixed_len(&entry, rows, 4)?;
                let code_bytes = self.read_role(&entry, BufferRole::Values, len)?;
                let codes = bitcast::reinterpret::<i32>(&code_bytes, rows)
                    .map_err(|e| format_error(format!("column '{}': {}", entry.name, e)))?;
                let num_levels = usize::try_from(entry.num_levels)
                    .map_err(|_| format_error("too many levels"))?;
                let level_offsets =
                    self.read_offsets(&entry, BufferRole::LevelOffsets, num_levels)?;
                let level_bytes =
                    self.read_span(&entry, BufferRole::LevelValues, &level_offsets)?;
                let levels = StringArray::try_new(level_offsets, level_bytes, None)?;

                let keys = Int32Array::try_new(ScalarBuffer::from(codes), nulls)?;
                let array = DictionaryArray::<Int32Type>::try_new(keys, Arc::new(levels))?;
                Ok(Arc::new(array))
            }
        }
    }

    /// Reconstructs the column named `name`, if the file has one.
    pub fn column_by_name(&mut self, name: &str) -> Result<Option<ArrayRef>> {
        match self.footer.columns.iter().position(|c| c.name == name) {
            Some(index) => self.column(index).map(Some),
            None => Ok(None),
        }
    }

    /// Reads every column into one `RecordBatch` using the stored schema.
    pub fn read_all(&mut self) -> Result<RecordBatch> {
        let columns = (0..self.num_columns())
            .map(|i| self.column(i))
            .collect::<Result<Vec<_>>>()?;
        let schema = self.schema();
        if columns.is_empty() {
            let options = RecordBatchOptions::new()
                .with_row_count(Some(usize::try_from(self.footer.num_rows).unwrap_or(0)));
            return Ok(RecordBatch::try_new_with_options(schema, columns, &options)?);
        }
        Ok(RecordBatch::try_new(schema, columns)?)
    }
}
