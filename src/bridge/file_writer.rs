// In: src/bridge/file_writer.rs

//! The concrete `TableWriter`: a single-pass, Feather-style file writer.
//!
//! The leading magic is written on construction, every appended column's
//! buffers go straight to the output, and only `finalize` writes the footer
//! and trailing magic. A file whose writer never finalized has no trailer and
//! is rejected by `FeatherFileReader`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    ArrowPrimitiveType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow_schema::{Field, Schema};

use crate::bridge::format::{
    padding_for, BufferLocation, BufferRole, ColumnManifestEntry, FileFooter, FILE_MAGIC,
    HEADER_SIZE,
};
use crate::bridge::metadata::TableMetadata;
use crate::config::{Compression, WriterConfig};
use crate::encoding::Column;
use crate::error::{FeatherError, Result};
use crate::kernels::{self, bitcast};
use crate::traits::TableWriter;
use crate::types::ScalarKind;

/// Schema metadata key holding the table description.
pub const DESCRIPTION_KEY: &str = "description";
/// Schema metadata key holding the declared format version.
pub const VERSION_KEY: &str = "version";

/// Writes columns to any `Write` destination, tracking offsets itself so the
/// destination never needs to be seekable.
#[derive(Debug)]
pub struct FeatherFileWriter<W: Write> {
    writer: W,
    compression: Compression,
    /// Manually tracks the number of bytes written to the underlying writer.
    bytes_written: u64,
    columns: Vec<ColumnManifestEntry>,
    fields: Vec<Field>,
    finalized: bool,
    /// Set once any write to `writer` fails. Offsets past that point are
    /// unknown, so the output can never be finalized.
    failed: bool,
}

impl FeatherFileWriter<BufWriter<File>> {
    /// Creates (or truncates) the file at `path` and writes the file header.
    pub fn create(path: impl AsRef<Path>, config: &WriterConfig) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        let writer = BufWriter::with_capacity(config.buffer_capacity, file);
        log::info!("opened feather output {}", path.as_ref().display());
        Self::new(writer, config.compression)
    }

    /// Flushes buffered bytes and syncs the file to stable storage.
    pub fn sync_all(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(())
    }
}

impl<W: Write> FeatherFileWriter<W> {
    /// Wraps a destination and immediately writes the header, so the byte
    /// counter is accurate from the start.
    pub fn new(mut writer: W, compression: Compression) -> Result<Self> {
        writer.write_all(FILE_MAGIC)?;
        writer.write_all(&[0u8; HEADER_SIZE as usize - FILE_MAGIC.len()])?;

        Ok(Self {
            writer,
            compression,
            bytes_written: HEADER_SIZE,
            columns: Vec::new(),
            fields: Vec::new(),
            finalized: false,
            failed: false,
        })
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Returns `true` if an earlier write failed and the output is unusable.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    fn require_writable(&self) -> Result<()> {
        if self.failed {
            return Err(FeatherError::InvalidSessionState(
                "an earlier write failed; the output is incomplete".to_string(),
            ));
        }
        if self.finalized {
            return Err(FeatherError::InvalidSessionState(
                "file writer is already finalized".to_string(),
            ));
        }
        Ok(())
    }

    /// Marks the writer failed if `result` is an error.
    fn poison_on_err<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Pads to the buffer alignment, then writes one (optionally compressed) buffer.
    fn write_buffer(&mut self, role: BufferRole, bytes: &[u8]) -> Result<BufferLocation> {
        let padding = padding_for(self.bytes_written);
        if padding > 0 {
            self.writer.write_all(&[0u8; 8][..padding as usize])?;
            self.bytes_written += padding;
        }

        let stored = match self.compression {
            Compression::None => None,
            Compression::Zstd { level } => Some(kernels::zstd::compress(bytes, level)?),
        };
        let payload = stored.as_deref().unwrap_or(bytes);

        let location = BufferLocation {
            role,
            offset: self.bytes_written,
            length: payload.len() as u64,
            uncompressed_length: bytes.len() as u64,
        };
        self.writer.write_all(payload)?;
        self.bytes_written += payload.len() as u64;
        Ok(location)
    }

    fn write_primitive<T: ArrowPrimitiveType>(&mut self, array: &ArrayRef) -> Result<BufferLocation> {
        let values = array.as_primitive::<T>().values();
        self.write_buffer(BufferRole::Values, values.inner().as_slice())
    }

    /// Writes `i32` offsets rebased to start at zero, plus the bytes they span.
    fn write_string_parts(
        &mut self,
        offsets: &[i32],
        data: &[u8],
        offsets_role: BufferRole,
        values_role: BufferRole,
    ) -> Result<Vec<BufferLocation>> {
        let first = offsets.first().copied().unwrap_or(0);
        let last = offsets.last().copied().unwrap_or(0);
        let rebased: Vec<i32> = offsets.iter().map(|o| o - first).collect();
        let span = &data[first as usize..last as usize];

        Ok(vec![
            self.write_buffer(offsets_role, bitcast::as_bytes(&rebased))?,
            self.write_buffer(values_role, span)?,
        ])
    }

    fn write_payload(&mut self, kind: ScalarKind, array: &ArrayRef) -> Result<(Vec<BufferLocation>, u64)> {
        let mut buffers = Vec::with_capacity(3);
        let mut num_levels = 0u64;

        match kind {
            ScalarKind::Int8 => buffers.push(self.write_primitive::<Int8Type>(array)?),
            ScalarKind::Int16 => buffers.push(self.write_primitive::<Int16Type>(array)?),
            ScalarKind::Int32 => buffers.push(self.write_primitive::<Int32Type>(array)?),
            ScalarKind::Int64 => buffers.push(self.write_primitive::<Int64Type>(array)?),
            ScalarKind::UInt8 => buffers.push(self.write_primitive::<UInt8Type>(array)?),
            ScalarKind::UInt16 => buffers.push(self.write_primitive::<UInt16Type>(array)?),
            ScalarKind::UInt32 => buffers.push(self.write_primitive::<UInt32Type>(array)?),
            ScalarKind::UInt64 => buffers.push(self.write_primitive::<UInt64Type>(array)?),
            ScalarKind::Float32 => buffers.push(self.write_primitive::<Float32Type>(array)?),
            ScalarKind::Float64 => buffers.push(self.write_primitive::<Float64Type>(array)?),
            ScalarKind::Boolean => {
                let packed = array.as_boolean().values().sliced();
                buffers.push(self.write_buffer(BufferRole::Values, packed.as_slice())?);
            }
            ScalarKind::Utf8 => {
                let strings = array.as_string::<i32>();
                buffers.extend(self.write_string_parts(
                    strings.value_offsets(),
                    strings.value_data(),
                    BufferRole::Offsets,
                    BufferRole::Values,
                )?);
            }
            ScalarKind::Categorical => {
                let dict = array.as_dictionary::<Int32Type>();
                buffers.push(
                    self.write_buffer(BufferRole::Values, dict.keys().values().inner().as_slice())?,
                );
                let levels = dict.values().as_string_opt::<i32>().ok_or_else(|| {
                    FeatherError::EncodingError("categorical levels must be strings".to_string())
                })?;
                num_levels = levels.len() as u64;
                buffers.extend(self.write_string_parts(
                    levels.value_offsets(),
                    levels.value_data(),
                    BufferRole::LevelOffsets,
                    BufferRole::LevelValues,
                )?);
            }
        }
        Ok((buffers, num_levels))
    }

    fn write_column_buffers(
        &mut self,
        kind: ScalarKind,
        array: &ArrayRef,
    ) -> Result<(Vec<BufferLocation>, u64)> {
        let mut buffers = Vec::with_capacity(4);
        if let Some(nulls) = array.nulls().filter(|nb| nb.null_count() > 0) {
            let packed = nulls.inner().sliced();
            buffers.push(self.write_buffer(BufferRole::Validity, packed.as_slice())?);
        }
        let (payload, num_levels) = self.write_payload(kind, array)?;
        buffers.extend(payload);
        Ok((buffers, num_levels))
    }

    fn write_trailer(&mut self, footer_bytes: &[u8], footer_len: u32) -> Result<()> {
        self.writer.write_all(footer_bytes)?;
        self.writer.write_all(&footer_len.to_le_bytes())?;
        self.writer.write_all(FILE_MAGIC)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> TableWriter for FeatherFileWriter<W> {
    fn append_column(&mut self, column: Column) -> Result<()> {
        self.require_writable()?;
        let (name, kind, array) = column.into_parts();
        if array.data_type() != &kind.to_arrow_type() {
            return Err(FeatherError::EncodingError(format!(
                "column '{}' is declared {} but holds {:?}",
                name,
                kind,
                array.data_type()
            )));
        }

        let written = self.write_column_buffers(kind, &array);
        let (buffers, num_levels) = self.poison_on_err(written)?;

        self.fields.push(Field::new(name.clone(), kind.to_arrow_type(), true));
        self.columns.push(ColumnManifestEntry {
            name,
            kind,
            num_rows: array.len() as u64,
            null_count: array.null_count() as u64,
            num_levels,
            buffers,
        });
        Ok(())
    }

    fn finalize(&mut self, metadata: &TableMetadata) -> Result<()> {
        self.require_writable()?;

        let schema_metadata = HashMap::from([
            (DESCRIPTION_KEY.to_string(), metadata.description.clone()),
            (VERSION_KEY.to_string(), metadata.version.to_string()),
        ]);
        let schema = Schema::new_with_metadata(self.fields.clone(), schema_metadata);

        let footer = FileFooter {
            description: metadata.description.clone(),
            num_rows: metadata.num_rows,
            num_variables: metadata.num_variables,
            version: metadata.version,
            writer_version: crate::VERSION.to_string(),
            compression: self.compression,
            schema,
            columns: self.columns.clone(),
        };

        let footer_bytes = serde_json::to_vec(&footer)?;
        let footer_len = u32::try_from(footer_bytes.len()).map_err(|_| {
            FeatherError::EncodingError(format!(
                "footer of {} bytes exceeds the 4 GiB limit",
                footer_bytes.len()
            ))
        })?;

        let written = self.write_trailer(&footer_bytes, footer_len);
        self.poison_on_err(written)?;
        self.bytes_written += footer_bytes.len() as u64 + 4 + FILE_MAGIC.len() as u64;
        self.finalized = true;
        Ok(())
    }
}
