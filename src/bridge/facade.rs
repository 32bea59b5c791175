// In: src/bridge/facade.rs

//! The host-facing writer object.
//!
//! `FeatherWriter` is the entry point a host binding talks to. It owns one
//! session over one output file, accepts metadata and variables in either
//! order, and commits the file only on an explicit `finalize`. Every variable
//! error comes back wrapped in `VariableError` so the host can name the
//! offending variable.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::bridge::file_writer::FeatherFileWriter;
use crate::bridge::host::HostVariable;
use crate::bridge::metadata::{HostMetadata, TableMetadata};
use crate::bridge::session::{SessionPhase, TableWriterSession};
use crate::config::WriterConfig;
use crate::error::{FeatherError, Result};

type FileSession = TableWriterSession<FeatherFileWriter<BufWriter<File>>>;

/// A stateful writer over one output file.
pub struct FeatherWriter {
    session: FileSession,
    config: WriterConfig,
    metadata: Option<TableMetadata>,
    path: PathBuf,
}

impl FeatherWriter {
    /// Creates the output file and opens a session over it.
    pub fn open(path: impl AsRef<Path>, config: WriterConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = FeatherFileWriter::create(&path, &config)?;
        Ok(Self {
            session: TableWriterSession::new(writer),
            config,
            metadata: None,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written_count(&self) -> usize {
        self.session.written_count()
    }

    pub fn is_finalized(&self) -> bool {
        self.session.phase() == SessionPhase::Finalized
    }

    /// The metadata that `finalize` will commit, if any has been supplied.
    pub fn metadata(&self) -> Option<&TableMetadata> {
        self.metadata.as_ref()
    }

    fn require_open(&self, operation: &str) -> Result<()> {
        if self.is_finalized() {
            return Err(FeatherError::InvalidSessionState(format!(
                "cannot {} after the file has been finalized",
                operation
            )));
        }
        Ok(())
    }

    /// Converts and stores host metadata. A later call replaces an earlier one.
    pub fn write_metadata(&mut self, host: &HostMetadata) -> Result<()> {
        self.require_open("write metadata")?;
        let metadata = TableMetadata::from_host(host, self.config.default_version)?;
        log::debug!(
            "metadata staged: '{}', {} rows, {} variables, version {}",
            metadata.description,
            metadata.num_rows,
            metadata.num_variables,
            metadata.version
        );
        self.metadata = Some(metadata);
        Ok(())
    }

    /// Encodes one variable and appends it as the next column.
    pub fn write_variable(&mut self, variable: &HostVariable<'_>) -> Result<()> {
        let result = variable
            .encode()
            .and_then(|column| self.session.append_column(column));
        result.map_err(|e| e.for_variable(variable.name))
    }

    /// Writes variables in order, stopping at the first failure.
    pub fn write_variables(&mut self, variables: &[HostVariable<'_>]) -> Result<()> {
        for variable in variables {
            self.write_variable(variable)?;
        }
        Ok(())
    }

    /// Validates the staged metadata and commits the file.
    pub fn finalize(&mut self) -> Result<()> {
        self.require_open("finalize")?;
        let metadata = self.metadata.as_ref().ok_or_else(|| {
            FeatherError::InvalidSessionState(
                "metadata must be written before the file is finalized".to_string(),
            )
        })?;
        self.session.finalize(metadata)?;
        if self.config.sync_on_finalize {
            self.session.writer_mut().sync_all()?;
        }
        log::info!(
            "wrote {} ({} bytes)",
            self.path.display(),
            self.session.writer().bytes_written()
        );
        Ok(())
    }
}

impl Drop for FeatherWriter {
    fn drop(&mut self) {
        if !self.is_finalized() {
            log::warn!(
                "{} dropped before finalize; the file is incomplete and unreadable",
                self.path.display()
            );
        }
    }
}

/// Writes a complete table in one call.
pub fn write_table(
    path: impl AsRef<Path>,
    metadata: &HostMetadata,
    variables: &[HostVariable<'_>],
    config: WriterConfig,
) -> Result<()> {
    let mut writer = FeatherWriter::open(path, config)?;
    writer.write_metadata(metadata)?;
    writer.write_variables(variables)?;
    writer.finalize()
}
