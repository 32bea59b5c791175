// In: src/bridge/session.rs

//! The two-phase writer session.
//!
//! A session wraps one `TableWriter` and enforces the only legal call order:
//! any number of `append_column` calls, then exactly one successful
//! `finalize`. Every check runs before the writer is touched, so a rejected
//! append or finalize leaves both the session and the file as they were.

use hashbrown::HashSet;

use crate::bridge::metadata::{self, TableMetadata};
use crate::encoding::Column;
use crate::error::{FeatherError, Result};
use crate::traits::TableWriter;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    WritingVariables,
    Finalized,
}

/// A single-pass, single-owner session over one output.
#[derive(Debug)]
pub struct TableWriterSession<W: TableWriter> {
    writer: W,
    phase: SessionPhase,
    written_count: usize,
    seen_names: HashSet<String>,
    /// Fixed by the first successful append.
    row_count: Option<usize>,
}

impl<W: TableWriter> TableWriterSession<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            phase: SessionPhase::WritingVariables,
            written_count: 0,
            seen_names: HashSet::new(),
            row_count: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn written_count(&self) -> usize {
        self.written_count
    }

    /// The row count every column must have, once the first column is in.
    pub fn row_count(&self) -> Option<usize> {
        self.row_count
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen_names.contains(name)
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub(crate) fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Releases the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn require_writing(&self, operation: &str) -> Result<()> {
        match self.phase {
            SessionPhase::WritingVariables => Ok(()),
            SessionPhase::Finalized => Err(FeatherError::InvalidSessionState(format!(
                "cannot {} after the file has been finalized",
                operation
            ))),
        }
    }

    /// Appends one column. This is the only call that adds data to the output.
    pub fn append_column(&mut self, column: Column) -> Result<()> {
        self.require_writing("append a column")?;

        if column.name().is_empty() {
            return Err(FeatherError::EncodingError(
                "variable names must not be empty".to_string(),
            ));
        }
        if self.seen_names.contains(column.name()) {
            return Err(FeatherError::DuplicateName(column.name().to_string()));
        }
        if let Some(expected) = self.row_count {
            if column.len() != expected {
                return Err(FeatherError::RowCountMismatch {
                    expected,
                    actual: column.len(),
                });
            }
        }

        let name = column.name().to_string();
        let rows = column.len();
        log::debug!(
            "appending column '{}' ({}, {} rows, {} nulls)",
            name,
            column.kind(),
            rows,
            column.null_count()
        );
        log_metric!("event" = "append_column", "name" = &name, "kind" = column.kind(), "rows" = rows);

        self.writer.append_column(column)?;

        self.row_count.get_or_insert(rows);
        self.seen_names.insert(name);
        self.written_count += 1;
        Ok(())
    }

    /// Validates `metadata` against what was written, then finalizes the writer.
    ///
    /// A validation failure leaves the session in `WritingVariables`; the
    /// columns already appended stay in the unfinalized output.
    pub fn finalize(&mut self, metadata: &TableMetadata) -> Result<()> {
        self.require_writing("finalize")?;
        metadata::validate(metadata, self.written_count, self.row_count)?;

        self.writer.finalize(metadata)?;
        self.phase = SessionPhase::Finalized;
        log::info!(
            "finalized table: {} variables x {} rows (version {})",
            self.written_count,
            metadata.num_rows,
            metadata.version
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{encode_column, RawValues};
    use crate::null_handling::build_validity;
    use crate::types::ScalarKind;

    /// Records every call so tests can assert on what reached the writer.
    #[derive(Debug, Default)]
    struct RecordingWriter {
        appended: Vec<String>,
        finalized: Vec<TableMetadata>,
        fail_next_append: bool,
    }

    impl TableWriter for RecordingWriter {
        fn append_column(&mut self, column: Column) -> Result<()> {
            if std::mem::take(&mut self.fail_next_append) {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
            }
            self.appended.push(column.name().to_string());
            Ok(())
        }

        fn finalize(&mut self, metadata: &TableMetadata) -> Result<()> {
            self.finalized.push(metadata.clone());
            Ok(())
        }
    }

    fn int_column(name: &str, values: &[i32]) -> Column {
        let validity = build_validity(None, values.len()).unwrap();
        encode_column(name, ScalarKind::Int32, RawValues::Int32(values), validity, values.len())
            .unwrap()
    }

    #[test]
    fn test_append_then_finalize() {
        let mut session = TableWriterSession::new(RecordingWriter::default());
        session.append_column(int_column("a", &[1, 2])).unwrap();
        session.append_column(int_column("b", &[3, 4])).unwrap();
        session.finalize(&TableMetadata::new("t", 2, 2, 2)).unwrap();

        assert_eq!(session.phase(), SessionPhase::Finalized);
        let writer = session.into_inner();
        assert_eq!(writer.appended, vec!["a", "b"]);
        assert_eq!(writer.finalized.len(), 1);
    }

    #[test]
    fn test_duplicate_name_leaves_state_unchanged() {
        let mut session = TableWriterSession::new(RecordingWriter::default());
        session.append_column(int_column("a", &[1])).unwrap();
        let result = session.append_column(int_column("a", &[2]));

        assert!(matches!(result, Err(FeatherError::DuplicateName(n)) if n == "a"));
        assert_eq!(session.written_count(), 1);
        assert_eq!(session.writer().appended.len(), 1);
    }

    #[test]
    fn test_row_count_locks_on_first_append() {
        let mut session = TableWriterSession::new(RecordingWriter::default());
        assert_eq!(session.row_count(), None);
        session.append_column(int_column("a", &[1, 2, 3])).unwrap();
        assert_eq!(session.row_count(), Some(3));

        let result = session.append_column(int_column("b", &[1, 2]));
        assert!(matches!(
            result,
            Err(FeatherError::RowCountMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert_eq!(session.written_count(), 1);
        assert!(!session.contains("b"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut session = TableWriterSession::new(RecordingWriter::default());
        let result = session.append_column(int_column("", &[1]));
        assert!(matches!(result, Err(FeatherError::EncodingError(_))));
        assert_eq!(session.written_count(), 0);
    }

    #[test]
    fn test_finalize_twice_is_invalid() {
        let mut session = TableWriterSession::new(RecordingWriter::default());
        let meta = TableMetadata::new("t", 0, 0, 2);
        session.finalize(&meta).unwrap();
        assert!(matches!(
            session.finalize(&meta),
            Err(FeatherError::InvalidSessionState(_))
        ));
        assert_eq!(session.into_inner().finalized.len(), 1);
    }

    #[test]
    fn test_append_after_finalize_is_invalid() {
        let mut session = TableWriterSession::new(RecordingWriter::default());
        session.finalize(&TableMetadata::new("t", 0, 0, 2)).unwrap();
        let result = session.append_column(int_column("late", &[1]));
        assert!(matches!(result, Err(FeatherError::InvalidSessionState(_))));
        assert_eq!(session.written_count(), 0);
    }

    #[test]
    fn test_failed_validation_keeps_session_writable() {
        let mut session = TableWriterSession::new(RecordingWriter::default());
        session.append_column(int_column("a", &[1])).unwrap();
        session.append_column(int_column("b", &[2])).unwrap();

        let result = session.finalize(&TableMetadata::new("t", 1, 3, 2));
        assert!(matches!(
            result,
            Err(FeatherError::VariableCountMismatch {
                declared: 3,
                written: 2
            })
        ));
        assert_eq!(session.phase(), SessionPhase::WritingVariables);
        assert!(session.writer().finalized.is_empty());

        session.append_column(int_column("c", &[3])).unwrap();
        session.finalize(&TableMetadata::new("t", 1, 3, 2)).unwrap();
    }

    #[test]
    fn test_writer_failure_does_not_count_the_column() {
        let writer = RecordingWriter {
            fail_next_append: true,
            ..Default::default()
        };
        let mut session = TableWriterSession::new(writer);
        assert!(matches!(
            session.append_column(int_column("a", &[1])),
            Err(FeatherError::Io(_))
        ));
        assert_eq!(session.written_count(), 0);
        assert_eq!(session.row_count(), None);
    }
}
