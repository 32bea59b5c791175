// In: src/error.rs

//! This module defines the single, unified error type for the entire feather-bridge library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, FeatherError>;

#[derive(Error, Debug)]
pub enum FeatherError {
    // =========================================================================
    // === Type & Encoding Errors (raised before anything touches the file)
    // =========================================================================
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Length mismatch: expected {expected} entries, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Encoding failed: {0}")]
    EncodingError(String),

    #[error("Dictionary index {index} at row {row} is outside the {levels} available levels")]
    DictionaryIndexOutOfRange {
        row: usize,
        index: i64,
        levels: usize,
    },

    // =========================================================================
    // === Session & Metadata Errors
    // =========================================================================
    #[error("A variable named '{0}' has already been written")]
    DuplicateName(String),

    #[error("Row count mismatch: the table holds {expected} rows, got {actual}")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),

    #[error("Declared {declared} variables, but {written} were written")]
    VariableCountMismatch { declared: u64, written: usize },

    #[error("Unsupported format version {0}")]
    UnsupportedVersion(u64),

    /// Wraps any error raised while writing one named host variable.
    #[error("Failed to write variable '{name}': {source}")]
    VariableError {
        name: String,
        #[source]
        source: Box<FeatherError>,
    },

    // =========================================================================
    // === File Format Errors (read-back side)
    // =========================================================================
    #[error("File format error: {0}")]
    FileFormatError(String),

    #[error("Zstd operation failed: {0}")]
    ZstdError(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem (e.g., file not found, disk full).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error from the Serde JSON library, typically during footer or config serialization.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error from a safe byte-casting operation failing.
    #[error("Byte slice casting error: {0}")]
    PodCast(String), // Manual `From` impl is needed as bytemuck::PodCastError doesn't impl Error
}

impl FeatherError {
    /// Attaches the variable name to an error raised while writing that variable.
    pub fn for_variable(self, name: &str) -> Self {
        FeatherError::VariableError {
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through `VariableError` wrappers.
    pub fn root(&self) -> &FeatherError {
        match self {
            FeatherError::VariableError { source, .. } => source.root(),
            other => other,
        }
    }
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

impl From<bytemuck::PodCastError> for FeatherError {
    fn from(err: bytemuck::PodCastError) -> Self {
        FeatherError::PodCast(err.to_string())
    }
}
