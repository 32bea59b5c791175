// In: src/bridge/metadata.rs

//! Table-level metadata and the checks it must pass before a file is finalized.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{FeatherError, Result};

/// Format versions a file may declare.
pub const SUPPORTED_VERSIONS: RangeInclusive<u16> = 1..=4;

/// Table-level metadata, committed exactly once at finalize.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub description: String,
    pub num_rows: u64,
    pub num_variables: u64,
    pub version: u16,
}

impl TableMetadata {
    pub fn new(description: impl Into<String>, num_rows: u64, num_variables: u64, version: u16) -> Self {
        Self {
            description: description.into(),
            num_rows,
            num_variables,
            version,
        }
    }

    /// Converts metadata as the host supplies it.
    ///
    /// Host counts arrive as doubles; each must be a finite, non-negative whole
    /// number. A missing version falls back to `default_version`.
    pub fn from_host(host: &HostMetadata, default_version: u16) -> Result<Self> {
        let num_rows = host_count("NumRows", host.num_rows)?;
        let num_variables = host_count("NumVariables", host.num_variables)?;
        let version = match host.version {
            None => default_version,
            Some(v) => {
                let v = host_count("Version", v)?;
                u16::try_from(v).map_err(|_| FeatherError::UnsupportedVersion(v))?
            }
        };
        Ok(Self::new(host.description.clone(), num_rows, num_variables, version))
    }
}

/// Metadata in the shape the host hands it over.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HostMetadata {
    pub description: String,
    pub num_rows: f64,
    pub num_variables: f64,
    #[serde(default)]
    pub version: Option<f64>,
}

fn host_count(field: &str, value: f64) -> Result<u64> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err(FeatherError::EncodingError(format!(
            "{} must be a non-negative whole number, got {}",
            field, value
        )));
    }
    Ok(value as u64)
}

/// Cross-checks declared metadata against what the session actually wrote.
///
/// `locked_row_count` is the row count fixed by the first appended column, or
/// `None` when no column was written (any declared row count is accepted then).
pub fn validate(
    declared: &TableMetadata,
    written_count: usize,
    locked_row_count: Option<usize>,
) -> Result<()> {
    if !SUPPORTED_VERSIONS.contains(&declared.version) {
        return Err(FeatherError::UnsupportedVersion(u64::from(declared.version)));
    }

    if declared.num_variables != written_count as u64 {
        return Err(FeatherError::VariableCountMismatch {
            declared: declared.num_variables,
            written: written_count,
        });
    }

    if let Some(rows) = locked_row_count {
        if declared.num_rows != rows as u64 {
            return Err(FeatherError::RowCountMismatch {
                expected: rows,
                actual: usize::try_from(declared.num_rows).unwrap_or(usize::MAX),
            });
        }
    }

    Ok(())
}
