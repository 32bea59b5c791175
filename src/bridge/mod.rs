// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the host-facing side of the library. It turns host variables
// into Arrow columns and drives them, in order, into one output file.
//
// Data Flow (Write):
//
//   1. [Facade (FeatherWriter)]           -> Receives HostMetadata + HostVariables
//         |
//         `-> for each variable ->
//
//   2. [HostVariable::encode]              -> ScalarKind::resolve, build_validity,
//         |                                   encoding::encode_column
//         `-> Column
//
//   3. [Session (TableWriterSession)]      -> phase, name and row-count checks
//         |
//         `-> TableWriter::append_column
//
//   4. [File Writer (FeatherFileWriter)]   -> aligned column buffers on disk
//
//   5. [Finalize]                          -> metadata::validate, then footer + trailer
//
//
// Data Flow (Read-back):
//
//   1. [File Reader (FeatherFileReader)]   -> trailer, footer JSON, manifest
//         |
//         `-> column(i) / read_all() -> ArrayRef / RecordBatch
//
// ====================================================================================
pub mod facade;
pub mod file_reader;
pub mod file_writer;
pub mod format;
pub mod host;
pub mod metadata;
pub mod session;

// --- High-Level Stateful API ---
pub use facade::{write_table, FeatherWriter};
pub use host::HostVariable;
pub use metadata::{HostMetadata, TableMetadata};

// --- Session and Format Layer ---
pub use file_reader::FeatherFileReader;
pub use file_writer::FeatherFileWriter;
pub use session::{SessionPhase, TableWriterSession};
