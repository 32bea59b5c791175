//! This module defines the core, strongly-typed data representations used
//! throughout the column-encoding engine.
//!
//! It currently includes the canonical `ScalarKind` enum, the closed registry
//! that every host type tag is resolved against before any encoding happens.

pub mod scalar_kind;

// Re-export the main type(s) for easier access.
pub use scalar_kind::ScalarKind;
