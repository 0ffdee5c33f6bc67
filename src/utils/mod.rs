// Shared utilities
//
// Text normalization and naming rules used across the extractors.

/// Dedent / single-line normalization of recovered source
pub mod text;

/// Story id derivation, id-suffix hashing and export-name conversion
pub mod naming;

pub use naming::{derive_id, export_name_from_name, fold_hash, name_from_export_name};
pub use text::{collapse_newlines, dedent};
