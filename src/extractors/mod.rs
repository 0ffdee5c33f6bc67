//! Story metadata extractors
//!
//! # Architecture
//!
//! - `base/` - shared extractor state, result types and the tree walker
//! - `svelte/` - full extraction from a `*.stories.svelte` document
//! - `indexer/` - lightweight `{ meta, stories }` pass for story indexing
//! - `compiled/` - locating the rewrite targets in compiled JavaScript
//! - `manager.rs` - ExtractorManager public API

pub mod base;
pub mod compiled;
pub mod indexer;
pub mod manager;
pub mod svelte;

#[cfg(test)]
pub(crate) mod fixtures;

pub use base::{
    Catalog, ExtractionWarning, ExtractorConfig, IdHash, IndexedMeta, IndexedStory,
    IndexerOptions, IndexerResult, StoryMeta, StorySource,
};
pub use compiled::{locate_compiled_nodes, parse_compiled_javascript, CompiledAstNodes};
pub use indexer::parse_for_indexer;
pub use manager::ExtractorManager;
pub use svelte::extract_stories;
