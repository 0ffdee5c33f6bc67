// Svelte CSF story metadata extraction
//
// Reads parser output for `*.stories.svelte` documents and produces the
// story catalog, the indexer summary and the compiled-output rewrite targets.

pub mod ast;
pub mod error;
pub mod extractors;
pub mod utils;

pub use ast::{OffsetEncoding, SourceDocument, Span};
pub use error::{ErrorCategory, ExtractError};
pub use extractors::{
    extract_stories, locate_compiled_nodes, parse_compiled_javascript, parse_for_indexer,
    Catalog, CompiledAstNodes, ExtractionWarning, ExtractorConfig, ExtractorManager, IdHash,
    IndexedMeta, IndexedStory, IndexerOptions, IndexerResult, StoryMeta, StorySource,
};
