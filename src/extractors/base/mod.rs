// Base extractor building blocks
//
// - types.rs: configuration and result types (StoryMeta, Catalog, IndexerResult...)
// - extractor.rs: BaseExtractor, source text access for one document
// - walker.rs: kind-dispatched tree walker shared by every extractor

pub mod extractor;
pub mod types;
pub mod walker;

pub use extractor::BaseExtractor;
pub use types::{
    Catalog, ExtractionWarning, ExtractorConfig, IdHash, IndexedMeta, IndexedStory,
    IndexerOptions, IndexerResult, StoryMeta, StorySource, DEFAULT_PACKAGE_NAME,
};
pub use walker::{find_nodes_by_kind, walk, Handler, Visitors, Walk};
