// Extraction output and configuration types
//
// Story metadata, the per-document catalog, the indexer summary and the
// configuration consumed by the extractors.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

/// Default import source that provides `defineMeta` / `Story` / `Meta`
pub const DEFAULT_PACKAGE_NAME: &str = "@storybook/addon-svelte-csf";

/// Hash used to suffix colliding generated ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdHash {
    /// 32-bit multiply-by-31 fold, compatible with previously generated ids
    #[default]
    Fold,
    /// First 8 hex digits of the MD5 digest of the story name
    Md5,
}

/// Extractor configuration
///
/// Deserializable so callers can embed it in their own configuration files;
/// every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractorConfig {
    /// Import source recognized as the marker-providing package
    pub package_name: String,
    /// Tolerate the legacy `Meta`/`Story` + `export const meta` dialect
    pub legacy_template: bool,
    pub id_hash: IdHash,
    /// Check generated ids against explicit ids too, not only other generated ids
    pub unify_id_sets: bool,
    /// Attach single-line raw source to indexed stories
    pub include_raw_source_in_index: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            legacy_template: false,
            id_hash: IdHash::Fold,
            unify_id_sets: false,
            include_raw_source_in_index: false,
        }
    }
}

/// Options for the indexer pass
#[derive(Debug, Clone, PartialEq)]
pub struct IndexerOptions {
    pub package_name: String,
    pub legacy_template: bool,
    pub include_raw_source: bool,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        IndexerOptions::from(&ExtractorConfig::default())
    }
}

impl From<&ExtractorConfig> for IndexerOptions {
    fn from(config: &ExtractorConfig) -> Self {
        Self {
            package_name: config.package_name.clone(),
            legacy_template: config.legacy_template,
            include_raw_source: config.include_raw_source_in_index,
        }
    }
}

/// Value of a story's `source` attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StorySource {
    Flag(bool),
    Code(String),
}

/// Metadata of one recognized story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryMeta {
    /// Unique per document
    pub id: String,
    /// Unique per document
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<StorySource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_source: Option<String>,
}

/// Non-fatal condition found during extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExtractionWarning {
    /// A derived id collided with an earlier generated id and was suffixed
    #[serde(rename_all = "camelCase")]
    IdCollision {
        filename: String,
        name: String,
        derived_id: String,
        assigned_id: String,
    },
}

impl std::fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionWarning::IdCollision {
                filename,
                name,
                derived_id,
                assigned_id,
            } => write!(
                f,
                "Story name conflict with exports in '{}': '{}' derives id '{}', using '{}' - please add an explicit id",
                filename, name, derived_id, assigned_id
            ),
        }
    }
}

/// Story name → metadata for one document, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    stories: HashMap<String, StoryMeta>,
    order: Vec<String>,
    warnings: Vec<ExtractionWarning>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a story; names are checked for uniqueness before this point
    pub(crate) fn insert(&mut self, meta: StoryMeta) {
        if !self.stories.contains_key(&meta.name) {
            self.order.push(meta.name.clone());
        }
        self.stories.insert(meta.name.clone(), meta);
    }

    pub(crate) fn push_warning(&mut self, warning: ExtractionWarning) {
        self.warnings.push(warning);
    }

    pub fn get(&self, name: &str) -> Option<&StoryMeta> {
        self.stories.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Story names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Stories in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &StoryMeta> {
        self.order.iter().filter_map(|name| self.stories.get(name))
    }

    pub fn warnings(&self) -> &[ExtractionWarning] {
        &self.warnings
    }

    pub fn into_map(self) -> HashMap<String, StoryMeta> {
        self.stories
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for meta in self.iter() {
            map.serialize_entry(&meta.name, meta)?;
        }
        map.end()
    }
}

/// Document-level meta found by the indexer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexedMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedStory {
    pub export_name: String,
    pub name: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_source: Option<String>,
}

/// Minimal cataloging summary of one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexerResult {
    pub meta: IndexedMeta,
    /// Document order
    pub stories: Vec<IndexedStory>,
}
