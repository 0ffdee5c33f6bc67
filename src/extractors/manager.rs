//! ExtractorManager - Public API for story extraction
//!
//! Orchestration layer over the per-document extractors: decodes parser
//! output, loads documents from disk, runs the full extraction, the indexer
//! and the compiled-output locator, and fans batches out over rayon. Errors
//! leave this layer as `anyhow::Error` with the document named in the context.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::ast::{Program, SourceDocument};
use crate::error::ExtractError;
use crate::extractors::base::{Catalog, ExtractorConfig, IndexerOptions, IndexerResult};
use crate::extractors::compiled::{self, CompiledAstNodes};
use crate::extractors::indexer;
use crate::extractors::svelte;

/// Manager for story extraction with one shared configuration
///
/// Holds no per-document state; every call builds fresh traversal state, so a
/// manager can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct ExtractorManager {
    config: ExtractorConfig,
}

impl ExtractorManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Pair source text with the parser's JSON tree
    pub fn load_document(&self, filename: &str, source: &str, ast_json: &str) -> Result<SourceDocument> {
        SourceDocument::from_json(filename, source, ast_json)
            .with_context(|| format!("Failed to decode syntax tree for {}", filename))
    }

    /// Read a document and its serialized tree from disk
    pub fn read_document(&self, source_path: &Path, ast_path: &Path) -> Result<SourceDocument> {
        let source = fs::read_to_string(source_path)
            .with_context(|| format!("Failed to read {}", source_path.display()))?;
        let ast_json = fs::read_to_string(ast_path)
            .with_context(|| format!("Failed to read syntax tree {}", ast_path.display()))?;
        self.load_document(&source_path.to_string_lossy(), &source, &ast_json)
    }

    /// Full extraction: story name → metadata
    pub fn extract_stories(&self, document: &SourceDocument) -> Result<Catalog> {
        let catalog = svelte::extract_stories(document, &self.config)
            .with_context(|| format!("Failed to extract stories from {}", document.filename()))?;

        for warning in catalog.warnings() {
            debug!("{}", warning);
        }
        debug!(
            "Extracted {} stories from {}",
            catalog.len(),
            document.filename()
        );
        Ok(catalog)
    }

    /// Indexer pass: `{ meta, stories }`
    pub fn index(&self, document: &SourceDocument) -> Result<IndexerResult> {
        let options = IndexerOptions::from(&self.config);
        indexer::parse_for_indexer(document, &options)
            .with_context(|| format!("Failed to index stories in {}", document.filename()))
    }

    /// Parse compiled JavaScript for the locator
    pub fn parse_compiled(&self, filename: &str, code: &str) -> Result<Program> {
        compiled::parse_compiled_javascript(code, filename)
            .with_context(|| format!("Failed to parse compiled output of {}", filename))
    }

    /// Decode a compiled program serialized as ESTree JSON
    pub fn load_compiled(&self, filename: &str, program_json: &str) -> Result<Program> {
        serde_json::from_str(program_json)
            .with_context(|| format!("Failed to decode compiled program of {}", filename))
    }

    pub fn locate_compiled<'p>(&self, program: &'p Program, filename: &str) -> Result<CompiledAstNodes<'p>> {
        compiled::locate_compiled_nodes(program, filename, &self.config.package_name)
            .with_context(|| format!("Failed to locate compiled nodes in {}", filename))
    }

    /// Extract many documents in parallel
    ///
    /// Results come back in input order. A failing document only fails its own
    /// slot; callers decide whether to skip it or abort the batch.
    pub fn extract_batch(&self, documents: &[SourceDocument]) -> Vec<Result<Catalog, ExtractError>> {
        documents
            .par_iter()
            .map(|document| {
                svelte::extract_stories(document, &self.config).inspect_err(|e| {
                    warn!("Failed to extract stories from {}: {}", document.filename(), e);
                })
            })
            .collect()
    }

    /// Index many documents in parallel, preserving input order
    pub fn index_batch(&self, documents: &[SourceDocument]) -> Vec<Result<IndexerResult, ExtractError>> {
        let options = IndexerOptions::from(&self.config);
        documents
            .par_iter()
            .map(|document| {
                indexer::parse_for_indexer(document, &options).inspect_err(|e| {
                    warn!("Failed to index stories in {}: {}", document.filename(), e);
                })
            })
            .collect()
    }
}
