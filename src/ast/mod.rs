//! Syntax tree model for Svelte CSF documents
//!
//! The trees are produced by an external parser (the Svelte compiler in its
//! "modern" AST mode) and handed to us as JSON. This module only models the
//! node families the extractors need:
//! - `template.rs` - markup fragment, blocks, attributes and `<script>` regions
//! - `script.rs` - the ESTree subset used by script regions and compiled output
//! - `node.rs` - borrowed node views (`NodeRef`) and kinds for the tree walker
//!
//! Offsets are kept exactly as the parser emitted them. Node kinds outside the
//! modelled subset deserialize to an opaque `Unknown` variant and are never
//! descended into.

pub mod node;
pub mod script;
pub mod template;

pub use node::{NodeKind, NodeRef};
pub use script::*;
pub use template::*;

use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` range of offsets into the original source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Unit in which the parser counted offsets
///
/// JavaScript parsers index strings by UTF-16 code units, tree-sitter by bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetEncoding {
    #[default]
    Utf16,
    Utf8,
}

/// One input document: original text plus its parsed tree
///
/// Immutable after construction. Every offset in `root` indexes into `source`
/// using `encoding`.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    filename: String,
    source: String,
    root: Root,
    encoding: OffsetEncoding,
}

impl SourceDocument {
    pub fn new(filename: impl Into<String>, source: impl Into<String>, root: Root) -> Self {
        Self {
            filename: filename.into(),
            source: source.into(),
            root,
            encoding: OffsetEncoding::default(),
        }
    }

    /// Decode the parser's JSON output for `source`
    pub fn from_json(
        filename: impl Into<String>,
        source: impl Into<String>,
        ast_json: &str,
    ) -> Result<Self, serde_json::Error> {
        let root: Root = serde_json::from_str(ast_json)?;
        Ok(Self::new(filename, source, root))
    }

    pub fn with_encoding(mut self, encoding: OffsetEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Root {
        &self.root
    }

    pub fn encoding(&self) -> OffsetEncoding {
        self.encoding
    }

    /// Slice the original text between two tree offsets (end-exclusive)
    ///
    /// Returns `None` when the range does not land inside the text.
    pub fn slice(&self, span: Span) -> Option<&str> {
        if span.end < span.start {
            return None;
        }
        let start = self.byte_offset(span.start)?;
        let end = self.byte_offset(span.end)?;
        self.source.get(start..end)
    }

    fn byte_offset(&self, offset: usize) -> Option<usize> {
        if self.encoding == OffsetEncoding::Utf8 || self.source.is_ascii() {
            return (offset <= self.source.len()).then_some(offset);
        }

        let mut units = 0;
        for (byte, ch) in self.source.char_indices() {
            if units == offset {
                return Some(byte);
            }
            if units > offset {
                return None;
            }
            units += ch.len_utf16();
        }
        (units == offset).then_some(self.source.len())
    }
}
