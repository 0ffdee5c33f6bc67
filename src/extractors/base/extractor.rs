// BaseExtractor: shared state and helpers for the Svelte CSF extractors
//
// Wraps one `SourceDocument` and owns every conversion from tree offsets back
// to source text, so offset handling lives in one place.

use tracing::debug;

use crate::ast::{Element, Root, SourceDocument, Span};
use crate::error::{ExtractError, Result};

/// Base implementation shared by the full extractor, the indexer and the locator
#[derive(Debug, Clone, Copy)]
pub struct BaseExtractor<'a> {
    pub document: &'a SourceDocument,
}

impl<'a> BaseExtractor<'a> {
    pub fn new(document: &'a SourceDocument) -> Self {
        debug!(
            "BaseExtractor for '{}' ({} bytes)",
            document.filename(),
            document.source().len()
        );
        Self { document }
    }

    pub fn file_path(&self) -> &'a str {
        self.document.filename()
    }

    pub fn source(&self) -> &'a str {
        self.document.source()
    }

    pub fn root(&self) -> &'a Root {
        self.document.root()
    }

    /// Source text covered by `span`
    ///
    /// Offsets that do not land in the document are a hard error: they mean the
    /// tree was produced from different text.
    pub fn get_node_text(&self, span: Span) -> Result<&'a str> {
        self.document
            .slice(span)
            .ok_or_else(|| ExtractError::SpanOutOfBounds {
                filename: self.file_path().to_string(),
                start: span.start,
                end: span.end,
            })
    }

    /// `<Tag ... />` rather than `<Tag ...>...</Tag>`
    pub fn is_self_closing(&self, element: &Element) -> Result<bool> {
        let text = self.get_node_text(element.span())?;
        Ok(text.trim_end().ends_with("/>"))
    }

    pub(crate) fn invalid_attribute(&self, attribute: &str, expected: &'static str) -> ExtractError {
        ExtractError::InvalidAttribute {
            filename: self.file_path().to_string(),
            attribute: attribute.to_string(),
            expected,
        }
    }

    pub(crate) fn invalid_meta_property(
        &self,
        property: &str,
        expected: &'static str,
    ) -> ExtractError {
        ExtractError::InvalidMetaProperty {
            filename: self.file_path().to_string(),
            property: property.to_string(),
            expected,
        }
    }
}
