// Raw source recovery for story bodies
//
// Resolution order for a marker element:
// 1. self-closing with `children={snippet}`: body of that snippet block
// 2. self-closing with a `setTemplate(snippet)` call in the instance script
// 3. self-closing otherwise: placeholder rendering the meta component
// 4. inline `{#snippet children()}` block: its body
// 5. any other inline content: first to last child node
//
// An empty body yields no raw source at all, never an empty string.

use crate::ast::{Element, Fragment, NodeKind, NodeRef, SnippetBlock, TemplateNode};
use crate::error::{ExtractError, Result};
use crate::extractors::base::{find_nodes_by_kind, BaseExtractor};
use crate::utils::{collapse_newlines, dedent};

use super::attributes::Attributes;

const CHILDREN_SNIPPET: &str = "children";
const UNKNOWN_COMPONENT: &str = "UnknownComponent";

/// Post-processing applied to recovered text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Remove common indentation, keep line structure (full extraction)
    Dedent,
    /// Strip every line break and trim (indexer)
    SingleLine,
}

impl Normalization {
    pub fn apply(self, text: &str) -> String {
        match self {
            Normalization::Dedent => dedent(text),
            Normalization::SingleLine => collapse_newlines(text),
        }
    }
}

pub struct RawSourceRecoverer<'a> {
    base: BaseExtractor<'a>,
    /// Snippet named by `setTemplate(...)`
    template_snippet: Option<&'a str>,
    /// Identifier of the meta `component`
    component: Option<&'a str>,
    normalization: Normalization,
}

impl<'a> RawSourceRecoverer<'a> {
    pub fn new(
        base: BaseExtractor<'a>,
        template_snippet: Option<&'a str>,
        component: Option<&'a str>,
        normalization: Normalization,
    ) -> Self {
        Self {
            base,
            template_snippet,
            component,
            normalization,
        }
    }

    pub fn recover(&self, element: &'a Element, story_name: &str) -> Result<Option<String>> {
        if self.base.is_self_closing(element)? {
            let attributes = Attributes::new(self.base, element);
            if let Some(snippet) = attributes.children_identifier() {
                let block = self.find_snippet(snippet, story_name)?;
                return self.fragment_source(&block.body);
            }
            if let Some(snippet) = self.template_snippet {
                let block = self.find_snippet(snippet, story_name)?;
                return self.fragment_source(&block.body);
            }
            let component = self.component.unwrap_or(UNKNOWN_COMPONENT);
            return Ok(Some(format!("<{} {{...args}} />", component)));
        }

        if let Some(block) = inline_children_snippet(&element.fragment) {
            return self.fragment_source(&block.body);
        }

        self.fragment_source(&element.fragment)
    }

    fn find_snippet(&self, name: &str, story_name: &str) -> Result<&'a SnippetBlock> {
        find_nodes_by_kind(NodeRef::Fragment(&self.base.root().fragment), NodeKind::SnippetBlock)
            .into_iter()
            .find_map(|node| match node {
                NodeRef::Template(TemplateNode::SnippetBlock(block)) if block.name() == name => {
                    Some(block)
                }
                _ => None,
            })
            .ok_or_else(|| ExtractError::SnippetNotFound {
                filename: self.base.file_path().to_string(),
                snippet: name.to_string(),
                story: story_name.to_string(),
            })
    }

    fn fragment_source(&self, fragment: &Fragment) -> Result<Option<String>> {
        match fragment.content_span() {
            Some(span) => {
                let text = self.base.get_node_text(span)?;
                Ok(Some(self.normalization.apply(text)))
            }
            None => Ok(None),
        }
    }
}

fn inline_children_snippet(fragment: &Fragment) -> Option<&SnippetBlock> {
    fragment.nodes.iter().find_map(|node| match node {
        TemplateNode::SnippetBlock(block) if block.name() == CHILDREN_SNIPPET => Some(block),
        _ => None,
    })
}
