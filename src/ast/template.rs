// Svelte markup tree types
//
// Mirrors the "modern" AST emitted by the Svelte parser: a `Root` holding the
// markup `Fragment` plus the optional instance and module `<script>` regions.

use super::script::{Expression, Identifier, Pattern, Program};
use super::Span;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Deserialize)]
pub struct Root {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub fragment: Fragment,
    /// Instance script (`<script>`)
    #[serde(default)]
    pub instance: Option<Script>,
    /// Module script (`<script module>` / `<script context="module">`)
    #[serde(default)]
    pub module: Option<Script>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fragment {
    #[serde(default, deserialize_with = "deserialize_nodes")]
    pub nodes: Vec<TemplateNode>,
}

impl Fragment {
    /// Span from the first node's start to the last node's end
    pub fn content_span(&self) -> Option<Span> {
        let first = self.nodes.first()?.span();
        let last = self.nodes.last()?.span();
        Some(Span::new(first.start, last.end))
    }
}

// Nodes outside the model fall back to `Opaque` so their offsets survive
#[derive(Deserialize)]
#[serde(untagged)]
enum NodeSlot {
    Modelled(TemplateNode),
    Opaque(OpaqueNode),
}

fn deserialize_nodes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<TemplateNode>, D::Error> {
    let slots = Vec::<NodeSlot>::deserialize(deserializer)?;
    Ok(slots
        .into_iter()
        .map(|slot| match slot {
            NodeSlot::Modelled(node) => node,
            NodeSlot::Opaque(node) => TemplateNode::Opaque(node),
        })
        .collect())
}

/// `type` tags deserialized into a dedicated `TemplateNode` variant
const MODELLED_KINDS: &[&str] = &[
    "Text",
    "Comment",
    "ExpressionTag",
    "RegularElement",
    "Component",
    "SvelteBody",
    "SvelteBoundary",
    "SvelteComponent",
    "SvelteDocument",
    "SvelteElement",
    "SvelteFragment",
    "SvelteHead",
    "SvelteOptions",
    "SvelteSelf",
    "SvelteWindow",
    "SlotElement",
    "TitleElement",
    "IfBlock",
    "EachBlock",
    "AwaitBlock",
    "KeyBlock",
    "SnippetBlock",
    "RenderTag",
    "HtmlTag",
];

/// Markup node outside the model: `{@const}`, `{@debug}` and newer kinds
///
/// Only the kind and offsets are kept. A malformed node of a modelled kind is
/// rejected rather than read as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawOpaqueNode")]
pub struct OpaqueNode {
    pub kind: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Deserialize)]
struct RawOpaqueNode {
    #[serde(rename = "type")]
    kind: String,
    start: usize,
    end: usize,
}

impl TryFrom<RawOpaqueNode> for OpaqueNode {
    type Error = String;

    fn try_from(raw: RawOpaqueNode) -> Result<Self, Self::Error> {
        if MODELLED_KINDS.contains(&raw.kind.as_str()) {
            return Err(format!("malformed {} node", raw.kind));
        }
        Ok(OpaqueNode {
            kind: raw.kind,
            start: raw.start,
            end: raw.end,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub context: ScriptContext,
    pub content: Program,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptContext {
    #[default]
    Default,
    Module,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum TemplateNode {
    Text(Text),
    Comment(Comment),
    ExpressionTag(ExpressionTag),
    RegularElement(Element),
    Component(Element),
    #[serde(
        alias = "SvelteBody",
        alias = "SvelteBoundary",
        alias = "SvelteComponent",
        alias = "SvelteDocument",
        alias = "SvelteElement",
        alias = "SvelteFragment",
        alias = "SvelteHead",
        alias = "SvelteOptions",
        alias = "SvelteSelf",
        alias = "SvelteWindow",
        alias = "SlotElement",
        alias = "TitleElement"
    )]
    SpecialElement(Element),
    IfBlock(IfBlock),
    EachBlock(EachBlock),
    AwaitBlock(AwaitBlock),
    KeyBlock(KeyBlock),
    SnippetBlock(SnippetBlock),
    RenderTag(ExpressionTag),
    HtmlTag(ExpressionTag),
    /// Filled in by `Fragment` decoding, never by tag
    #[serde(skip)]
    Opaque(OpaqueNode),
}

impl TemplateNode {
    pub fn span(&self) -> Span {
        let (start, end) = match self {
            TemplateNode::Text(n) => (n.start, n.end),
            TemplateNode::Comment(n) => (n.start, n.end),
            TemplateNode::ExpressionTag(n)
            | TemplateNode::RenderTag(n)
            | TemplateNode::HtmlTag(n) => (n.start, n.end),
            TemplateNode::RegularElement(n)
            | TemplateNode::Component(n)
            | TemplateNode::SpecialElement(n) => (n.start, n.end),
            TemplateNode::IfBlock(n) => (n.start, n.end),
            TemplateNode::EachBlock(n) => (n.start, n.end),
            TemplateNode::AwaitBlock(n) => (n.start, n.end),
            TemplateNode::KeyBlock(n) => (n.start, n.end),
            TemplateNode::SnippetBlock(n) => (n.start, n.end),
            TemplateNode::Opaque(n) => (n.start, n.end),
        };
        Span::new(start, end)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Text {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionTag {
    pub start: usize,
    pub end: usize,
    pub expression: Expression,
}

/// Regular elements, components and `<svelte:*>` elements share one shape
#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    pub start: usize,
    pub end: usize,
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<AttributeNode>,
    #[serde(default)]
    pub fragment: Fragment,
}

impl Element {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IfBlock {
    pub start: usize,
    pub end: usize,
    pub test: Expression,
    #[serde(default)]
    pub consequent: Fragment,
    #[serde(default)]
    pub alternate: Option<Fragment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EachBlock {
    pub start: usize,
    pub end: usize,
    pub expression: Expression,
    #[serde(default)]
    pub body: Fragment,
    #[serde(default)]
    pub fallback: Option<Fragment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AwaitBlock {
    pub start: usize,
    pub end: usize,
    pub expression: Expression,
    #[serde(default)]
    pub pending: Option<Fragment>,
    #[serde(default)]
    pub then: Option<Fragment>,
    #[serde(default)]
    pub catch: Option<Fragment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyBlock {
    pub start: usize,
    pub end: usize,
    pub expression: Expression,
    #[serde(default)]
    pub fragment: Fragment,
}

/// `{#snippet name(params)}...{/snippet}`
#[derive(Debug, Clone, Deserialize)]
pub struct SnippetBlock {
    pub start: usize,
    pub end: usize,
    pub expression: Identifier,
    #[serde(default)]
    pub parameters: Vec<Pattern>,
    #[serde(default)]
    pub body: Fragment,
}

impl SnippetBlock {
    pub fn name(&self) -> &str {
        &self.expression.name
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum AttributeNode {
    Attribute(Attribute),
    SpreadAttribute(SpreadAttribute),
    /// `bind:`, `on:`, `use:`, `class:` ... directives
    #[serde(other)]
    Directive,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attribute {
    pub start: usize,
    pub end: usize,
    pub name: String,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpreadAttribute {
    pub start: usize,
    pub end: usize,
    pub expression: Expression,
}

/// Raw attribute value as the parser shapes it
///
/// `true` for a bare attribute (`<Story asChild />`), a single expression tag
/// for `name={...}`, otherwise a sequence of text and expression chunks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bare(bool),
    Expression(ExpressionTag),
    Sequence(Vec<AttributeChunk>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum AttributeChunk {
    Text(Text),
    ExpressionTag(ExpressionTag),
}
