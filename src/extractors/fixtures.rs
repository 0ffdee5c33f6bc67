// Test fixtures: Svelte parser output built around real source text
//
// Template node offsets are computed from the source so slicing and adjacency
// checks run against the same text the parser would have seen. Script nodes
// carry no offsets; nothing slices them.

use serde_json::{json, Value};

use crate::ast::SourceDocument;
use crate::extractors::base::DEFAULT_PACKAGE_NAME;

/// Offsets of the first occurrence of `needle`
pub(crate) fn span(source: &str, needle: &str) -> (usize, usize) {
    let start = source
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in fixture source"));
    (start, start + needle.len())
}

pub(crate) fn text(source: &str, needle: &str) -> Value {
    let (start, end) = span(source, needle);
    json!({ "type": "Text", "start": start, "end": end, "data": needle })
}

/// `needle` is the whole `<!-- ... -->` comment
pub(crate) fn comment(source: &str, needle: &str) -> Value {
    let (start, end) = span(source, needle);
    let data = needle
        .trim_start_matches("<!--")
        .trim_end_matches("-->");
    json!({ "type": "Comment", "start": start, "end": end, "data": data })
}

/// `{@const ...}`, `{@debug ...}` and other tags with no dedicated variant
pub(crate) fn tag(source: &str, needle: &str, kind: &str) -> Value {
    let (start, end) = span(source, needle);
    json!({ "type": kind, "start": start, "end": end })
}

pub(crate) fn component(
    source: &str,
    needle: &str,
    name: &str,
    attributes: Value,
    nodes: Value,
) -> Value {
    let (start, end) = span(source, needle);
    json!({
        "type": "Component",
        "start": start,
        "end": end,
        "name": name,
        "attributes": attributes,
        "fragment": { "type": "Fragment", "nodes": nodes }
    })
}

pub(crate) fn snippet(source: &str, needle: &str, name: &str, nodes: Value) -> Value {
    let (start, end) = span(source, needle);
    json!({
        "type": "SnippetBlock",
        "start": start,
        "end": end,
        "expression": { "type": "Identifier", "name": name },
        "parameters": [{ "type": "Identifier", "name": "args" }],
        "body": { "type": "Fragment", "nodes": nodes }
    })
}

pub(crate) fn text_attribute(name: &str, value: &str) -> Value {
    json!({
        "type": "Attribute", "start": 0, "end": 0, "name": name,
        "value": [{ "type": "Text", "start": 0, "end": 0, "data": value }]
    })
}

pub(crate) fn expression_attribute(name: &str, expression: Value) -> Value {
    json!({
        "type": "Attribute", "start": 0, "end": 0, "name": name,
        "value": { "type": "ExpressionTag", "start": 0, "end": 0, "expression": expression }
    })
}

pub(crate) fn identifier(name: &str) -> Value {
    json!({ "type": "Identifier", "name": name })
}

pub(crate) fn literal(value: Value) -> Value {
    json!({ "type": "Literal", "value": value })
}

pub(crate) fn string_array(values: &[&str]) -> Value {
    let elements: Vec<Value> = values.iter().map(|v| literal(json!(v))).collect();
    json!({ "type": "ArrayExpression", "elements": elements })
}

pub(crate) fn property(key: &str, value: Value) -> Value {
    json!({ "type": "Property", "key": identifier(key), "value": value,
            "computed": false, "shorthand": false })
}

/// `import { imported as local, ... } from "<package>"`
pub(crate) fn import(package: &str, specifiers: &[(&str, &str)]) -> Value {
    let specifiers: Vec<Value> = specifiers
        .iter()
        .map(|(imported, local)| {
            json!({ "type": "ImportSpecifier", "imported": identifier(imported), "local": identifier(local) })
        })
        .collect();
    json!({ "type": "ImportDeclaration", "specifiers": specifiers, "source": literal(json!(package)) })
}

/// `const { Story: <story_local> } = <callee>({ ...properties })`
pub(crate) fn define_meta_call(callee: &str, story_local: &str, properties: Value) -> Value {
    json!({
        "type": "VariableDeclaration",
        "kind": "const",
        "declarations": [{
            "type": "VariableDeclarator",
            "id": { "type": "ObjectPattern", "properties": [{
                "type": "Property",
                "key": identifier("Story"),
                "value": identifier(story_local),
                "computed": false,
                "shorthand": story_local == "Story"
            }]},
            "init": {
                "type": "CallExpression",
                "callee": identifier(callee),
                "arguments": [{ "type": "ObjectExpression", "properties": properties }]
            }
        }]
    })
}

/// Module script with the usual `defineMeta` import and destructuring
pub(crate) fn modern_module(properties: Value) -> Value {
    script(
        "module",
        json!([
            import(DEFAULT_PACKAGE_NAME, &[("defineMeta", "defineMeta")]),
            define_meta_call("defineMeta", "Story", properties),
        ]),
    )
}

pub(crate) fn script(context: &str, body: Value) -> Value {
    json!({
        "type": "Script", "start": 0, "end": 0, "context": context,
        "content": { "type": "Program", "start": 0, "end": 0, "body": body }
    })
}

pub(crate) fn document(
    source: &str,
    module: Option<Value>,
    instance: Option<Value>,
    nodes: Value,
) -> SourceDocument {
    let root = json!({
        "type": "Root",
        "start": 0,
        "end": source.len(),
        "fragment": { "type": "Fragment", "nodes": nodes },
        "module": module,
        "instance": instance
    });
    SourceDocument::from_json("Button.stories.svelte", source, &root.to_string())
        .unwrap_or_else(|err| panic!("invalid fixture tree: {err}"))
}
