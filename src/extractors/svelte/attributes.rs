// Strict static-value accessors for marker attributes and meta objects
//
// Every read goes through `StaticValue`, a tagged view of what the parser
// produced. Conversions match on the tag and fail with a typed error when the
// value is dynamic or has the wrong shape; nothing is coerced.

use crate::ast::{
    AttributeChunk, AttributeNode, AttributeValue, Element, Expression, ObjectExpression,
};
use crate::error::{ExtractError, Result};
use crate::extractors::base::{BaseExtractor, StorySource};

#[derive(Debug, Clone, PartialEq)]
pub enum StaticValue<'a> {
    Str(&'a str),
    Bool(bool),
    Array(Vec<StaticValue<'a>>),
    /// Present but not statically known (identifiers, calls, interpolations...)
    Dynamic,
    Absent,
}

impl<'a> StaticValue<'a> {
    pub fn from_expression(expression: &'a Expression) -> Self {
        match expression {
            Expression::Literal(literal) => {
                if let Some(text) = literal.as_str() {
                    StaticValue::Str(text)
                } else if let Some(flag) = literal.as_bool() {
                    StaticValue::Bool(flag)
                } else {
                    StaticValue::Dynamic
                }
            }
            Expression::TemplateLiteral(template) => template
                .static_text()
                .map(StaticValue::Str)
                .unwrap_or(StaticValue::Dynamic),
            Expression::ArrayExpression(array) => StaticValue::Array(
                array
                    .elements
                    .iter()
                    .map(|element| match element {
                        Some(expr) => StaticValue::from_expression(expr),
                        None => StaticValue::Absent,
                    })
                    .collect(),
            ),
            _ => StaticValue::Dynamic,
        }
    }

    pub fn from_attribute_value(value: &'a AttributeValue) -> Self {
        match value {
            AttributeValue::Bare(flag) => StaticValue::Bool(*flag),
            AttributeValue::Expression(tag) => StaticValue::from_expression(&tag.expression),
            AttributeValue::Sequence(chunks) => match chunks.as_slice() {
                [] => StaticValue::Str(""),
                [AttributeChunk::Text(text)] => StaticValue::Str(&text.data),
                [AttributeChunk::ExpressionTag(tag)] => {
                    StaticValue::from_expression(&tag.expression)
                }
                _ => StaticValue::Dynamic,
            },
        }
    }
}

// Conversions shared by attribute and property readers. `invalid` builds the
// error for a value of the wrong shape.
fn to_string<'a>(
    value: StaticValue<'a>,
    invalid: impl FnOnce() -> ExtractError,
) -> Result<Option<&'a str>> {
    match value {
        StaticValue::Absent => Ok(None),
        StaticValue::Str(text) => Ok(Some(text)),
        _ => Err(invalid()),
    }
}

fn to_string_array(
    value: StaticValue<'_>,
    invalid: impl FnOnce() -> ExtractError,
    element: impl Fn(usize) -> ExtractError,
) -> Result<Option<Vec<String>>> {
    match value {
        StaticValue::Absent => Ok(None),
        StaticValue::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                StaticValue::Str(text) => Ok(text.to_string()),
                _ => Err(element(index)),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        _ => Err(invalid()),
    }
}

/// Attribute reader for one marker element
pub struct Attributes<'a> {
    base: BaseExtractor<'a>,
    element: &'a Element,
}

impl<'a> Attributes<'a> {
    pub fn new(base: BaseExtractor<'a>, element: &'a Element) -> Self {
        Self { base, element }
    }

    fn find(&self, name: &str) -> Option<&'a AttributeValue> {
        self.element.attributes.iter().find_map(|attr| match attr {
            AttributeNode::Attribute(a) if a.name == name => Some(&a.value),
            _ => None,
        })
    }

    pub fn value(&self, name: &str) -> StaticValue<'a> {
        self.find(name)
            .map(StaticValue::from_attribute_value)
            .unwrap_or(StaticValue::Absent)
    }

    /// Single `{expression}` value of the attribute, if that is its shape
    pub fn expression(&self, name: &str) -> Option<&'a Expression> {
        match self.find(name)? {
            AttributeValue::Expression(tag) => Some(&tag.expression),
            AttributeValue::Sequence(chunks) => match chunks.as_slice() {
                [AttributeChunk::ExpressionTag(tag)] => Some(&tag.expression),
                _ => None,
            },
            AttributeValue::Bare(_) => None,
        }
    }

    pub fn get_string(&self, name: &str) -> Result<Option<&'a str>> {
        to_string(self.value(name), || {
            self.base.invalid_attribute(name, "a static string")
        })
    }

    pub fn get_bool(&self, name: &str) -> Result<Option<bool>> {
        match self.value(name) {
            StaticValue::Absent => Ok(None),
            StaticValue::Bool(flag) => Ok(Some(flag)),
            _ => Err(self.base.invalid_attribute(name, "a static boolean")),
        }
    }

    pub fn get_string_array(&self, name: &str) -> Result<Option<Vec<String>>> {
        to_string_array(
            self.value(name),
            || self.base.invalid_attribute(name, "a static array of strings"),
            |index| ExtractError::ArrayElementNotString {
                filename: self.base.file_path().to_string(),
                name: name.to_string(),
                index,
            },
        )
    }

    /// `source` attribute: a static boolean, else a static string
    pub fn get_source(&self) -> Result<Option<StorySource>> {
        match self.value("source") {
            StaticValue::Absent => Ok(None),
            StaticValue::Bool(flag) => Ok(Some(StorySource::Flag(flag))),
            StaticValue::Str(code) => Ok(Some(StorySource::Code(code.to_string()))),
            _ => Err(self
                .base
                .invalid_attribute("source", "a static boolean or string")),
        }
    }

    /// Snippet name referenced by `children={name}`
    pub fn children_identifier(&self) -> Option<&'a str> {
        self.expression("children")?
            .as_identifier()
            .map(|ident| ident.name.as_str())
    }
}

/// Property reader for a meta object literal
pub struct MetaObject<'a> {
    base: BaseExtractor<'a>,
    object: &'a ObjectExpression,
}

impl<'a> MetaObject<'a> {
    pub fn new(base: BaseExtractor<'a>, object: &'a ObjectExpression) -> Self {
        Self { base, object }
    }

    pub fn value(&self, key: &str) -> StaticValue<'a> {
        self.object
            .property(key)
            .map(StaticValue::from_expression)
            .unwrap_or(StaticValue::Absent)
    }

    pub fn get_string(&self, key: &str) -> Result<Option<&'a str>> {
        to_string(self.value(key), || {
            self.base.invalid_meta_property(key, "a static string")
        })
    }

    pub fn get_string_array(&self, key: &str) -> Result<Option<Vec<String>>> {
        to_string_array(
            self.value(key),
            || self.base.invalid_meta_property(key, "a static array of strings"),
            |index| ExtractError::ArrayElementNotString {
                filename: self.base.file_path().to_string(),
                name: key.to_string(),
                index,
            },
        )
    }

    /// Name of the identifier bound to `key` (`component: Button`)
    pub fn get_identifier(&self, key: &str) -> Option<&'a str> {
        self.object
            .property(key)?
            .as_identifier()
            .map(|ident| ident.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Root, SourceDocument, TemplateNode};
    use serde_json::json;

    fn story_document(attributes: serde_json::Value) -> SourceDocument {
        let root: Root = serde_json::from_value(json!({
            "type": "Root",
            "start": 0,
            "end": 100,
            "fragment": { "type": "Fragment", "nodes": [
                { "type": "Component", "start": 0, "end": 100, "name": "Story",
                  "attributes": attributes,
                  "fragment": { "type": "Fragment", "nodes": [] } }
            ]}
        }))
        .unwrap();
        SourceDocument::new("Button.stories.svelte", " ".repeat(100), root)
    }

    fn element(doc: &SourceDocument) -> &Element {
        match &doc.root().fragment.nodes[0] {
            TemplateNode::Component(el) => el,
            _ => unreachable!(),
        }
    }

    fn text_attr(name: &str, data: &str) -> serde_json::Value {
        json!({ "type": "Attribute", "start": 0, "end": 0, "name": name,
                "value": [{ "type": "Text", "start": 0, "end": 0, "data": data }] })
    }

    fn expr_attr(name: &str, expression: serde_json::Value) -> serde_json::Value {
        json!({ "type": "Attribute", "start": 0, "end": 0, "name": name,
                "value": { "type": "ExpressionTag", "start": 0, "end": 0, "expression": expression } })
    }

    #[test]
    fn test_string_attribute_forms() {
        let doc = story_document(json!([
            text_attr("name", "Primary"),
            expr_attr("id", json!({ "type": "Literal", "value": "primary-id" })),
            expr_attr("title", json!({ "type": "TemplateLiteral",
                "quasis": [{ "type": "TemplateElement", "value": { "cooked": "T", "raw": "T" } }],
                "expressions": [] })),
        ]));
        let attrs = Attributes::new(BaseExtractor::new(&doc), element(&doc));

        assert_eq!(attrs.get_string("name").unwrap(), Some("Primary"));
        assert_eq!(attrs.get_string("id").unwrap(), Some("primary-id"));
        assert_eq!(attrs.get_string("title").unwrap(), Some("T"));
        assert_eq!(attrs.get_string("missing").unwrap(), None);
    }

    #[test]
    fn test_dynamic_string_is_rejected() {
        let doc = story_document(json!([
            expr_attr("name", json!({ "type": "Identifier", "name": "storyName" })),
        ]));
        let attrs = Attributes::new(BaseExtractor::new(&doc), element(&doc));

        let err = attrs.get_string("name").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::InvalidAttribute { ref attribute, .. } if attribute == "name"
        ));
    }

    #[test]
    fn test_source_attribute_bool_then_string() {
        let bare = json!({ "type": "Attribute", "start": 0, "end": 0, "name": "source", "value": true });
        let doc = story_document(json!([bare]));
        let attrs = Attributes::new(BaseExtractor::new(&doc), element(&doc));
        assert_eq!(attrs.get_source().unwrap(), Some(StorySource::Flag(true)));

        let doc = story_document(json!([text_attr("source", "<Button />")]));
        let attrs = Attributes::new(BaseExtractor::new(&doc), element(&doc));
        assert_eq!(
            attrs.get_source().unwrap(),
            Some(StorySource::Code("<Button />".to_string()))
        );

        let doc = story_document(json!([
            expr_attr("source", json!({ "type": "CallExpression",
                "callee": { "type": "Identifier", "name": "code" }, "arguments": [] })),
        ]));
        let attrs = Attributes::new(BaseExtractor::new(&doc), element(&doc));
        assert!(attrs.get_source().is_err());
    }

    #[test]
    fn test_string_array_rejects_dynamic_element() {
        let doc = story_document(json!([
            expr_attr("tags", json!({ "type": "ArrayExpression", "elements": [
                { "type": "Literal", "value": "autodocs" },
                { "type": "Identifier", "name": "extra" }
            ]})),
        ]));
        let attrs = Attributes::new(BaseExtractor::new(&doc), element(&doc));

        let err = attrs.get_string_array("tags").unwrap_err();
        assert_eq!(
            err,
            ExtractError::ArrayElementNotString {
                filename: "Button.stories.svelte".to_string(),
                name: "tags".to_string(),
                index: 1,
            }
        );
    }

    #[test]
    fn test_children_identifier() {
        let doc = story_document(json!([
            expr_attr("children", json!({ "type": "Identifier", "name": "tmpl" })),
        ]));
        let attrs = Attributes::new(BaseExtractor::new(&doc), element(&doc));
        assert_eq!(attrs.children_identifier(), Some("tmpl"));
    }

    #[test]
    fn test_meta_object_properties() {
        let object: ObjectExpression = serde_json::from_value(json!({
            "type": "ObjectExpression",
            "properties": [
                { "type": "Property", "key": { "type": "Identifier", "name": "title" },
                  "value": { "type": "Literal", "value": "Atoms/Button" } },
                { "type": "Property", "key": { "type": "Identifier", "name": "component" },
                  "value": { "type": "Identifier", "name": "Button" } },
                { "type": "Property", "key": { "type": "Literal", "value": "tags" },
                  "value": { "type": "ArrayExpression", "elements": [
                      { "type": "Literal", "value": "autodocs" }
                  ]} }
            ]
        }))
        .unwrap();
        let doc = story_document(json!([]));
        let meta = MetaObject::new(BaseExtractor::new(&doc), &object);

        assert_eq!(meta.get_string("title").unwrap(), Some("Atoms/Button"));
        assert_eq!(
            meta.get_string_array("tags").unwrap(),
            Some(vec!["autodocs".to_string()])
        );
        assert_eq!(meta.get_identifier("component"), Some("Button"));
        assert!(matches!(
            meta.get_string("component"),
            Err(ExtractError::InvalidMetaProperty { .. })
        ));
    }
}
