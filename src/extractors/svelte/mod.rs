// Svelte CSF story extractor
//
// Works on the parser output for a `*.stories.svelte` document:
// - script.rs: resolves the marker tag and meta from the script regions
// - stories.rs: walks the markup and recognizes story markers
// - attributes.rs, comments.rs, identity.rs, raw_source.rs: per-marker steps

pub mod attributes;
pub mod comments;
pub mod identity;
pub mod raw_source;
pub mod script;
mod stories;

use crate::ast::SourceDocument;
use crate::error::Result;
use crate::extractors::base::{BaseExtractor, Catalog, ExtractorConfig};

use comments::CommentCursor;
use identity::IdentityRegistry;
use raw_source::{Normalization, RawSourceRecoverer};
use script::ScriptFacts;
use stories::StoryScan;

/// Full story extraction for one document
pub struct SvelteCsfExtractor<'a> {
    base: BaseExtractor<'a>,
    config: &'a ExtractorConfig,
}

impl<'a> SvelteCsfExtractor<'a> {
    pub fn new(document: &'a SourceDocument, config: &'a ExtractorConfig) -> Self {
        Self {
            base: BaseExtractor::new(document),
            config,
        }
    }

    /// Build the story catalog
    ///
    /// Fails on the first fatal condition; no partial catalog is returned.
    pub fn extract_stories(&self) -> Result<Catalog> {
        let facts = ScriptFacts::resolve(self.base, &self.config.package_name)?;

        let scan = StoryScan {
            base: self.base,
            marker_tag: facts.marker_tag(),
            comments: CommentCursor::default(),
            identity: IdentityRegistry::new(
                self.base.file_path(),
                self.config.id_hash,
                self.config.unify_id_sets,
            ),
            raw_source: RawSourceRecoverer::new(
                self.base,
                facts.template_snippet,
                facts.component(self.base),
                Normalization::Dedent,
            ),
            catalog: Catalog::new(),
        };
        scan.run()
    }
}

pub fn extract_stories(document: &SourceDocument, config: &ExtractorConfig) -> Result<Catalog> {
    SvelteCsfExtractor::new(document, config).extract_stories()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::extractors::base::{ExtractionWarning, StorySource, DEFAULT_PACKAGE_NAME};
    use crate::extractors::fixtures::*;
    use serde_json::json;

    fn story(source: &str, needle: &str, attributes: serde_json::Value) -> serde_json::Value {
        component(source, needle, "Story", attributes, json!([]))
    }

    fn button_meta() -> serde_json::Value {
        modern_module(json!([property("component", identifier("Button"))]))
    }

    #[test]
    fn test_names_ids_and_adjacent_descriptions() {
        let source = "<!-- Primary button -->\n<Story name=\"Primary\" />\n\n<!-- Detached -->\n\n<Story name=\"My story!!\" source />";
        let doc = document(
            source,
            Some(button_meta()),
            None,
            json!([
                comment(source, "<!-- Primary button -->"),
                story(source, "<Story name=\"Primary\" />", json!([text_attribute("name", "Primary")])),
                comment(source, "<!-- Detached -->"),
                story(source, "<Story name=\"My story!!\" source />", json!([
                    text_attribute("name", "My story!!"),
                    { "type": "Attribute", "start": 0, "end": 0, "name": "source", "value": true }
                ])),
            ]),
        );

        let catalog = extract_stories(&doc, &ExtractorConfig::default()).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Primary", "My story!!"]);

        let primary = catalog.get("Primary").unwrap();
        assert_eq!(primary.id, "Primary");
        assert_eq!(primary.description.as_deref(), Some("Primary button"));
        assert_eq!(primary.raw_source.as_deref(), Some("<Button {...args} />"));

        let second = catalog.get("My story!!").unwrap();
        assert_eq!(second.id, "MyStory");
        assert_eq!(second.description, None);
        assert_eq!(second.source, Some(StorySource::Flag(true)));
        assert!(catalog.warnings().is_empty());
    }

    #[test]
    fn test_children_snippet_reference() {
        let source = "{#snippet tmpl(args)}<Btn {...args}/>{/snippet}\n<Story name=\"Default\" children={tmpl} />";
        let doc = document(
            source,
            Some(button_meta()),
            None,
            json!([
                snippet(source, "{#snippet tmpl(args)}<Btn {...args}/>{/snippet}", "tmpl", json!([
                    component(source, "<Btn {...args}/>", "Btn", json!([]), json!([]))
                ])),
                story(source, "<Story name=\"Default\" children={tmpl} />", json!([
                    text_attribute("name", "Default"),
                    expression_attribute("children", identifier("tmpl")),
                ])),
            ]),
        );

        let catalog = extract_stories(&doc, &ExtractorConfig::default()).unwrap();
        assert_eq!(
            catalog.get("Default").unwrap().raw_source.as_deref(),
            Some("<Btn {...args}/>")
        );
    }

    #[test]
    fn test_missing_children_snippet_is_locator_error() {
        let source = "<Story name=\"Default\" children={nope} />";
        let doc = document(
            source,
            Some(button_meta()),
            None,
            json!([story(source, source, json!([
                text_attribute("name", "Default"),
                expression_attribute("children", identifier("nope")),
            ]))]),
        );

        let err = extract_stories(&doc, &ExtractorConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ExtractError::SnippetNotFound {
                filename: "Button.stories.svelte".to_string(),
                snippet: "nope".to_string(),
                story: "Default".to_string(),
            }
        );
    }

    #[test]
    fn test_set_template_snippet() {
        let source = "{#snippet template(args)}<Button {...args} label=\"x\" />{/snippet}\n<Story name=\"Templated\" />";
        let instance = script(
            "default",
            json!([{
                "type": "ExpressionStatement",
                "expression": {
                    "type": "CallExpression",
                    "callee": identifier("setTemplate"),
                    "arguments": [identifier("template")]
                }
            }]),
        );
        let doc = document(
            source,
            Some(button_meta()),
            Some(instance),
            json!([
                snippet(source, "{#snippet template(args)}<Button {...args} label=\"x\" />{/snippet}", "template", json!([
                    component(source, "<Button {...args} label=\"x\" />", "Button", json!([]), json!([]))
                ])),
                story(source, "<Story name=\"Templated\" />", json!([text_attribute("name", "Templated")])),
            ]),
        );

        let catalog = extract_stories(&doc, &ExtractorConfig::default()).unwrap();
        assert_eq!(
            catalog.get("Templated").unwrap().raw_source.as_deref(),
            Some("<Button {...args} label=\"x\" />")
        );
    }

    #[test]
    fn test_inline_children_are_dedented() {
        let source = "<Story name=\"Inline\">\n    <Button primary>\n      Click\n    </Button>\n</Story>";
        let (_, button_end) = span(source, "<Button primary>\n      Click\n    </Button>");
        let (close_start, _) = span(source, "</Story>");
        let nodes = json!([
            text(source, "\n    "),
            component(source, "<Button primary>\n      Click\n    </Button>", "Button", json!([]), json!([])),
            { "type": "Text", "start": button_end, "end": close_start, "data": "\n" },
        ]);
        let doc = document(
            source,
            Some(button_meta()),
            None,
            json!([component(source, source, "Story", json!([text_attribute("name", "Inline")]), nodes)]),
        );

        let catalog = extract_stories(&doc, &ExtractorConfig::default()).unwrap();
        assert_eq!(
            catalog.get("Inline").unwrap().raw_source.as_deref(),
            Some("<Button primary>\n  Click\n</Button>")
        );
    }

    #[test]
    fn test_inline_children_snippet_body() {
        let source = "<Story name=\"Snippet\">{#snippet children(args)}<Button {...args} />{/snippet}</Story>";
        let doc = document(
            source,
            Some(button_meta()),
            None,
            json!([component(source, source, "Story", json!([text_attribute("name", "Snippet")]), json!([
                snippet(source, "{#snippet children(args)}<Button {...args} />{/snippet}", "children", json!([
                    component(source, "<Button {...args} />", "Button", json!([]), json!([]))
                ]))
            ]))]),
        );

        let catalog = extract_stories(&doc, &ExtractorConfig::default()).unwrap();
        assert_eq!(
            catalog.get("Snippet").unwrap().raw_source.as_deref(),
            Some("<Button {...args} />")
        );
    }

    #[test]
    fn test_const_and_debug_tags_bound_the_snippet_body() {
        let body = "{@const label = args.label}<Button {label} />{@debug label}";
        let source = format!("<Story name=\"Labelled\">{{#snippet children(args)}}{body}{{/snippet}}</Story>");
        let block = format!("{{#snippet children(args)}}{body}{{/snippet}}");
        let doc = document(
            &source,
            Some(button_meta()),
            None,
            json!([component(&source, &source, "Story", json!([text_attribute("name", "Labelled")]), json!([
                snippet(&source, &block, "children", json!([
                    tag(&source, "{@const label = args.label}", "ConstTag"),
                    component(&source, "<Button {label} />", "Button", json!([]), json!([])),
                    tag(&source, "{@debug label}", "DebugTag"),
                ]))
            ]))]),
        );

        let catalog = extract_stories(&doc, &ExtractorConfig::default()).unwrap();
        assert_eq!(catalog.get("Labelled").unwrap().raw_source.as_deref(), Some(body));
    }

    #[test]
    fn test_empty_inline_body_has_no_raw_source() {
        let source = "<Story name=\"Empty\"></Story>";
        let doc = document(
            source,
            Some(button_meta()),
            None,
            json!([component(source, source, "Story", json!([text_attribute("name", "Empty")]), json!([]))]),
        );

        let catalog = extract_stories(&doc, &ExtractorConfig::default()).unwrap();
        assert_eq!(catalog.get("Empty").unwrap().raw_source, None);
    }

    #[test]
    fn test_colliding_derived_ids_warn_and_suffix() {
        let source = "<Story name=\"Primary CTA!!\" />\n<Story name=\"Primary CTA??\" />";
        let doc = document(
            source,
            Some(button_meta()),
            None,
            json!([
                story(source, "<Story name=\"Primary CTA!!\" />", json!([text_attribute("name", "Primary CTA!!")])),
                story(source, "<Story name=\"Primary CTA??\" />", json!([text_attribute("name", "Primary CTA??")])),
            ]),
        );

        let catalog = extract_stories(&doc, &ExtractorConfig::default()).unwrap();
        assert_eq!(catalog.get("Primary CTA!!").unwrap().id, "PrimaryCTA");
        assert_eq!(catalog.get("Primary CTA??").unwrap().id, "PrimaryCTA496765ee");
        assert_eq!(
            catalog.warnings(),
            &[ExtractionWarning::IdCollision {
                filename: "Button.stories.svelte".to_string(),
                name: "Primary CTA??".to_string(),
                derived_id: "PrimaryCTA".to_string(),
                assigned_id: "PrimaryCTA496765ee".to_string(),
            }]
        );
    }

    #[test]
    fn test_explicit_id_and_duplicate_name() {
        let source = "<Story name=\"A\" id=\"custom\" />\n<Story name=\"A\" />";
        let doc = document(
            source,
            Some(button_meta()),
            None,
            json!([
                story(source, "<Story name=\"A\" id=\"custom\" />", json!([
                    text_attribute("name", "A"),
                    text_attribute("id", "custom"),
                ])),
                story(source, "<Story name=\"A\" />", json!([text_attribute("name", "A")])),
            ]),
        );

        let err = extract_stories(&doc, &ExtractorConfig::default()).unwrap_err();
        assert!(matches!(err, ExtractError::DuplicateStoryName { ref name, .. } if name == "A"));
    }

    #[test]
    fn test_missing_name_is_fatal() {
        let source = "<Story id=\"x\" />";
        let doc = document(
            source,
            Some(button_meta()),
            None,
            json!([story(source, source, json!([text_attribute("id", "x")]))]),
        );

        let err = extract_stories(&doc, &ExtractorConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ExtractError::MissingStoryName {
                filename: "Button.stories.svelte".to_string(),
                offset: 0,
            }
        );
    }

    #[test]
    fn test_aliased_story_tag() {
        let source = "<Story name=\"Ignored\" />\n<S name=\"Aliased\" />";
        let module = script(
            "module",
            json!([
                import(DEFAULT_PACKAGE_NAME, &[("defineMeta", "meta")]),
                define_meta_call("meta", "S", json!([])),
            ]),
        );
        let doc = document(
            source,
            Some(module),
            None,
            json!([
                story(source, "<Story name=\"Ignored\" />", json!([text_attribute("name", "Ignored")])),
                component(source, "<S name=\"Aliased\" />", "S", json!([text_attribute("name", "Aliased")]), json!([])),
            ]),
        );

        let catalog = extract_stories(&doc, &ExtractorConfig::default()).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Aliased"]);
        assert_eq!(
            catalog.get("Aliased").unwrap().raw_source.as_deref(),
            Some("<UnknownComponent {...args} />")
        );
    }

    #[test]
    fn test_namespace_import_is_fatal() {
        let source = "<Story name=\"A\" />";
        let module = script(
            "module",
            json!([{
                "type": "ImportDeclaration",
                "specifiers": [{ "type": "ImportNamespaceSpecifier", "local": identifier("csf") }],
                "source": literal(json!(DEFAULT_PACKAGE_NAME))
            }]),
        );
        let doc = document(source, Some(module), None, json!([]));

        let err = extract_stories(&doc, &ExtractorConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ExtractError::DefaultOrNamespaceImport {
                filename: "Button.stories.svelte".to_string(),
                package: DEFAULT_PACKAGE_NAME.to_string(),
            }
        );
        assert!(err.to_string().contains("Button.stories.svelte"));
    }

    #[test]
    fn test_default_import_is_fatal() {
        let source = "<Story name=\"A\" />";
        let module = script(
            "module",
            json!([{
                "type": "ImportDeclaration",
                "specifiers": [{ "type": "ImportDefaultSpecifier", "local": identifier("csf") }],
                "source": literal(json!(DEFAULT_PACKAGE_NAME))
            }]),
        );
        let doc = document(
            source,
            Some(module),
            None,
            json!([story(source, source, json!([text_attribute("name", "A")]))]),
        );

        let err = extract_stories(&doc, &ExtractorConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ExtractError::DefaultOrNamespaceImport {
                filename: "Button.stories.svelte".to_string(),
                package: DEFAULT_PACKAGE_NAME.to_string(),
            }
        );
    }
}
