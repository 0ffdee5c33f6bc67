// Indexer-mode walker
//
// Lean pass producing `{ meta, stories }` for the story index. Supports the
// modern dialect (destructured `defineMeta`) and, when enabled, the legacy
// dialect (`<Meta>` / `<Story>` components plus `export const meta = {...}`).

use tracing::debug;

use crate::ast::{NodeKind, NodeRef, SourceDocument, TemplateNode};
use crate::error::{ExtractError, Result};
use crate::extractors::base::{
    walk, BaseExtractor, IndexedMeta, IndexedStory, IndexerOptions, IndexerResult, Visitors, Walk,
};
use crate::extractors::svelte::attributes::{Attributes, MetaObject};
use crate::extractors::svelte::identity::IdentityRegistry;
use crate::extractors::svelte::raw_source::{Normalization, RawSourceRecoverer};
use crate::extractors::svelte::script::ScriptFacts;
use crate::utils::{export_name_from_name, name_from_export_name};

pub struct StoriesIndexer<'a> {
    base: BaseExtractor<'a>,
    options: &'a IndexerOptions,
}

impl<'a> StoriesIndexer<'a> {
    pub fn new(document: &'a SourceDocument, options: &'a IndexerOptions) -> Self {
        Self {
            base: BaseExtractor::new(document),
            options,
        }
    }

    pub fn index(&self) -> Result<IndexerResult> {
        let legacy = self.options.legacy_template;
        if !legacy && self.base.root().module.is_none() {
            return Err(ExtractError::MissingModuleTag {
                filename: self.base.file_path().to_string(),
            });
        }

        let facts = ScriptFacts::resolve(self.base, &self.options.package_name)?;
        let marker_tag = if legacy {
            facts.marker_tag()
        } else {
            facts.require_story_tag(self.base)?
        };

        let mut meta = IndexedMeta::default();
        if let Some(object) = facts.meta() {
            let reader = MetaObject::new(self.base, object);
            meta.title = reader.get_string("title")?.map(str::to_string);
            meta.tags = reader.get_string_array("tags")?;
        }

        let raw_source = self.options.include_raw_source.then(|| {
            RawSourceRecoverer::new(
                self.base,
                facts.template_snippet,
                facts.component(self.base),
                Normalization::SingleLine,
            )
        });

        let mut scan = IndexScan {
            base: self.base,
            marker_tag,
            meta_tag: legacy.then(|| facts.meta_tag()),
            // Index entries carry no ids
            identity: IdentityRegistry::new(self.base.file_path(), Default::default(), false),
            raw_source,
            meta,
            stories: Vec::new(),
        };
        let visitors: Visitors<'a, IndexScan<'a>, ExtractError> = Visitors::new()
            .on(NodeKind::Script, skip_script)
            .on(NodeKind::Component, on_component);
        walk(NodeRef::Root(self.base.root()), &mut scan, &visitors)?;

        debug!(
            "Indexed {} stories from '{}' (legacy: {})",
            scan.stories.len(),
            self.base.file_path(),
            legacy
        );
        Ok(IndexerResult {
            meta: scan.meta,
            stories: scan.stories,
        })
    }
}

pub fn parse_for_indexer(document: &SourceDocument, options: &IndexerOptions) -> Result<IndexerResult> {
    StoriesIndexer::new(document, options).index()
}

struct IndexScan<'a> {
    base: BaseExtractor<'a>,
    marker_tag: &'a str,
    /// Legacy `<Meta>` tag, only recognized in legacy mode
    meta_tag: Option<&'a str>,
    identity: IdentityRegistry,
    raw_source: Option<RawSourceRecoverer<'a>>,
    meta: IndexedMeta,
    stories: Vec<IndexedStory>,
}

type IndexWalk<'v, 'a> = Walk<'v, 'a, IndexScan<'a>, ExtractError>;

fn skip_script<'a>(_node: NodeRef<'a>, _scan: &mut IndexScan<'a>, _walk: &IndexWalk<'_, 'a>) -> Result<()> {
    Ok(())
}

fn on_component<'a>(node: NodeRef<'a>, scan: &mut IndexScan<'a>, walk: &IndexWalk<'_, 'a>) -> Result<()> {
    let NodeRef::Template(TemplateNode::Component(element)) = node else {
        return walk.visit_children(node, scan);
    };

    if element.name == scan.marker_tag {
        let attributes = Attributes::new(scan.base, element);
        let filename = || scan.base.file_path().to_string();

        let (export_name, name) = match (
            attributes.get_string("exportName")?,
            attributes.get_string("name")?,
        ) {
            (Some(export_name), Some(name)) => (export_name.to_string(), name.to_string()),
            (Some(export_name), None) => (export_name.to_string(), name_from_export_name(export_name)),
            (None, Some(name)) => {
                let export_name = export_name_from_name(name).ok_or_else(|| {
                    ExtractError::InvalidExportName {
                        filename: filename(),
                        name: name.to_string(),
                    }
                })?;
                (export_name, name.to_string())
            }
            (None, None) => {
                return Err(ExtractError::MissingStoryIdentity {
                    filename: filename(),
                    offset: element.start,
                });
            }
        };
        scan.identity.claim_export_name(&export_name)?;
        scan.identity.claim_name(&name)?;

        let tags = attributes.get_string_array("tags")?.unwrap_or_default();
        let raw_source = match &scan.raw_source {
            Some(recoverer) => recoverer.recover(element, &name)?,
            None => None,
        };

        scan.stories.push(IndexedStory {
            export_name,
            name,
            tags,
            raw_source,
        });
        return Ok(());
    }

    if scan.meta_tag == Some(element.name.as_str()) {
        // Attribute values win over `export const meta = {...}`
        let attributes = Attributes::new(scan.base, element);
        if let Some(title) = attributes.get_string("title")? {
            scan.meta.title = Some(title.to_string());
        }
        if let Some(tags) = attributes.get_string_array("tags")? {
            scan.meta.tags = Some(tags);
        }
        return Ok(());
    }

    walk.visit_children(node, scan)
}
