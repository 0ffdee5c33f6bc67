// Story declaration recognizer (full extraction)

use tracing::debug;

use crate::ast::{NodeKind, NodeRef, TemplateNode};
use crate::error::{ExtractError, Result};
use crate::extractors::base::{walk, BaseExtractor, Catalog, StoryMeta, Visitors, Walk};

use super::attributes::Attributes;
use super::comments::CommentCursor;
use super::identity::IdentityRegistry;
use super::raw_source::RawSourceRecoverer;

/// Traversal state for one markup walk
pub(super) struct StoryScan<'a> {
    pub base: BaseExtractor<'a>,
    pub marker_tag: &'a str,
    pub comments: CommentCursor<'a>,
    pub identity: IdentityRegistry,
    pub raw_source: RawSourceRecoverer<'a>,
    pub catalog: Catalog,
}

type StoryWalk<'v, 'a> = Walk<'v, 'a, StoryScan<'a>, ExtractError>;

impl<'a> StoryScan<'a> {
    pub fn run(mut self) -> Result<Catalog> {
        let visitors: Visitors<'a, StoryScan<'a>, ExtractError> = Visitors::new()
            .on(NodeKind::Script, skip_script)
            .on(NodeKind::Comment, on_comment)
            .on(NodeKind::Component, on_component);
        walk(NodeRef::Root(self.base.root()), &mut self, &visitors)?;

        debug!(
            "Extracted {} stories from '{}' ({} warnings)",
            self.catalog.len(),
            self.base.file_path(),
            self.catalog.warnings().len()
        );
        Ok(self.catalog)
    }
}

fn skip_script<'a>(_node: NodeRef<'a>, _scan: &mut StoryScan<'a>, _walk: &StoryWalk<'_, 'a>) -> Result<()> {
    Ok(())
}

fn on_comment<'a>(node: NodeRef<'a>, scan: &mut StoryScan<'a>, _walk: &StoryWalk<'_, 'a>) -> Result<()> {
    if let NodeRef::Template(TemplateNode::Comment(comment)) = node {
        scan.comments.track(comment);
    }
    Ok(())
}

fn on_component<'a>(node: NodeRef<'a>, scan: &mut StoryScan<'a>, walk: &StoryWalk<'_, 'a>) -> Result<()> {
    let NodeRef::Template(TemplateNode::Component(element)) = node else {
        return walk.visit_children(node, scan);
    };
    if element.name != scan.marker_tag {
        return walk.visit_children(node, scan);
    }

    let attributes = Attributes::new(scan.base, element);
    let name = attributes
        .get_string("name")?
        .ok_or_else(|| ExtractError::MissingStoryName {
            filename: scan.base.file_path().to_string(),
            offset: element.start,
        })?;
    scan.identity.claim_name(name)?;

    let explicit_id = attributes.get_string("id")?;
    let resolved = scan.identity.resolve_id(name, explicit_id);
    let source = attributes.get_source()?;
    let description = scan.comments.take_adjacent(element.start);
    scan.comments.clear();
    let raw_source = scan.raw_source.recover(element, name)?;

    if let Some(warning) = resolved.warning {
        scan.catalog.push_warning(warning);
    }
    scan.catalog.insert(StoryMeta {
        id: resolved.id,
        name: name.to_string(),
        description,
        source,
        raw_source,
    });
    Ok(())
}
