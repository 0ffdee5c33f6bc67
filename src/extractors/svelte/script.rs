// Marker resolution from the `<script>` regions
//
// Finds what the markup pass needs to know before it can recognize stories:
// the local name of `defineMeta`, the tag destructured as `Story`, the meta
// object, a legacy `export const meta = {...}`, and any `setTemplate(...)`.

use tracing::debug;

use crate::ast::{
    CallExpression, Expression, ImportClause, NodeKind, NodeRef, ObjectExpression, Pattern,
    PatternMember, Statement, VariableDeclarator,
};
use crate::error::{ExtractError, Result};
use crate::extractors::base::{walk, BaseExtractor, Visitors, Walk};

use super::attributes::MetaObject;

pub const DEFINE_META: &str = "defineMeta";
pub const SET_TEMPLATE: &str = "setTemplate";
const STORY_EXPORT: &str = "Story";
const META_EXPORT: &str = "Meta";
const LEGACY_META_BINDING: &str = "meta";

/// Script-level facts about one document
#[derive(Debug, Default)]
pub struct ScriptFacts<'a> {
    /// Local binding of the imported `defineMeta`
    pub define_meta_alias: Option<&'a str>,
    /// Tag destructured as `Story` from the `defineMeta` call
    pub story_tag: Option<&'a str>,
    /// First argument of `defineMeta`
    pub meta_object: Option<&'a ObjectExpression>,
    pub legacy_story_tag: Option<&'a str>,
    pub legacy_meta_tag: Option<&'a str>,
    /// `export const meta = {...}`
    pub legacy_meta_object: Option<&'a ObjectExpression>,
    /// Snippet passed to `setTemplate(...)`
    pub template_snippet: Option<&'a str>,
}

impl<'a> ScriptFacts<'a> {
    /// Scan both script regions of the document
    pub fn resolve(base: BaseExtractor<'a>, package_name: &str) -> Result<Self> {
        let visitors: Visitors<'a, ScriptScan<'a>, ExtractError> = Visitors::new()
            .on(NodeKind::Fragment, skip_markup)
            .on(NodeKind::ImportDeclaration, on_import)
            .on(NodeKind::VariableDeclarator, on_declarator)
            .on(NodeKind::ExportNamedDeclaration, on_export_named)
            .on(NodeKind::CallExpression, on_call);

        let mut scan = ScriptScan {
            base,
            package_name: package_name.to_string(),
            facts: ScriptFacts::default(),
        };
        walk(NodeRef::Root(base.root()), &mut scan, &visitors)?;

        let facts = scan.facts;
        debug!(
            "Resolved script facts for '{}': defineMeta={:?} story={:?} legacy_meta={}",
            base.file_path(),
            facts.define_meta_alias,
            facts.story_tag,
            facts.legacy_meta_object.is_some()
        );
        Ok(facts)
    }

    /// Marker tag for the markup pass, falling back to the legacy `Story`
    pub fn marker_tag(&self) -> &'a str {
        self.story_tag
            .or(self.legacy_story_tag)
            .unwrap_or(STORY_EXPORT)
    }

    pub fn meta_tag(&self) -> &'a str {
        self.legacy_meta_tag.unwrap_or(META_EXPORT)
    }

    pub fn meta(&self) -> Option<&'a ObjectExpression> {
        self.meta_object.or(self.legacy_meta_object)
    }

    /// Identifier given as the meta `component`
    pub fn component(&self, base: BaseExtractor<'a>) -> Option<&'a str> {
        self.meta()
            .and_then(|object| MetaObject::new(base, object).get_identifier("component"))
    }

    /// Tag from a destructured `defineMeta` call, required in the modern dialect
    pub fn require_story_tag(&self, base: BaseExtractor<'a>) -> Result<&'a str> {
        self.story_tag
            .ok_or_else(|| ExtractError::NoDestructuredDefineMeta {
                filename: base.file_path().to_string(),
            })
    }
}

struct ScriptScan<'a> {
    base: BaseExtractor<'a>,
    package_name: String,
    facts: ScriptFacts<'a>,
}

type ScanWalk<'v, 'a> = Walk<'v, 'a, ScriptScan<'a>, ExtractError>;

fn skip_markup<'a>(_node: NodeRef<'a>, _scan: &mut ScriptScan<'a>, _walk: &ScanWalk<'_, 'a>) -> Result<()> {
    Ok(())
}

fn on_import<'a>(node: NodeRef<'a>, scan: &mut ScriptScan<'a>, _walk: &ScanWalk<'_, 'a>) -> Result<()> {
    let NodeRef::Statement(Statement::ImportDeclaration(import)) = node else {
        return Ok(());
    };
    if import.source.as_str() != Some(scan.package_name.as_str()) {
        return Ok(());
    }

    for clause in &import.specifiers {
        match clause {
            ImportClause::ImportSpecifier(spec) => {
                let local = spec.local.name.as_str();
                match spec.imported_name() {
                    Some(DEFINE_META) => scan.facts.define_meta_alias = Some(local),
                    Some(STORY_EXPORT) => scan.facts.legacy_story_tag = Some(local),
                    Some(META_EXPORT) => scan.facts.legacy_meta_tag = Some(local),
                    _ => {}
                }
            }
            ImportClause::ImportDefaultSpecifier(_) | ImportClause::ImportNamespaceSpecifier(_) => {
                return Err(ExtractError::DefaultOrNamespaceImport {
                    filename: scan.base.file_path().to_string(),
                    package: scan.package_name.clone(),
                });
            }
        }
    }
    Ok(())
}

fn on_declarator<'a>(node: NodeRef<'a>, scan: &mut ScriptScan<'a>, walk: &ScanWalk<'_, 'a>) -> Result<()> {
    if let NodeRef::Declarator(declarator) = node {
        if let Some(Expression::CallExpression(call)) = &declarator.init {
            if scan.facts.define_meta_alias.is_some()
                && call.callee_name() == scan.facts.define_meta_alias
            {
                return record_define_meta(scan, declarator, call);
            }
        }
    }
    walk.visit_children(node, scan)
}

fn record_define_meta<'a>(
    scan: &mut ScriptScan<'a>,
    declarator: &'a VariableDeclarator,
    call: &'a CallExpression,
) -> Result<()> {
    let filename = || scan.base.file_path().to_string();

    let Pattern::ObjectPattern(pattern) = &declarator.id else {
        return Err(ExtractError::NoDestructuredDefineMeta { filename: filename() });
    };
    let Some(Expression::ObjectExpression(object)) = call.arguments.first() else {
        return Err(ExtractError::InvalidDefineMetaArgument { filename: filename() });
    };

    let story_tag = pattern.properties.iter().find_map(|member| match member {
        PatternMember::Property(prop) if prop.key_name() == Some(STORY_EXPORT) => prop
            .value
            .as_identifier()
            .map(|ident| ident.name.as_str()),
        _ => None,
    });
    let Some(story_tag) = story_tag else {
        return Err(ExtractError::NoStoryComponentDestructured { filename: filename() });
    };

    scan.facts.story_tag = Some(story_tag);
    scan.facts.meta_object = Some(object);
    Ok(())
}

fn on_export_named<'a>(node: NodeRef<'a>, scan: &mut ScriptScan<'a>, walk: &ScanWalk<'_, 'a>) -> Result<()> {
    if let NodeRef::Statement(Statement::ExportNamedDeclaration(export)) = node {
        if let Some(Statement::VariableDeclaration(decl)) = export.declaration.as_deref() {
            for declarator in &decl.declarations {
                let is_meta = declarator
                    .id
                    .as_identifier()
                    .is_some_and(|ident| ident.name == LEGACY_META_BINDING);
                match &declarator.init {
                    Some(Expression::ObjectExpression(object)) if is_meta => {
                        scan.facts.legacy_meta_object = Some(object);
                    }
                    _ => {}
                }
            }
        }
    }
    walk.visit_children(node, scan)
}

fn on_call<'a>(node: NodeRef<'a>, scan: &mut ScriptScan<'a>, walk: &ScanWalk<'_, 'a>) -> Result<()> {
    if let NodeRef::Expression(Expression::CallExpression(call)) = node {
        if call.callee_name() == Some(SET_TEMPLATE) {
            if let Some(snippet) = call.arguments.first().and_then(Expression::as_identifier) {
                scan.facts.template_snippet = Some(snippet.name.as_str());
            }
        }
    }
    walk.visit_children(node, scan)
}
