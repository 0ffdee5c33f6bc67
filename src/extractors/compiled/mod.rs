// Compiled-output node locator
//
// After a stories file has been compiled, a later rewrite step needs the
// compiled counterparts of a few original nodes. This module finds them in the
// compiled `Program`, whichever code-generation mode produced it.

pub mod parsing;

use std::collections::HashMap;
use tracing::debug;

use crate::ast::{
    ExportDefaultDeclaration, Expression, Function, Identifier, ImportClause, ImportSpecifier,
    NodeKind, NodeRef, Pattern, PatternMember, Program, Statement, VariableDeclaration,
};
use crate::error::{CompiledNode, ExtractError, Result};
use crate::extractors::base::{walk, Visitors, Walk};
use crate::extractors::svelte::script::DEFINE_META;

pub use parsing::parse_compiled_javascript;

/// Name suffix of the generated stories component function
pub const STORIES_FUNCTION_SUFFIX: &str = "_stories";

/// References into a compiled program; every field is required
#[derive(Debug, Clone, Copy)]
pub struct CompiledAstNodes<'a> {
    pub define_meta_import: &'a ImportSpecifier,
    pub define_meta_declaration: &'a VariableDeclaration,
    pub export_default: &'a ExportDefaultDeclaration,
    pub story_identifier: &'a Identifier,
    pub stories_function: &'a Function,
}

#[derive(Default)]
struct LocatorScan<'a> {
    package_name: String,
    define_meta_import: Option<&'a ImportSpecifier>,
    define_meta_declaration: Option<&'a VariableDeclaration>,
    story_identifier: Option<&'a Identifier>,
    export_default: Option<&'a ExportDefaultDeclaration>,
    stories_function: Option<&'a Function>,
    /// Top-level name → function, for `export default <identifier>`
    bindings: HashMap<&'a str, &'a Function>,
}

type LocatorWalk<'v, 'a> = Walk<'v, 'a, LocatorScan<'a>, ExtractError>;

/// Locate the rewrite targets in `program`
///
/// Fails with `CompiledNodeNotFound` naming the first missing node.
pub fn locate_compiled_nodes<'a>(
    program: &'a Program,
    filename: &str,
    package_name: &str,
) -> Result<CompiledAstNodes<'a>> {
    let visitors: Visitors<'a, LocatorScan<'a>, ExtractError> = Visitors::new()
        .on(NodeKind::ImportDeclaration, on_import)
        .on(NodeKind::VariableDeclaration, on_variable_declaration)
        .on(NodeKind::FunctionDeclaration, on_function_declaration)
        .on(NodeKind::ExportDefaultDeclaration, on_export_default)
        .on(NodeKind::FunctionExpression, skip_function)
        .on(NodeKind::ArrowFunctionExpression, skip_function);

    let mut scan = LocatorScan {
        package_name: package_name.to_string(),
        ..LocatorScan::default()
    };
    walk(NodeRef::Program(program), &mut scan, &visitors)?;

    let missing = |node| ExtractError::CompiledNodeNotFound {
        filename: filename.to_string(),
        node,
    };
    let define_meta_import = scan
        .define_meta_import
        .ok_or_else(|| missing(CompiledNode::DefineMetaImport))?;
    let define_meta_declaration = scan
        .define_meta_declaration
        .ok_or_else(|| missing(CompiledNode::DefineMetaDeclaration))?;
    let story_identifier = scan
        .story_identifier
        .ok_or_else(|| missing(CompiledNode::StoryIdentifier))?;
    let export_default = scan
        .export_default
        .ok_or_else(|| missing(CompiledNode::ExportDefault))?;

    // Either declared directly, or exported by name and bound elsewhere
    let stories_function = scan
        .stories_function
        .or_else(|| {
            export_default
                .declaration
                .as_identifier()
                .and_then(|ident| scan.bindings.get(ident.name.as_str()).copied())
        })
        .ok_or_else(|| missing(CompiledNode::StoriesFunction))?;

    debug!(
        "Located compiled nodes in '{}': stories function {:?}",
        filename,
        stories_function.name()
    );
    Ok(CompiledAstNodes {
        define_meta_import,
        define_meta_declaration,
        export_default,
        story_identifier,
        stories_function,
    })
}

fn is_stories_function(func: &Function) -> bool {
    func.name()
        .is_some_and(|name| name.ends_with(STORIES_FUNCTION_SUFFIX))
}

fn on_import<'a>(node: NodeRef<'a>, scan: &mut LocatorScan<'a>, _walk: &LocatorWalk<'_, 'a>) -> Result<()> {
    let NodeRef::Statement(Statement::ImportDeclaration(import)) = node else {
        return Ok(());
    };
    if import.source.as_str() != Some(scan.package_name.as_str()) {
        return Ok(());
    }
    for clause in &import.specifiers {
        if let ImportClause::ImportSpecifier(spec) = clause {
            if spec.imported_name() == Some(DEFINE_META) {
                scan.define_meta_import = Some(spec);
            }
        }
    }
    Ok(())
}

fn on_variable_declaration<'a>(
    node: NodeRef<'a>,
    scan: &mut LocatorScan<'a>,
    _walk: &LocatorWalk<'_, 'a>,
) -> Result<()> {
    let NodeRef::Statement(Statement::VariableDeclaration(decl)) = node else {
        return Ok(());
    };
    let define_meta_local = scan
        .define_meta_import
        .map(|spec| spec.local.name.as_str());

    for declarator in &decl.declarations {
        match (&declarator.id, &declarator.init) {
            (Pattern::ObjectPattern(pattern), Some(Expression::CallExpression(call)))
                if define_meta_local.is_some() && call.callee_name() == define_meta_local =>
            {
                scan.define_meta_declaration = Some(decl);
                scan.story_identifier = pattern.properties.iter().find_map(|member| match member {
                    PatternMember::Property(prop) if prop.key_name() == Some("Story") => {
                        prop.value.as_identifier()
                    }
                    _ => None,
                });
            }
            (Pattern::Identifier(ident), Some(init)) => {
                if let Some(func) = init.as_function() {
                    scan.bindings.insert(ident.name.as_str(), func);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn on_function_declaration<'a>(
    node: NodeRef<'a>,
    scan: &mut LocatorScan<'a>,
    _walk: &LocatorWalk<'_, 'a>,
) -> Result<()> {
    let func = match node {
        NodeRef::Statement(Statement::FunctionDeclaration(func))
        | NodeRef::Expression(Expression::FunctionDeclaration(func)) => func,
        _ => return Ok(()),
    };
    if let Some(name) = func.name() {
        scan.bindings.insert(name, func);
    }
    if scan.stories_function.is_none() && is_stories_function(func) {
        scan.stories_function = Some(func);
    }
    Ok(())
}

fn on_export_default<'a>(
    node: NodeRef<'a>,
    scan: &mut LocatorScan<'a>,
    walk: &LocatorWalk<'_, 'a>,
) -> Result<()> {
    if let NodeRef::Statement(Statement::ExportDefaultDeclaration(export)) = node {
        scan.export_default = Some(export);
        if let Some(func) = export.declaration.as_function() {
            if let Some(name) = func.name() {
                scan.bindings.insert(name, func);
            }
            if scan.stories_function.is_none() && is_stories_function(func) {
                scan.stories_function = Some(func);
            }
            return Ok(());
        }
    }
    walk.visit_children(node, scan)
}

// Function bodies hold component code, never the nodes we look for
fn skip_function<'a>(_node: NodeRef<'a>, _scan: &mut LocatorScan<'a>, _walk: &LocatorWalk<'_, 'a>) -> Result<()> {
    Ok(())
}
