// Borrowed node views for the tree walker
//
// `NodeRef` unifies every node family (markup, attributes, script statements,
// expressions, patterns) behind one copyable handle so a single walker can
// traverse a whole document, script regions included.

use super::script::*;
use super::template::*;
use super::Span;

/// Kind tag used for visitor dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Markup
    Root,
    Fragment,
    Text,
    Comment,
    ExpressionTag,
    RegularElement,
    Component,
    SpecialElement,
    IfBlock,
    EachBlock,
    AwaitBlock,
    KeyBlock,
    SnippetBlock,
    RenderTag,
    HtmlTag,
    Attribute,
    SpreadAttribute,
    Directive,
    Script,
    // Script
    Program,
    ImportDeclaration,
    ImportSpecifier,
    ImportDefaultSpecifier,
    ImportNamespaceSpecifier,
    VariableDeclaration,
    VariableDeclarator,
    ExportNamedDeclaration,
    ExportDefaultDeclaration,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunctionExpression,
    ExpressionStatement,
    BlockStatement,
    ReturnStatement,
    Identifier,
    Literal,
    TemplateLiteral,
    ArrayExpression,
    ObjectExpression,
    Property,
    CallExpression,
    MemberExpression,
    SpreadElement,
    ObjectPattern,
    ArrayPattern,
    AssignmentPattern,
    RestElement,
    Unknown,
}

#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Root(&'a Root),
    Fragment(&'a Fragment),
    Template(&'a TemplateNode),
    Attribute(&'a AttributeNode),
    Script(&'a Script),
    Program(&'a Program),
    Statement(&'a Statement),
    ImportClause(&'a ImportClause),
    Declarator(&'a VariableDeclarator),
    Expression(&'a Expression),
    ObjectMember(&'a ObjectMember),
    Pattern(&'a Pattern),
    PatternMember(&'a PatternMember),
    Identifier(&'a Identifier),
}

impl<'a> NodeRef<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Root(_) => NodeKind::Root,
            NodeRef::Fragment(_) => NodeKind::Fragment,
            NodeRef::Template(node) => match node {
                TemplateNode::Text(_) => NodeKind::Text,
                TemplateNode::Comment(_) => NodeKind::Comment,
                TemplateNode::ExpressionTag(_) => NodeKind::ExpressionTag,
                TemplateNode::RegularElement(_) => NodeKind::RegularElement,
                TemplateNode::Component(_) => NodeKind::Component,
                TemplateNode::SpecialElement(_) => NodeKind::SpecialElement,
                TemplateNode::IfBlock(_) => NodeKind::IfBlock,
                TemplateNode::EachBlock(_) => NodeKind::EachBlock,
                TemplateNode::AwaitBlock(_) => NodeKind::AwaitBlock,
                TemplateNode::KeyBlock(_) => NodeKind::KeyBlock,
                TemplateNode::SnippetBlock(_) => NodeKind::SnippetBlock,
                TemplateNode::RenderTag(_) => NodeKind::RenderTag,
                TemplateNode::HtmlTag(_) => NodeKind::HtmlTag,
                TemplateNode::Opaque(_) => NodeKind::Unknown,
            },
            NodeRef::Attribute(attr) => match attr {
                AttributeNode::Attribute(_) => NodeKind::Attribute,
                AttributeNode::SpreadAttribute(_) => NodeKind::SpreadAttribute,
                AttributeNode::Directive => NodeKind::Directive,
            },
            NodeRef::Script(_) => NodeKind::Script,
            NodeRef::Program(_) => NodeKind::Program,
            NodeRef::Statement(stmt) => match stmt {
                Statement::ImportDeclaration(_) => NodeKind::ImportDeclaration,
                Statement::VariableDeclaration(_) => NodeKind::VariableDeclaration,
                Statement::ExportNamedDeclaration(_) => NodeKind::ExportNamedDeclaration,
                Statement::ExportDefaultDeclaration(_) => NodeKind::ExportDefaultDeclaration,
                Statement::FunctionDeclaration(_) => NodeKind::FunctionDeclaration,
                Statement::ExpressionStatement(_) => NodeKind::ExpressionStatement,
                Statement::BlockStatement(_) => NodeKind::BlockStatement,
                Statement::ReturnStatement(_) => NodeKind::ReturnStatement,
                Statement::Unknown => NodeKind::Unknown,
            },
            NodeRef::ImportClause(clause) => match clause {
                ImportClause::ImportSpecifier(_) => NodeKind::ImportSpecifier,
                ImportClause::ImportDefaultSpecifier(_) => NodeKind::ImportDefaultSpecifier,
                ImportClause::ImportNamespaceSpecifier(_) => NodeKind::ImportNamespaceSpecifier,
            },
            NodeRef::Declarator(_) => NodeKind::VariableDeclarator,
            NodeRef::Expression(expr) => match expr {
                Expression::Identifier(_) => NodeKind::Identifier,
                Expression::Literal(_) => NodeKind::Literal,
                Expression::TemplateLiteral(_) => NodeKind::TemplateLiteral,
                Expression::ArrayExpression(_) => NodeKind::ArrayExpression,
                Expression::ObjectExpression(_) => NodeKind::ObjectExpression,
                Expression::CallExpression(_) => NodeKind::CallExpression,
                Expression::MemberExpression(_) => NodeKind::MemberExpression,
                Expression::FunctionExpression(_) => NodeKind::FunctionExpression,
                Expression::ArrowFunctionExpression(_) => NodeKind::ArrowFunctionExpression,
                Expression::FunctionDeclaration(_) => NodeKind::FunctionDeclaration,
                Expression::SpreadElement(_) => NodeKind::SpreadElement,
                Expression::Unknown => NodeKind::Unknown,
            },
            NodeRef::ObjectMember(member) => match member {
                ObjectMember::Property(_) => NodeKind::Property,
                ObjectMember::SpreadElement(_) => NodeKind::SpreadElement,
            },
            NodeRef::Pattern(pattern) => match pattern {
                Pattern::Identifier(_) => NodeKind::Identifier,
                Pattern::ObjectPattern(_) => NodeKind::ObjectPattern,
                Pattern::ArrayPattern(_) => NodeKind::ArrayPattern,
                Pattern::AssignmentPattern(_) => NodeKind::AssignmentPattern,
                Pattern::RestElement(_) => NodeKind::RestElement,
                Pattern::Unknown => NodeKind::Unknown,
            },
            NodeRef::PatternMember(member) => match member {
                PatternMember::Property(_) => NodeKind::Property,
                PatternMember::RestElement(_) => NodeKind::RestElement,
            },
            NodeRef::Identifier(_) => NodeKind::Identifier,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            NodeRef::Root(root) => Some(Span::new(root.start, root.end)),
            NodeRef::Fragment(fragment) => fragment.content_span(),
            NodeRef::Template(node) => Some(node.span()),
            NodeRef::Attribute(attr) => match attr {
                AttributeNode::Attribute(a) => Some(Span::new(a.start, a.end)),
                AttributeNode::SpreadAttribute(a) => Some(Span::new(a.start, a.end)),
                AttributeNode::Directive => None,
            },
            NodeRef::Script(script) => Some(Span::new(script.start, script.end)),
            NodeRef::Program(program) => Some(Span::new(program.start, program.end)),
            NodeRef::Statement(stmt) => stmt.span(),
            NodeRef::ImportClause(clause) => Some(match clause {
                ImportClause::ImportSpecifier(s) => Span::new(s.start, s.end),
                ImportClause::ImportDefaultSpecifier(s)
                | ImportClause::ImportNamespaceSpecifier(s) => Span::new(s.start, s.end),
            }),
            NodeRef::Declarator(decl) => Some(Span::new(decl.start, decl.end)),
            NodeRef::Expression(expr) => expr.span(),
            NodeRef::ObjectMember(member) => Some(match member {
                ObjectMember::Property(p) => Span::new(p.start, p.end),
                ObjectMember::SpreadElement(s) => Span::new(s.start, s.end),
            }),
            NodeRef::Pattern(pattern) => match pattern {
                Pattern::Identifier(i) => Some(Span::new(i.start, i.end)),
                Pattern::ObjectPattern(p) => Some(Span::new(p.start, p.end)),
                Pattern::ArrayPattern(p) => Some(Span::new(p.start, p.end)),
                Pattern::AssignmentPattern(p) => Some(Span::new(p.start, p.end)),
                Pattern::RestElement(p) => Some(Span::new(p.start, p.end)),
                Pattern::Unknown => None,
            },
            NodeRef::PatternMember(member) => Some(match member {
                PatternMember::Property(p) => Span::new(p.start, p.end),
                PatternMember::RestElement(r) => Span::new(r.start, r.end),
            }),
            NodeRef::Identifier(ident) => Some(Span::new(ident.start, ident.end)),
        }
    }

    /// Direct children in source order
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        match *self {
            NodeRef::Root(root) => {
                if let Some(module) = &root.module {
                    out.push(NodeRef::Script(module));
                }
                if let Some(instance) = &root.instance {
                    out.push(NodeRef::Script(instance));
                }
                out.push(NodeRef::Fragment(&root.fragment));
            }
            NodeRef::Fragment(fragment) => {
                out.extend(fragment.nodes.iter().map(NodeRef::Template));
            }
            NodeRef::Template(node) => template_children(node, &mut out),
            NodeRef::Attribute(attr) => match attr {
                AttributeNode::Attribute(a) => match &a.value {
                    AttributeValue::Bare(_) => {}
                    AttributeValue::Expression(tag) => out.push(NodeRef::Expression(&tag.expression)),
                    AttributeValue::Sequence(chunks) => {
                        for chunk in chunks {
                            if let AttributeChunk::ExpressionTag(tag) = chunk {
                                out.push(NodeRef::Expression(&tag.expression));
                            }
                        }
                    }
                },
                AttributeNode::SpreadAttribute(a) => out.push(NodeRef::Expression(&a.expression)),
                AttributeNode::Directive => {}
            },
            NodeRef::Script(script) => out.push(NodeRef::Program(&script.content)),
            NodeRef::Program(program) => {
                out.extend(program.body.iter().map(NodeRef::Statement));
            }
            NodeRef::Statement(stmt) => statement_children(stmt, &mut out),
            NodeRef::ImportClause(clause) => match clause {
                ImportClause::ImportSpecifier(spec) => {
                    if let ModuleExportName::Identifier(imported) = &spec.imported {
                        out.push(NodeRef::Identifier(imported));
                    }
                    out.push(NodeRef::Identifier(&spec.local));
                }
                ImportClause::ImportDefaultSpecifier(spec)
                | ImportClause::ImportNamespaceSpecifier(spec) => {
                    out.push(NodeRef::Identifier(&spec.local));
                }
            },
            NodeRef::Declarator(decl) => {
                out.push(NodeRef::Pattern(&decl.id));
                if let Some(init) = &decl.init {
                    out.push(NodeRef::Expression(init));
                }
            }
            NodeRef::Expression(expr) => expression_children(expr, &mut out),
            NodeRef::ObjectMember(member) => match member {
                ObjectMember::Property(prop) => {
                    out.push(NodeRef::Expression(&prop.key));
                    if !prop.shorthand {
                        out.push(NodeRef::Expression(&prop.value));
                    }
                }
                ObjectMember::SpreadElement(spread) => {
                    out.push(NodeRef::Expression(&spread.argument));
                }
            },
            NodeRef::Pattern(pattern) => match pattern {
                Pattern::ObjectPattern(obj) => {
                    out.extend(obj.properties.iter().map(NodeRef::PatternMember));
                }
                Pattern::ArrayPattern(arr) => {
                    out.extend(arr.elements.iter().flatten().map(NodeRef::Pattern));
                }
                Pattern::AssignmentPattern(assign) => {
                    out.push(NodeRef::Pattern(&assign.left));
                    out.push(NodeRef::Expression(&assign.right));
                }
                Pattern::RestElement(rest) => out.push(NodeRef::Pattern(&rest.argument)),
                Pattern::Identifier(_) | Pattern::Unknown => {}
            },
            NodeRef::PatternMember(member) => match member {
                PatternMember::Property(prop) => {
                    out.push(NodeRef::Expression(&prop.key));
                    if !prop.shorthand {
                        out.push(NodeRef::Pattern(&prop.value));
                    }
                }
                PatternMember::RestElement(rest) => out.push(NodeRef::Pattern(&rest.argument)),
            },
            NodeRef::Identifier(_) => {}
        }
        out
    }
}

fn template_children<'a>(node: &'a TemplateNode, out: &mut Vec<NodeRef<'a>>) {
    match node {
        TemplateNode::Text(_) | TemplateNode::Comment(_) | TemplateNode::Opaque(_) => {}
        TemplateNode::ExpressionTag(tag) | TemplateNode::RenderTag(tag) | TemplateNode::HtmlTag(tag) => {
            out.push(NodeRef::Expression(&tag.expression));
        }
        TemplateNode::RegularElement(el)
        | TemplateNode::Component(el)
        | TemplateNode::SpecialElement(el) => {
            out.extend(el.attributes.iter().map(NodeRef::Attribute));
            out.push(NodeRef::Fragment(&el.fragment));
        }
        TemplateNode::IfBlock(block) => {
            out.push(NodeRef::Expression(&block.test));
            out.push(NodeRef::Fragment(&block.consequent));
            if let Some(alternate) = &block.alternate {
                out.push(NodeRef::Fragment(alternate));
            }
        }
        TemplateNode::EachBlock(block) => {
            out.push(NodeRef::Expression(&block.expression));
            out.push(NodeRef::Fragment(&block.body));
            if let Some(fallback) = &block.fallback {
                out.push(NodeRef::Fragment(fallback));
            }
        }
        TemplateNode::AwaitBlock(block) => {
            out.push(NodeRef::Expression(&block.expression));
            for fragment in [&block.pending, &block.then, &block.catch].into_iter().flatten() {
                out.push(NodeRef::Fragment(fragment));
            }
        }
        TemplateNode::KeyBlock(block) => {
            out.push(NodeRef::Expression(&block.expression));
            out.push(NodeRef::Fragment(&block.fragment));
        }
        TemplateNode::SnippetBlock(block) => {
            out.push(NodeRef::Identifier(&block.expression));
            out.extend(block.parameters.iter().map(NodeRef::Pattern));
            out.push(NodeRef::Fragment(&block.body));
        }
    }
}

fn statement_children<'a>(stmt: &'a Statement, out: &mut Vec<NodeRef<'a>>) {
    match stmt {
        Statement::ImportDeclaration(decl) => {
            out.extend(decl.specifiers.iter().map(NodeRef::ImportClause));
        }
        Statement::VariableDeclaration(decl) => {
            out.extend(decl.declarations.iter().map(NodeRef::Declarator));
        }
        Statement::ExportNamedDeclaration(decl) => {
            if let Some(inner) = &decl.declaration {
                out.push(NodeRef::Statement(inner));
            }
        }
        Statement::ExportDefaultDeclaration(decl) => {
            out.push(NodeRef::Expression(&decl.declaration));
        }
        Statement::FunctionDeclaration(func) => function_children(func, out),
        Statement::ExpressionStatement(stmt) => out.push(NodeRef::Expression(&stmt.expression)),
        Statement::BlockStatement(block) => out.extend(block.body.iter().map(NodeRef::Statement)),
        Statement::ReturnStatement(ret) => {
            if let Some(argument) = &ret.argument {
                out.push(NodeRef::Expression(argument));
            }
        }
        Statement::Unknown => {}
    }
}

fn expression_children<'a>(expr: &'a Expression, out: &mut Vec<NodeRef<'a>>) {
    match expr {
        Expression::Identifier(_) | Expression::Literal(_) | Expression::Unknown => {}
        Expression::TemplateLiteral(tpl) => {
            out.extend(tpl.expressions.iter().map(NodeRef::Expression));
        }
        Expression::ArrayExpression(arr) => {
            out.extend(arr.elements.iter().flatten().map(NodeRef::Expression));
        }
        Expression::ObjectExpression(obj) => {
            out.extend(obj.properties.iter().map(NodeRef::ObjectMember));
        }
        Expression::CallExpression(call) => {
            out.push(NodeRef::Expression(&call.callee));
            out.extend(call.arguments.iter().map(NodeRef::Expression));
        }
        Expression::MemberExpression(member) => {
            out.push(NodeRef::Expression(&member.object));
            out.push(NodeRef::Expression(&member.property));
        }
        Expression::FunctionExpression(func)
        | Expression::ArrowFunctionExpression(func)
        | Expression::FunctionDeclaration(func) => function_children(func, out),
        Expression::SpreadElement(spread) => out.push(NodeRef::Expression(&spread.argument)),
    }
}

fn function_children<'a>(func: &'a Function, out: &mut Vec<NodeRef<'a>>) {
    if let Some(id) = &func.id {
        out.push(NodeRef::Identifier(id));
    }
    out.extend(func.params.iter().map(NodeRef::Pattern));
    out.push(NodeRef::Statement(&func.body));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_children_order_scripts_first() {
        let root: Root = serde_json::from_value(json!({
            "type": "Root",
            "start": 0,
            "end": 10,
            "fragment": { "type": "Fragment", "nodes": [
                { "type": "Text", "start": 0, "end": 1, "data": "x" }
            ]},
            "instance": { "type": "Script", "start": 0, "end": 0, "context": "default",
                "content": { "type": "Program", "start": 0, "end": 0, "body": [] } },
            "module": { "type": "Script", "start": 0, "end": 0, "context": "module",
                "content": { "type": "Program", "start": 0, "end": 0, "body": [] } }
        }))
        .unwrap();

        let kinds: Vec<NodeKind> = NodeRef::Root(&root).children().iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::Script, NodeKind::Script, NodeKind::Fragment]);
    }

    #[test]
    fn test_component_children_attributes_then_fragment() {
        let node: TemplateNode = serde_json::from_value(json!({
            "type": "Component",
            "start": 0,
            "end": 30,
            "name": "Story",
            "attributes": [
                { "type": "Attribute", "start": 7, "end": 21, "name": "name",
                  "value": [{ "type": "Text", "start": 13, "end": 20, "data": "Default" }] },
                { "type": "BindDirective", "start": 22, "end": 26, "name": "this" }
            ],
            "fragment": { "type": "Fragment", "nodes": [] }
        }))
        .unwrap();

        let children = NodeRef::Template(&node).children();
        let kinds: Vec<NodeKind> = children.iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Attribute, NodeKind::Directive, NodeKind::Fragment]
        );
        assert_eq!(NodeRef::Template(&node).span(), Some(Span::new(0, 30)));
    }

    #[test]
    fn test_nodes_outside_model_keep_offsets() {
        let fragment: Fragment = serde_json::from_value(json!({
            "type": "Fragment",
            "nodes": [
                { "type": "ConstTag", "start": 0, "end": 27,
                  "declaration": { "type": "VariableDeclaration", "kind": "const", "declarations": [] } },
                { "type": "Text", "start": 27, "end": 28, "data": " " },
                { "type": "DebugTag", "start": 28, "end": 42, "identifiers": [] }
            ]
        }))
        .unwrap();

        let first = &fragment.nodes[0];
        assert!(matches!(first, TemplateNode::Opaque(node) if node.kind == "ConstTag"));
        assert_eq!(NodeRef::Template(first).kind(), NodeKind::Unknown);
        assert!(NodeRef::Template(first).children().is_empty());
        assert_eq!(first.span(), Span::new(0, 27));
        assert_eq!(fragment.content_span(), Some(Span::new(0, 42)));
    }

    #[test]
    fn test_malformed_modelled_node_is_rejected() {
        let result: Result<Fragment, _> = serde_json::from_value(json!({
            "type": "Fragment",
            "nodes": [{ "type": "Component", "start": 0, "end": 5 }]
        }));
        assert!(result.is_err());
    }
}
