// Compiled JavaScript → ESTree lowering
//
// Compiled component output can arrive as plain JavaScript instead of a
// serialized tree. It is parsed with tree-sitter and lowered into the same
// ESTree subset the locator walks. Offsets in the lowered tree are byte
// offsets into the compiled code.

use tree_sitter::{Node, Parser};

use crate::ast::*;
use crate::error::{ExtractError, Result};

/// Parse compiled JavaScript into a `Program`
pub fn parse_compiled_javascript(code: &str, filename: &str) -> Result<Program> {
    let parse_error = |reason: String| ExtractError::CompiledParse {
        filename: filename.to_string(),
        reason,
    };

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_javascript::LANGUAGE.into())
        .map_err(|e| parse_error(format!("failed to load JavaScript grammar: {}", e)))?;
    let tree = parser
        .parse(code, None)
        .ok_or_else(|| parse_error("parser produced no tree".to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        let offset = first_error(root).map(|node| node.start_byte()).unwrap_or(0);
        return Err(parse_error(format!("syntax error at byte {}", offset)));
    }

    Ok(Lowering { code }.program(root))
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

struct Lowering<'s> {
    code: &'s str,
}

impl<'s> Lowering<'s> {
    fn text(&self, node: Node) -> &'s str {
        self.code
            .get(node.start_byte()..node.end_byte())
            .unwrap_or_default()
    }

    /// Named children without comments
    fn named<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect();
        children
    }

    fn identifier(&self, node: Node) -> Identifier {
        Identifier {
            start: node.start_byte(),
            end: node.end_byte(),
            name: self.text(node).to_string(),
        }
    }

    fn literal(&self, node: Node, value: LiteralValue) -> Literal {
        Literal {
            start: node.start_byte(),
            end: node.end_byte(),
            value,
        }
    }

    fn program(&self, root: Node) -> Program {
        Program {
            start: root.start_byte(),
            end: root.end_byte(),
            body: self.statements(root),
        }
    }

    fn statements(&self, node: Node) -> Vec<Statement> {
        self.named(node)
            .into_iter()
            .map(|child| self.statement(child))
            .collect()
    }

    fn statement(&self, node: Node) -> Statement {
        let (start, end) = (node.start_byte(), node.end_byte());
        match node.kind() {
            "import_statement" => Statement::ImportDeclaration(self.import(node)),
            "lexical_declaration" | "variable_declaration" => {
                Statement::VariableDeclaration(self.variable_declaration(node))
            }
            "export_statement" => self.export(node),
            "function_declaration" | "generator_function_declaration" => {
                Statement::FunctionDeclaration(self.function(node))
            }
            "expression_statement" => match self.named(node).first() {
                Some(&expression) => Statement::ExpressionStatement(ExpressionStatement {
                    start,
                    end,
                    expression: self.expression(expression),
                }),
                None => Statement::Unknown,
            },
            "statement_block" => Statement::BlockStatement(BlockStatement {
                start,
                end,
                body: self.statements(node),
            }),
            "return_statement" => Statement::ReturnStatement(ReturnStatement {
                start,
                end,
                argument: self.named(node).first().map(|&arg| self.expression(arg)),
            }),
            _ => Statement::Unknown,
        }
    }

    fn import(&self, node: Node) -> ImportDeclaration {
        let source = match node.child_by_field_name("source") {
            Some(source) => self.literal(source, LiteralValue::String(self.string_value(source))),
            None => Literal {
                start: node.start_byte(),
                end: node.start_byte(),
                value: LiteralValue::default(),
            },
        };

        let mut specifiers = Vec::new();
        for clause in self.named(node).into_iter().filter(|c| c.kind() == "import_clause") {
            for part in self.named(clause) {
                match part.kind() {
                    "identifier" => {
                        specifiers.push(ImportClause::ImportDefaultSpecifier(self.local_specifier(part, part)));
                    }
                    "namespace_import" => {
                        if let Some(&local) = self.named(part).first() {
                            specifiers.push(ImportClause::ImportNamespaceSpecifier(
                                self.local_specifier(part, local),
                            ));
                        }
                    }
                    "named_imports" => {
                        for spec in self.named(part).into_iter().filter(|s| s.kind() == "import_specifier") {
                            if let Some(specifier) = self.import_specifier(spec) {
                                specifiers.push(ImportClause::ImportSpecifier(specifier));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        ImportDeclaration {
            start: node.start_byte(),
            end: node.end_byte(),
            specifiers,
            source,
        }
    }

    fn local_specifier(&self, node: Node, local: Node) -> LocalSpecifier {
        LocalSpecifier {
            start: node.start_byte(),
            end: node.end_byte(),
            local: self.identifier(local),
        }
    }

    fn import_specifier(&self, node: Node) -> Option<ImportSpecifier> {
        let name = node.child_by_field_name("name")?;
        let imported = if name.kind() == "string" {
            ModuleExportName::Literal(self.literal(name, LiteralValue::String(self.string_value(name))))
        } else {
            ModuleExportName::Identifier(self.identifier(name))
        };
        let local = match node.child_by_field_name("alias") {
            Some(alias) => self.identifier(alias),
            None => self.identifier(name),
        };
        Some(ImportSpecifier {
            start: node.start_byte(),
            end: node.end_byte(),
            imported,
            local,
        })
    }

    fn variable_declaration(&self, node: Node) -> VariableDeclaration {
        let kind = match node.child_by_field_name("kind") {
            Some(kind) => self.text(kind).to_string(),
            None => "var".to_string(),
        };
        let declarations = self
            .named(node)
            .into_iter()
            .filter(|child| child.kind() == "variable_declarator")
            .filter_map(|declarator| {
                let id = self.pattern(declarator.child_by_field_name("name")?);
                Some(VariableDeclarator {
                    start: declarator.start_byte(),
                    end: declarator.end_byte(),
                    id,
                    init: declarator
                        .child_by_field_name("value")
                        .map(|value| self.expression(value)),
                })
            })
            .collect();

        VariableDeclaration {
            start: node.start_byte(),
            end: node.end_byte(),
            kind,
            declarations,
        }
    }

    fn export(&self, node: Node) -> Statement {
        let (start, end) = (node.start_byte(), node.end_byte());
        let mut cursor = node.walk();
        let is_default = node.children(&mut cursor).any(|child| child.kind() == "default");

        if !is_default {
            return Statement::ExportNamedDeclaration(ExportNamedDeclaration {
                start,
                end,
                declaration: node
                    .child_by_field_name("declaration")
                    .map(|decl| Box::new(self.statement(decl))),
            });
        }

        let declaration = if let Some(decl) = node.child_by_field_name("declaration") {
            match decl.kind() {
                "function_declaration" | "generator_function_declaration" => {
                    Expression::FunctionDeclaration(self.function(decl))
                }
                _ => Expression::Unknown,
            }
        } else if let Some(value) = node.child_by_field_name("value") {
            self.expression(value)
        } else {
            Expression::Unknown
        };

        Statement::ExportDefaultDeclaration(ExportDefaultDeclaration {
            start,
            end,
            declaration: Box::new(declaration),
        })
    }

    fn function(&self, node: Node) -> Function {
        let params = if let Some(parameters) = node.child_by_field_name("parameters") {
            self.named(parameters)
                .into_iter()
                .map(|param| self.pattern(param))
                .collect()
        } else if let Some(parameter) = node.child_by_field_name("parameter") {
            vec![self.pattern(parameter)]
        } else {
            Vec::new()
        };

        let body = match node.child_by_field_name("body") {
            Some(body) if body.kind() == "statement_block" => self.statement(body),
            Some(body) => Statement::ExpressionStatement(ExpressionStatement {
                start: body.start_byte(),
                end: body.end_byte(),
                expression: self.expression(body),
            }),
            None => Statement::Unknown,
        };

        Function {
            start: node.start_byte(),
            end: node.end_byte(),
            id: node.child_by_field_name("name").map(|name| self.identifier(name)),
            params,
            body: Box::new(body),
        }
    }

    fn expression(&self, node: Node) -> Expression {
        let (start, end) = (node.start_byte(), node.end_byte());
        match node.kind() {
            "identifier" | "undefined" => Expression::Identifier(self.identifier(node)),
            "string" => Expression::Literal(self.literal(node, LiteralValue::String(self.string_value(node)))),
            "number" => {
                let value = self
                    .text(node)
                    .parse::<f64>()
                    .map(LiteralValue::Number)
                    .unwrap_or_else(|_| LiteralValue::Other(serde_json::Value::String(self.text(node).to_string())));
                Expression::Literal(self.literal(node, value))
            }
            "true" => Expression::Literal(self.literal(node, LiteralValue::Boolean(true))),
            "false" => Expression::Literal(self.literal(node, LiteralValue::Boolean(false))),
            "null" => Expression::Literal(self.literal(node, LiteralValue::Other(serde_json::Value::Null))),
            "template_string" => Expression::TemplateLiteral(self.template_literal(node)),
            "array" => Expression::ArrayExpression(ArrayExpression {
                start,
                end,
                elements: self
                    .named(node)
                    .into_iter()
                    .map(|element| Some(self.expression(element)))
                    .collect(),
            }),
            "object" => Expression::ObjectExpression(self.object(node)),
            "call_expression" => Expression::CallExpression(CallExpression {
                start,
                end,
                callee: Box::new(
                    node.child_by_field_name("function")
                        .map(|callee| self.expression(callee))
                        .unwrap_or(Expression::Unknown),
                ),
                arguments: node
                    .child_by_field_name("arguments")
                    .map(|args| {
                        self.named(args)
                            .into_iter()
                            .map(|arg| self.expression(arg))
                            .collect()
                    })
                    .unwrap_or_default(),
            }),
            "member_expression" | "subscript_expression" => {
                let property = node
                    .child_by_field_name("property")
                    .or_else(|| node.child_by_field_name("index"));
                Expression::MemberExpression(MemberExpression {
                    start,
                    end,
                    object: Box::new(
                        node.child_by_field_name("object")
                            .map(|object| self.expression(object))
                            .unwrap_or(Expression::Unknown),
                    ),
                    property: Box::new(property.map(|p| self.property_key(p)).unwrap_or(Expression::Unknown)),
                    computed: node.kind() == "subscript_expression",
                })
            }
            "function_expression" | "function" | "generator_function" => {
                Expression::FunctionExpression(self.function(node))
            }
            "arrow_function" => Expression::ArrowFunctionExpression(self.function(node)),
            "parenthesized_expression" => match self.named(node).first() {
                Some(&inner) => self.expression(inner),
                None => Expression::Unknown,
            },
            "spread_element" => match self.named(node).first() {
                Some(&argument) => Expression::SpreadElement(SpreadElement {
                    start,
                    end,
                    argument: Box::new(self.expression(argument)),
                }),
                None => Expression::Unknown,
            },
            _ => Expression::Unknown,
        }
    }

    fn pattern(&self, node: Node) -> Pattern {
        let (start, end) = (node.start_byte(), node.end_byte());
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                Pattern::Identifier(self.identifier(node))
            }
            "object_pattern" => Pattern::ObjectPattern(ObjectPattern {
                start,
                end,
                properties: self
                    .named(node)
                    .into_iter()
                    .filter_map(|member| self.pattern_member(member))
                    .collect(),
            }),
            "array_pattern" => Pattern::ArrayPattern(ArrayPattern {
                start,
                end,
                elements: self
                    .named(node)
                    .into_iter()
                    .map(|element| Some(self.pattern(element)))
                    .collect(),
            }),
            "assignment_pattern" | "object_assignment_pattern" => {
                match (node.child_by_field_name("left"), node.child_by_field_name("right")) {
                    (Some(left), Some(right)) => Pattern::AssignmentPattern(AssignmentPattern {
                        start,
                        end,
                        left: Box::new(self.pattern(left)),
                        right: Box::new(self.expression(right)),
                    }),
                    _ => Pattern::Unknown,
                }
            }
            "rest_pattern" => match self.named(node).first() {
                Some(&argument) => Pattern::RestElement(RestElement {
                    start,
                    end,
                    argument: Box::new(self.pattern(argument)),
                }),
                None => Pattern::Unknown,
            },
            _ => Pattern::Unknown,
        }
    }

    fn pattern_member(&self, member: Node) -> Option<PatternMember> {
        let (start, end) = (member.start_byte(), member.end_byte());
        match member.kind() {
            "pair_pattern" => {
                let key = member.child_by_field_name("key")?;
                let value = member.child_by_field_name("value")?;
                Some(PatternMember::Property(PatternProperty {
                    start,
                    end,
                    computed: key.kind() == "computed_property_name",
                    key: self.property_key(key),
                    value: self.pattern(value),
                    shorthand: false,
                }))
            }
            "shorthand_property_identifier_pattern" => Some(PatternMember::Property(PatternProperty {
                start,
                end,
                key: Expression::Identifier(self.identifier(member)),
                value: Pattern::Identifier(self.identifier(member)),
                computed: false,
                shorthand: true,
            })),
            // `{ size = 1 }`
            "object_assignment_pattern" => {
                let left = member.child_by_field_name("left")?;
                Some(PatternMember::Property(PatternProperty {
                    start,
                    end,
                    key: Expression::Identifier(self.identifier(left)),
                    value: self.pattern(member),
                    computed: false,
                    shorthand: true,
                }))
            }
            "rest_pattern" => match self.pattern(member) {
                Pattern::RestElement(rest) => Some(PatternMember::RestElement(rest)),
                _ => None,
            },
            _ => None,
        }
    }

    fn object(&self, node: Node) -> ObjectExpression {
        let properties = self
            .named(node)
            .into_iter()
            .filter_map(|member| {
                let (start, end) = (member.start_byte(), member.end_byte());
                match member.kind() {
                    "pair" => {
                        let key = member.child_by_field_name("key")?;
                        let value = member.child_by_field_name("value")?;
                        Some(ObjectMember::Property(Property {
                            start,
                            end,
                            computed: key.kind() == "computed_property_name",
                            key: self.property_key(key),
                            value: self.expression(value),
                            shorthand: false,
                        }))
                    }
                    "shorthand_property_identifier" => Some(ObjectMember::Property(Property {
                        start,
                        end,
                        key: Expression::Identifier(self.identifier(member)),
                        value: Expression::Identifier(self.identifier(member)),
                        computed: false,
                        shorthand: true,
                    })),
                    "spread_element" => match self.expression(member) {
                        Expression::SpreadElement(spread) => Some(ObjectMember::SpreadElement(spread)),
                        _ => None,
                    },
                    "method_definition" => Some(ObjectMember::Property(Property {
                        start,
                        end,
                        key: member
                            .child_by_field_name("name")
                            .map(|name| self.property_key(name))
                            .unwrap_or(Expression::Unknown),
                        value: Expression::Unknown,
                        computed: false,
                        shorthand: false,
                    })),
                    _ => None,
                }
            })
            .collect();

        ObjectExpression {
            start: node.start_byte(),
            end: node.end_byte(),
            properties,
        }
    }

    fn property_key(&self, node: Node) -> Expression {
        match node.kind() {
            "property_identifier" | "private_property_identifier" | "identifier" => {
                Expression::Identifier(self.identifier(node))
            }
            "computed_property_name" => match self.named(node).first() {
                Some(&inner) => self.expression(inner),
                None => Expression::Unknown,
            },
            _ => self.expression(node),
        }
    }

    fn template_literal(&self, node: Node) -> TemplateLiteral {
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        let mut cooked = String::new();

        for part in self.named(node) {
            match part.kind() {
                "template_substitution" => {
                    quasis.push(TemplateElement {
                        value: TemplateElementValue {
                            cooked: Some(std::mem::take(&mut cooked)),
                        },
                    });
                    expressions.push(
                        self.named(part)
                            .first()
                            .map(|&inner| self.expression(inner))
                            .unwrap_or(Expression::Unknown),
                    );
                }
                "escape_sequence" => cooked.push_str(&unescape(self.text(part))),
                _ => cooked.push_str(self.text(part)),
            }
        }
        quasis.push(TemplateElement {
            value: TemplateElementValue {
                cooked: Some(cooked),
            },
        });

        TemplateLiteral {
            start: node.start_byte(),
            end: node.end_byte(),
            quasis,
            expressions,
        }
    }

    /// Cooked value of a string literal node
    fn string_value(&self, node: Node) -> String {
        self.named(node)
            .into_iter()
            .map(|part| match part.kind() {
                "escape_sequence" => unescape(self.text(part)),
                _ => self.text(part).to_string(),
            })
            .collect()
    }
}

fn unescape(sequence: &str) -> String {
    let body = sequence.strip_prefix('\\').unwrap_or(sequence);
    match body {
        "n" => "\n".to_string(),
        "t" => "\t".to_string(),
        "r" => "\r".to_string(),
        "0" => "\0".to_string(),
        "b" => "\u{8}".to_string(),
        "f" => "\u{c}".to_string(),
        "v" => "\u{b}".to_string(),
        _ => {
            let hex = body
                .strip_prefix("u{")
                .and_then(|rest| rest.strip_suffix('}'))
                .or_else(|| body.strip_prefix('u'))
                .or_else(|| body.strip_prefix('x'));
            match hex.and_then(|digits| u32::from_str_radix(digits, 16).ok()).and_then(char::from_u32) {
                Some(ch) => ch.to_string(),
                // Line continuations vanish, anything else stands for itself
                None if body.starts_with('\n') || body.starts_with('\r') => String::new(),
                None => body.to_string(),
            }
        }
    }
}
