// ESTree subset for script regions and compiled output
//
// Only the statement and expression shapes the extractors inspect are
// modelled. Everything else deserializes to `Unknown` and is treated as a
// leaf by the walker.

use super::Span;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    #[serde(default)]
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    ImportDeclaration(ImportDeclaration),
    VariableDeclaration(VariableDeclaration),
    ExportNamedDeclaration(ExportNamedDeclaration),
    ExportDefaultDeclaration(ExportDefaultDeclaration),
    FunctionDeclaration(Function),
    ExpressionStatement(ExpressionStatement),
    BlockStatement(BlockStatement),
    ReturnStatement(ReturnStatement),
    #[serde(other)]
    Unknown,
}

impl Statement {
    pub fn span(&self) -> Option<Span> {
        let (start, end) = match self {
            Statement::ImportDeclaration(n) => (n.start, n.end),
            Statement::VariableDeclaration(n) => (n.start, n.end),
            Statement::ExportNamedDeclaration(n) => (n.start, n.end),
            Statement::ExportDefaultDeclaration(n) => (n.start, n.end),
            Statement::FunctionDeclaration(n) => (n.start, n.end),
            Statement::ExpressionStatement(n) => (n.start, n.end),
            Statement::BlockStatement(n) => (n.start, n.end),
            Statement::ReturnStatement(n) => (n.start, n.end),
            Statement::Unknown => return None,
        };
        Some(Span::new(start, end))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportDeclaration {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    #[serde(default)]
    pub specifiers: Vec<ImportClause>,
    pub source: Literal,
}

/// One entry of an import clause
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ImportClause {
    ImportSpecifier(ImportSpecifier),
    ImportDefaultSpecifier(LocalSpecifier),
    ImportNamespaceSpecifier(LocalSpecifier),
}

impl ImportClause {
    pub fn local(&self) -> &Identifier {
        match self {
            ImportClause::ImportSpecifier(spec) => &spec.local,
            ImportClause::ImportDefaultSpecifier(spec)
            | ImportClause::ImportNamespaceSpecifier(spec) => &spec.local,
        }
    }
}

/// `import { imported as local } from "..."`
#[derive(Debug, Clone, Deserialize)]
pub struct ImportSpecifier {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub imported: ModuleExportName,
    pub local: Identifier,
}

impl ImportSpecifier {
    pub fn imported_name(&self) -> Option<&str> {
        self.imported.name()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalSpecifier {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub local: Identifier,
}

/// Imported binding name: an identifier or, since ES2022, a string literal
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ModuleExportName {
    Identifier(Identifier),
    Literal(Literal),
}

impl ModuleExportName {
    pub fn name(&self) -> Option<&str> {
        match self {
            ModuleExportName::Identifier(ident) => Some(&ident.name),
            ModuleExportName::Literal(literal) => literal.as_str(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariableDeclaration {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub declarations: Vec<VariableDeclarator>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariableDeclarator {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub id: Pattern,
    #[serde(default)]
    pub init: Option<Expression>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportNamedDeclaration {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    #[serde(default)]
    pub declaration: Option<Box<Statement>>,
}

/// `export default <declaration>`
///
/// The declaration is either a function declaration or any expression; both
/// are carried by `Expression` (see `Expression::FunctionDeclaration`).
#[derive(Debug, Clone, Deserialize)]
pub struct ExportDefaultDeclaration {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub declaration: Box<Expression>,
}

/// Function declarations, function expressions and arrow functions
#[derive(Debug, Clone, Deserialize)]
pub struct Function {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    #[serde(default)]
    pub id: Option<Identifier>,
    #[serde(default)]
    pub params: Vec<Pattern>,
    pub body: Box<Statement>,
}

impl Function {
    pub fn name(&self) -> Option<&str> {
        self.id.as_ref().map(|id| id.name.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionStatement {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub expression: Expression,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockStatement {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    #[serde(default)]
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReturnStatement {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    #[serde(default)]
    pub argument: Option<Expression>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    Identifier(Identifier),
    Literal(Literal),
    TemplateLiteral(TemplateLiteral),
    ArrayExpression(ArrayExpression),
    ObjectExpression(ObjectExpression),
    CallExpression(CallExpression),
    MemberExpression(MemberExpression),
    FunctionExpression(Function),
    ArrowFunctionExpression(Function),
    /// Only reachable as the declaration of `export default function ...`
    FunctionDeclaration(Function),
    SpreadElement(SpreadElement),
    #[serde(other)]
    Unknown,
}

impl Expression {
    pub fn span(&self) -> Option<Span> {
        let (start, end) = match self {
            Expression::Identifier(n) => (n.start, n.end),
            Expression::Literal(n) => (n.start, n.end),
            Expression::TemplateLiteral(n) => (n.start, n.end),
            Expression::ArrayExpression(n) => (n.start, n.end),
            Expression::ObjectExpression(n) => (n.start, n.end),
            Expression::CallExpression(n) => (n.start, n.end),
            Expression::MemberExpression(n) => (n.start, n.end),
            Expression::FunctionExpression(n)
            | Expression::ArrowFunctionExpression(n)
            | Expression::FunctionDeclaration(n) => (n.start, n.end),
            Expression::SpreadElement(n) => (n.start, n.end),
            Expression::Unknown => return None,
        };
        Some(Span::new(start, end))
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Expression::Identifier(ident) => Some(ident),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Expression::FunctionExpression(func)
            | Expression::ArrowFunctionExpression(func)
            | Expression::FunctionDeclaration(func) => Some(func),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identifier {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Literal {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    #[serde(default)]
    pub value: LiteralValue,
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            LiteralValue::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    String(String),
    Boolean(bool),
    Number(f64),
    /// `null`, regular expressions, bigints
    Other(serde_json::Value),
}

impl Default for LiteralValue {
    fn default() -> Self {
        LiteralValue::Other(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateLiteral {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    #[serde(default)]
    pub quasis: Vec<TemplateElement>,
    #[serde(default)]
    pub expressions: Vec<Expression>,
}

impl TemplateLiteral {
    /// Text of a template literal without interpolations
    pub fn static_text(&self) -> Option<&str> {
        match (self.expressions.as_slice(), self.quasis.as_slice()) {
            ([], [only]) => only.value.cooked.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateElement {
    pub value: TemplateElementValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateElementValue {
    #[serde(default)]
    pub cooked: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArrayExpression {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    /// Holes (`[a, , b]`) are `None`
    #[serde(default)]
    pub elements: Vec<Option<Expression>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectExpression {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    #[serde(default)]
    pub properties: Vec<ObjectMember>,
}

impl ObjectExpression {
    /// Value of the first non-computed property whose key is `key`
    pub fn property(&self, key: &str) -> Option<&Expression> {
        self.properties.iter().find_map(|member| match member {
            ObjectMember::Property(prop) if !prop.computed && prop.key_name() == Some(key) => {
                Some(&prop.value)
            }
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectMember {
    Property(Property),
    SpreadElement(SpreadElement),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Property {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub key: Expression,
    pub value: Expression,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub shorthand: bool,
}

impl Property {
    pub fn key_name(&self) -> Option<&str> {
        property_key_name(&self.key)
    }
}

pub(crate) fn property_key_name(key: &Expression) -> Option<&str> {
    match key {
        Expression::Identifier(ident) => Some(&ident.name),
        Expression::Literal(literal) => literal.as_str(),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallExpression {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub callee: Box<Expression>,
    #[serde(default)]
    pub arguments: Vec<Expression>,
}

impl CallExpression {
    pub fn callee_name(&self) -> Option<&str> {
        self.callee.as_identifier().map(|ident| ident.name.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberExpression {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub object: Box<Expression>,
    pub property: Box<Expression>,
    #[serde(default)]
    pub computed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpreadElement {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub argument: Box<Expression>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    Identifier(Identifier),
    ObjectPattern(ObjectPattern),
    ArrayPattern(ArrayPattern),
    AssignmentPattern(AssignmentPattern),
    RestElement(RestElement),
    #[serde(other)]
    Unknown,
}

impl Pattern {
    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Pattern::Identifier(ident) => Some(ident),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectPattern {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    #[serde(default)]
    pub properties: Vec<PatternMember>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum PatternMember {
    Property(PatternProperty),
    RestElement(RestElement),
}

/// `{ key: value }` inside a destructuring pattern
#[derive(Debug, Clone, Deserialize)]
pub struct PatternProperty {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub key: Expression,
    pub value: Pattern,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub shorthand: bool,
}

impl PatternProperty {
    pub fn key_name(&self) -> Option<&str> {
        property_key_name(&self.key)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArrayPattern {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    #[serde(default)]
    pub elements: Vec<Option<Pattern>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentPattern {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub left: Box<Pattern>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestElement {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub argument: Box<Pattern>,
}
