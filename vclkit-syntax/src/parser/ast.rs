//! Abstract Syntax Tree for VCL
//!
//! Every statement and expression is a [`Node`]: the variant payload plus
//! [`Meta`], which records source position, nesting depth and the comments
//! attached to the node. Metadata never takes part in equality, so two
//! trees compare equal when their shapes, operators and literal values do.

use crate::parser::lexer::Position;
use serde::Serialize;
use std::fmt;

/// A comment exactly as written, delimiters included
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Comment {
    pub value: String,
}

impl Comment {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    /// `//` and `#` comments run to the end of their line.
    pub fn is_line_comment(&self) -> bool {
        self.value.starts_with("//") || self.value.starts_with('#')
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

pub type Comments = Vec<Comment>;

/// Position, nesting depth and attached comments of a node
#[derive(Debug, Clone, Default, Serialize)]
pub struct Meta {
    pub position: Position,
    /// Number of enclosing block statements. Block statements record the
    /// depth of their contents.
    pub nest: usize,
    /// Comments on their own lines before the node
    pub leading: Comments,
    /// Comments on the same line after the node's terminator
    pub trailing: Comments,
    /// Comments inside the node that belong to no child, e.g. after the
    /// last statement of a block
    pub infix: Comments,
}

impl Meta {
    pub fn new(position: Position, nest: usize) -> Self {
        Self {
            position,
            nest,
            ..Self::default()
        }
    }

    pub fn with_leading(mut self, leading: Comments) -> Self {
        self.leading = leading;
        self
    }

    /// All comments held by this metadata, in source order.
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.leading.iter().chain(&self.infix).chain(&self.trailing)
    }
}

impl PartialEq for Meta {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

/// A node with source metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node<T> {
    pub inner: T,
    pub meta: Meta,
}

impl<T> Node<T> {
    pub fn new(inner: T, meta: Meta) -> Self {
        Self { inner, meta }
    }
}

/// Uniform access to node metadata
pub trait HasMeta {
    fn meta(&self) -> &Meta;
    fn meta_mut(&mut self) -> &mut Meta;
}

impl<T> HasMeta for Node<T> {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }
}

/// Root AST node - a whole VCL file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    pub statements: Vec<Statement>,
    /// Comments after the last statement are held as infix comments.
    pub meta: Meta,
}

// ============================================================
// Statements
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "node")]
pub enum Statement {
    // Declarations (top level only)
    Subroutine(Node<SubroutineDeclaration>),
    Acl(Node<AclDeclaration>),
    Table(Node<TableDeclaration>),
    Backend(Node<BackendDeclaration>),

    Block(Node<BlockStatement>),
    Import(Node<ImportStatement>),
    Include(Node<IncludeStatement>),
    Declare(Node<DeclareStatement>),
    Set(Node<AssignStatement>),
    Add(Node<AssignStatement>),
    Unset(Node<UnsetStatement>),
    Remove(Node<UnsetStatement>),
    If(Node<IfStatement>),
    Switch(Node<SwitchStatement>),
    Restart(Node<RestartStatement>),
    Esi(Node<EsiStatement>),
    Call(Node<CallStatement>),
    Error(Node<ErrorStatement>),
    Log(Node<LogStatement>),
    Return(Node<ReturnStatement>),
    Synthetic(Node<SyntheticStatement>),
    SyntheticBase64(Node<SyntheticStatement>),
    Goto(Node<GotoStatement>),
    GotoLabel(Node<GotoLabelStatement>),
    FunctionCall(Node<FunctionCallStatement>),
}

impl Statement {
    /// Top-level declarations are separated by a blank line when formatted.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Statement::Subroutine(_) | Statement::Acl(_) | Statement::Table(_) | Statement::Backend(_)
        )
    }
}

impl HasMeta for Statement {
    fn meta(&self) -> &Meta {
        match self {
            Statement::Subroutine(n) => &n.meta,
            Statement::Acl(n) => &n.meta,
            Statement::Table(n) => &n.meta,
            Statement::Backend(n) => &n.meta,
            Statement::Block(n) => &n.meta,
            Statement::Import(n) => &n.meta,
            Statement::Include(n) => &n.meta,
            Statement::Declare(n) => &n.meta,
            Statement::Set(n) | Statement::Add(n) => &n.meta,
            Statement::Unset(n) | Statement::Remove(n) => &n.meta,
            Statement::If(n) => &n.meta,
            Statement::Switch(n) => &n.meta,
            Statement::Restart(n) => &n.meta,
            Statement::Esi(n) => &n.meta,
            Statement::Call(n) => &n.meta,
            Statement::Error(n) => &n.meta,
            Statement::Log(n) => &n.meta,
            Statement::Return(n) => &n.meta,
            Statement::Synthetic(n) | Statement::SyntheticBase64(n) => &n.meta,
            Statement::Goto(n) => &n.meta,
            Statement::GotoLabel(n) => &n.meta,
            Statement::FunctionCall(n) => &n.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Statement::Subroutine(n) => &mut n.meta,
            Statement::Acl(n) => &mut n.meta,
            Statement::Table(n) => &mut n.meta,
            Statement::Backend(n) => &mut n.meta,
            Statement::Block(n) => &mut n.meta,
            Statement::Import(n) => &mut n.meta,
            Statement::Include(n) => &mut n.meta,
            Statement::Declare(n) => &mut n.meta,
            Statement::Set(n) | Statement::Add(n) => &mut n.meta,
            Statement::Unset(n) | Statement::Remove(n) => &mut n.meta,
            Statement::If(n) => &mut n.meta,
            Statement::Switch(n) => &mut n.meta,
            Statement::Restart(n) => &mut n.meta,
            Statement::Esi(n) => &mut n.meta,
            Statement::Call(n) => &mut n.meta,
            Statement::Error(n) => &mut n.meta,
            Statement::Log(n) => &mut n.meta,
            Statement::Return(n) => &mut n.meta,
            Statement::Synthetic(n) | Statement::SyntheticBase64(n) => &mut n.meta,
            Statement::Goto(n) => &mut n.meta,
            Statement::GotoLabel(n) => &mut n.meta,
            Statement::FunctionCall(n) => &mut n.meta,
        }
    }
}

/// `{ ... }`; the braces render one level shallower than `meta.nest`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportStatement {
    pub name: Node<Ident>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncludeStatement {
    pub module: Node<StringLiteral>,
}

/// `declare local var.name TYPE;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclareStatement {
    pub name: Node<Ident>,
    pub value_type: Node<Ident>,
}

/// `set` and `add`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignStatement {
    pub target: Node<Ident>,
    pub operator: AssignOperator,
    pub value: Expression,
}

/// `unset` and `remove`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnsetStatement {
    pub target: Node<Ident>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStatement {
    pub condition: Expression,
    pub consequence: Node<BlockStatement>,
    /// `else if` branches in source order
    pub another: Vec<Node<ElseIfBranch>>,
    pub alternative: Option<Node<ElseBranch>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseIfBranch {
    pub keyword: ElseIfKeyword,
    pub condition: Expression,
    pub consequence: Node<BlockStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseBranch {
    pub consequence: Node<BlockStatement>,
}

/// The spellings VCL accepts for an else-if branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElseIfKeyword {
    ElseIf,
    Elseif,
    Elsif,
}

impl ElseIfKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElseIfKeyword::ElseIf => "else if",
            ElseIfKeyword::Elseif => "elseif",
            ElseIfKeyword::Elsif => "elsif",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchStatement {
    pub control: Expression,
    pub cases: Vec<Node<SwitchCase>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCase {
    /// `None` for `default:`
    pub test: Option<CaseTest>,
    pub statements: Vec<Statement>,
    /// The case ends with a bare `break;`
    pub is_break: bool,
    /// The case ends with `fallthrough;`
    pub fallthrough: bool,
    /// Comments around the `break` / `fallthrough` keyword
    pub terminator: Meta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseTest {
    pub operator: CaseOperator,
    pub value: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaseOperator {
    /// `case "value":`
    Equal,
    /// `case ~ "pattern":`
    Match,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestartStatement;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EsiStatement;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallStatement {
    pub subroutine: Node<Ident>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorStatement {
    pub code: Expression,
    pub argument: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogStatement {
    pub value: Expression,
}

/// Equality compares the value only; `parenthesized` is spelling.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    /// Source wrapped the value in parentheses
    #[serde(skip)]
    pub parenthesized: bool,
}

impl PartialEq for ReturnStatement {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// `synthetic` and `synthetic.base64`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticStatement {
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GotoStatement {
    pub destination: Node<Ident>,
}

/// `name:`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GotoLabelStatement {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCallStatement {
    pub function: Node<Ident>,
    pub arguments: Vec<Expression>,
}

// ============================================================
// Declarations
// ============================================================

/// `sub name [TYPE] { ... }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubroutineDeclaration {
    pub name: Node<Ident>,
    pub return_type: Option<Node<Ident>>,
    pub block: Node<BlockStatement>,
}

/// `acl name { "10.0.0.0"/8; !"10.0.0.1"; }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AclDeclaration {
    pub name: Node<Ident>,
    pub entries: Vec<Node<AclEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AclEntry {
    pub inverse: bool,
    pub ip: Node<StringLiteral>,
    pub mask: Option<i64>,
}

/// `table name [TYPE] { "key": value, }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDeclaration {
    pub name: Node<Ident>,
    pub value_type: Option<Node<Ident>>,
    pub properties: Vec<Node<TableProperty>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableProperty {
    pub key: Node<StringLiteral>,
    pub value: Expression,
}

/// `backend name { .host = "example.com"; .probe = { ... } }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendDeclaration {
    pub name: Node<Ident>,
    pub properties: Vec<Node<BackendProperty>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendProperty {
    pub name: Node<Ident>,
    pub value: BackendValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BackendValue {
    Expression(Expression),
    Object(Vec<Node<BackendProperty>>),
}

// ============================================================
// Expressions
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "node")]
pub enum Expression {
    Ident(Node<Ident>),
    String(Node<StringLiteral>),
    Integer(Node<IntegerLiteral>),
    Float(Node<FloatLiteral>),
    Bool(Node<BoolLiteral>),
    RTime(Node<RTimeLiteral>),
    Prefix(Node<PrefixExpression>),
    Infix(Node<InfixExpression>),
    Group(Node<GroupExpression>),
    If(Node<IfExpression>),
    FunctionCall(Node<FunctionCallExpression>),
}

impl HasMeta for Expression {
    fn meta(&self) -> &Meta {
        match self {
            Expression::Ident(n) => &n.meta,
            Expression::String(n) => &n.meta,
            Expression::Integer(n) => &n.meta,
            Expression::Float(n) => &n.meta,
            Expression::Bool(n) => &n.meta,
            Expression::RTime(n) => &n.meta,
            Expression::Prefix(n) => &n.meta,
            Expression::Infix(n) => &n.meta,
            Expression::Group(n) => &n.meta,
            Expression::If(n) => &n.meta,
            Expression::FunctionCall(n) => &n.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Expression::Ident(n) => &mut n.meta,
            Expression::String(n) => &mut n.meta,
            Expression::Integer(n) => &mut n.meta,
            Expression::Float(n) => &mut n.meta,
            Expression::Bool(n) => &mut n.meta,
            Expression::RTime(n) => &mut n.meta,
            Expression::Prefix(n) => &mut n.meta,
            Expression::Infix(n) => &mut n.meta,
            Expression::Group(n) => &mut n.meta,
            Expression::If(n) => &mut n.meta,
            Expression::FunctionCall(n) => &mut n.meta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ident {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringLiteral {
    pub value: String,
    /// Written as `{"..."}`
    pub long: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegerLiteral {
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatLiteral {
    pub value: f64,
    /// Source text, so `1.50` keeps its trailing zero
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoolLiteral {
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RTimeLiteral {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefixExpression {
    pub operator: PrefixOperator,
    pub right: Box<Expression>,
}

/// Equality ignores `explicit`: `"a" + "b"` and `"a" "b"` are the same
/// concatenation.
#[derive(Debug, Clone, Serialize)]
pub struct InfixExpression {
    pub operator: InfixOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    /// `false` for string concatenation by juxtaposition (`"a" "b"`)
    #[serde(skip)]
    pub explicit: bool,
}

impl PartialEq for InfixExpression {
    fn eq(&self, other: &Self) -> bool {
        self.operator == other.operator && self.left == other.left && self.right == other.right
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupExpression {
    pub right: Box<Expression>,
}

/// `if(condition, consequence, alternative)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfExpression {
    pub condition: Box<Expression>,
    pub consequence: Box<Expression>,
    pub alternative: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCallExpression {
    pub function: Node<Ident>,
    pub arguments: Vec<Expression>,
}

// ============================================================
// Operators
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrefixOperator {
    Not,
    Minus,
    Plus,
}

impl PrefixOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrefixOperator::Not => "!",
            PrefixOperator::Minus => "-",
            PrefixOperator::Plus => "+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InfixOperator {
    Or,
    And,
    Equal,
    NotEqual,
    Match,
    NotMatch,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    /// Explicit `+` or implicit concatenation
    Plus,
}

impl InfixOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfixOperator::Or => "||",
            InfixOperator::And => "&&",
            InfixOperator::Equal => "==",
            InfixOperator::NotEqual => "!=",
            InfixOperator::Match => "~",
            InfixOperator::NotMatch => "!~",
            InfixOperator::LessThan => "<",
            InfixOperator::LessThanEqual => "<=",
            InfixOperator::GreaterThan => ">",
            InfixOperator::GreaterThanEqual => ">=",
            InfixOperator::Plus => "+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignOperator {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    BitwiseOr,
    BitwiseAnd,
    BitwiseXor,
    LeftShift,
    RightShift,
    LogicalAnd,
    LogicalOr,
}

impl AssignOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOperator::Assign => "=",
            AssignOperator::Add => "+=",
            AssignOperator::Subtract => "-=",
            AssignOperator::Multiply => "*=",
            AssignOperator::Divide => "/=",
            AssignOperator::Remainder => "%=",
            AssignOperator::BitwiseOr => "|=",
            AssignOperator::BitwiseAnd => "&=",
            AssignOperator::BitwiseXor => "^=",
            AssignOperator::LeftShift => "<<=",
            AssignOperator::RightShift => ">>=",
            AssignOperator::LogicalAnd => "&&=",
            AssignOperator::LogicalOr => "||=",
        }
    }
}

macro_rules! impl_operator_display {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

impl_operator_display!(PrefixOperator, InfixOperator, AssignOperator, ElseIfKeyword);

// ============================================================
// Comment walk
// ============================================================

impl Program {
    /// Every comment in the tree, statement by statement.
    pub fn comments(&self) -> Vec<&Comment> {
        let mut out = Vec::new();
        for statement in &self.statements {
            statement_comments(statement, &mut out);
        }
        out.extend(self.meta.comments());
        out
    }
}

fn statement_comments<'a>(statement: &'a Statement, out: &mut Vec<&'a Comment>) {
    out.extend(statement.meta().comments());
    match statement {
        Statement::Subroutine(n) => {
            ident_comments(&n.inner.name, out);
            if let Some(ty) = &n.inner.return_type {
                ident_comments(ty, out);
            }
            block_comments(&n.inner.block, out);
        }
        Statement::Acl(n) => {
            ident_comments(&n.inner.name, out);
            for entry in &n.inner.entries {
                out.extend(entry.meta.comments());
                out.extend(entry.inner.ip.meta.comments());
            }
        }
        Statement::Table(n) => {
            ident_comments(&n.inner.name, out);
            if let Some(ty) = &n.inner.value_type {
                ident_comments(ty, out);
            }
            for property in &n.inner.properties {
                out.extend(property.meta.comments());
                out.extend(property.inner.key.meta.comments());
                expression_comments(&property.inner.value, out);
            }
        }
        Statement::Backend(n) => {
            ident_comments(&n.inner.name, out);
            backend_property_comments(&n.inner.properties, out);
        }
        Statement::Block(n) => {
            for statement in &n.inner.statements {
                statement_comments(statement, out);
            }
        }
        Statement::Import(n) => ident_comments(&n.inner.name, out),
        Statement::Include(n) => out.extend(n.inner.module.meta.comments()),
        Statement::Declare(n) => {
            ident_comments(&n.inner.name, out);
            ident_comments(&n.inner.value_type, out);
        }
        Statement::Set(n) | Statement::Add(n) => {
            ident_comments(&n.inner.target, out);
            expression_comments(&n.inner.value, out);
        }
        Statement::Unset(n) | Statement::Remove(n) => ident_comments(&n.inner.target, out),
        Statement::If(n) => {
            expression_comments(&n.inner.condition, out);
            block_comments(&n.inner.consequence, out);
            for branch in &n.inner.another {
                out.extend(branch.meta.comments());
                expression_comments(&branch.inner.condition, out);
                block_comments(&branch.inner.consequence, out);
            }
            if let Some(alternative) = &n.inner.alternative {
                out.extend(alternative.meta.comments());
                block_comments(&alternative.inner.consequence, out);
            }
        }
        Statement::Switch(n) => {
            expression_comments(&n.inner.control, out);
            for case in &n.inner.cases {
                out.extend(case.meta.comments());
                if let Some(test) = &case.inner.test {
                    expression_comments(&test.value, out);
                }
                for statement in &case.inner.statements {
                    statement_comments(statement, out);
                }
                out.extend(case.inner.terminator.comments());
            }
        }
        Statement::Restart(_) | Statement::Esi(_) | Statement::GotoLabel(_) => {}
        Statement::Call(n) => ident_comments(&n.inner.subroutine, out),
        Statement::Error(n) => {
            expression_comments(&n.inner.code, out);
            if let Some(argument) = &n.inner.argument {
                expression_comments(argument, out);
            }
        }
        Statement::Log(n) => expression_comments(&n.inner.value, out),
        Statement::Return(n) => {
            if let Some(value) = &n.inner.value {
                expression_comments(value, out);
            }
        }
        Statement::Synthetic(n) | Statement::SyntheticBase64(n) => {
            expression_comments(&n.inner.value, out)
        }
        Statement::Goto(n) => ident_comments(&n.inner.destination, out),
        Statement::FunctionCall(n) => {
            ident_comments(&n.inner.function, out);
            for argument in &n.inner.arguments {
                expression_comments(argument, out);
            }
        }
    }
}

fn block_comments<'a>(block: &'a Node<BlockStatement>, out: &mut Vec<&'a Comment>) {
    out.extend(block.meta.comments());
    for statement in &block.inner.statements {
        statement_comments(statement, out);
    }
}

fn backend_property_comments<'a>(properties: &'a [Node<BackendProperty>], out: &mut Vec<&'a Comment>) {
    for property in properties {
        out.extend(property.meta.comments());
        ident_comments(&property.inner.name, out);
        match &property.inner.value {
            BackendValue::Expression(value) => expression_comments(value, out),
            BackendValue::Object(nested) => backend_property_comments(nested, out),
        }
    }
}

fn ident_comments<'a>(ident: &'a Node<Ident>, out: &mut Vec<&'a Comment>) {
    out.extend(ident.meta.comments());
}

fn expression_comments<'a>(expression: &'a Expression, out: &mut Vec<&'a Comment>) {
    out.extend(expression.meta().comments());
    match expression {
        Expression::Prefix(n) => expression_comments(&n.inner.right, out),
        Expression::Infix(n) => {
            expression_comments(&n.inner.left, out);
            expression_comments(&n.inner.right, out);
        }
        Expression::Group(n) => expression_comments(&n.inner.right, out),
        Expression::If(n) => {
            expression_comments(&n.inner.condition, out);
            expression_comments(&n.inner.consequence, out);
            expression_comments(&n.inner.alternative, out);
        }
        Expression::FunctionCall(n) => {
            ident_comments(&n.inner.function, out);
            for argument in &n.inner.arguments {
                expression_comments(argument, out);
            }
        }
        Expression::Ident(_)
        | Expression::String(_)
        | Expression::Integer(_)
        | Expression::Float(_)
        | Expression::Bool(_)
        | Expression::RTime(_) => {}
    }
}
