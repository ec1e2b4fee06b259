//! VCL Parser
//!
//! Recursive descent parser that converts tokens into AST.
//!
//! Comments reach the parser folded into the code token that follows
//! them (see [`crate::parser::comments`]). Each construct decides where
//! the comments in front of the tokens it consumes belong; anything it
//! does not claim is carried in `pending` and becomes a leading comment
//! of the next node, so no comment is ever dropped.

use crate::parser::ast::*;
use crate::parser::comments::{collect, Adjacency, CommentedToken};
use crate::parser::lexer::{tokenize, LexError, LineIndex, Position, Token};
use std::ops::Range;
use thiserror::Error;

/// Parser error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Lexer error: {0}")]
    Lex(#[from] LexError),

    #[error("Unexpected token at line {line}, column {column}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        column: usize,
        span: Range<usize>,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("Invalid syntax at line {line}, column {column}: {message}")]
    InvalidSyntax {
        line: usize,
        column: usize,
        span: Range<usize>,
        message: String,
    },
}

impl ParseError {
    /// 1-based line and column, when the error has a location
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            ParseError::Lex(err) => {
                let position = err.position();
                Some((position.line, position.column))
            }
            ParseError::UnexpectedToken { line, column, .. }
            | ParseError::InvalidSyntax { line, column, .. } => Some((*line, *column)),
            ParseError::UnexpectedEof { .. } => None,
        }
    }

    /// Byte range in the source, when the error has a location
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            ParseError::Lex(err) => Some(err.offset()..err.offset() + 1),
            ParseError::UnexpectedToken { span, .. } | ParseError::InvalidSyntax { span, .. } => {
                Some(span.clone())
            }
            ParseError::UnexpectedEof { .. } => None,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parser state
pub struct Parser {
    tokens: Vec<CommentedToken>,
    pos: usize,
    /// Comments passed over without a claimant; flushed into the next
    /// leading or infix slot.
    pending: Comments,
    /// Current block depth
    pub(super) nest: usize,
    comment_count: usize,
}

impl Parser {
    /// Create a new parser from source code
    pub fn new(source: &str) -> ParseResult<Self> {
        let tokens = tokenize(source)?;
        let comment_count = tokens.iter().filter(|t| t.value.is_comment()).count();
        let eof = LineIndex::new(source).position(source.len());
        Ok(Self {
            tokens: collect(tokens, source.len(), eof),
            pos: 0,
            pending: Vec::new(),
            nest: 0,
            comment_count,
        })
    }

    /// Parse the whole file
    pub fn parse(&mut self) -> ParseResult<Program> {
        tracing::debug!(tokens = self.tokens.len(), "parsing VCL");
        let mut statements = Vec::new();

        while !self.is_eof() {
            statements.push(self.parse_statement()?);
        }

        let mut meta = Meta::new(Position { line: 1, column: 1 }, 0);
        meta.infix = self.take_leading();
        let program = Program { statements, meta };

        debug_assert_eq!(
            program.comments().len(),
            self.comment_count,
            "every comment must be attached to exactly one node"
        );
        tracing::debug!(
            statements = program.statements.len(),
            comments = self.comment_count,
            "parsed VCL"
        );
        Ok(program)
    }

    // ========================================
    // Statements
    // ========================================

    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let leading = self.take_leading();
        let meta = self.meta().with_leading(leading);

        match self.peek() {
            Token::Sub | Token::Acl | Token::Table | Token::Backend if self.nest > 0 => {
                Err(self.invalid("declarations are only allowed at the top level"))
            }
            Token::Sub => self.parse_subroutine(meta),
            Token::Acl => self.parse_acl(meta),
            Token::Table => self.parse_table(meta),
            Token::Backend => self.parse_backend(meta),

            Token::BraceOpen => {
                let mut block = self.parse_block(meta.leading)?;
                block.meta.trailing = self.take_trailing();
                Ok(Statement::Block(block))
            }
            Token::Import => self.parse_import(meta),
            Token::Include => self.parse_include(meta),
            Token::Declare => self.parse_declare(meta),
            Token::Set => Ok(Statement::Set(self.parse_assign(meta)?)),
            Token::Add => Ok(Statement::Add(self.parse_assign(meta)?)),
            Token::Unset => Ok(Statement::Unset(self.parse_unset(meta)?)),
            Token::Remove => Ok(Statement::Remove(self.parse_unset(meta)?)),
            Token::If => self.parse_if(meta),
            Token::Switch => self.parse_switch(meta),
            Token::Restart => {
                let node = self.parse_bare(RestartStatement, meta)?;
                Ok(Statement::Restart(node))
            }
            Token::Esi => {
                let node = self.parse_bare(EsiStatement, meta)?;
                Ok(Statement::Esi(node))
            }
            Token::Call => self.parse_call(meta),
            Token::Error => self.parse_error(meta),
            Token::Log => self.parse_log(meta),
            Token::Return => self.parse_return(meta),
            Token::Synthetic => Ok(Statement::Synthetic(self.parse_synthetic(meta)?)),
            Token::SyntheticBase64 => Ok(Statement::SyntheticBase64(self.parse_synthetic(meta)?)),
            Token::Goto => self.parse_goto(meta),
            Token::Ident(_) => match self.peek_nth(1) {
                Token::Colon => self.parse_goto_label(meta),
                Token::ParenOpen => self.parse_function_call_statement(meta),
                _ => Err(self.unexpected_at(1, "`(` or `:`")),
            },
            _ => Err(self.unexpected("statement")),
        }
    }

    /// `{ statements }`
    ///
    /// Comments before `{` are the caller's business; `leading` is only
    /// non-empty for a block used as a statement of its own.
    pub(super) fn parse_block(&mut self, leading: Comments) -> ParseResult<Node<BlockStatement>> {
        let position = self.position();
        self.expect(Token::BraceOpen)?;
        self.nest += 1;
        let mut meta = self.meta_at(position).with_leading(leading);

        let mut statements = Vec::new();
        while !self.check(&Token::BraceClose) {
            if self.is_eof() {
                return Err(self.unexpected("`}`"));
            }
            statements.push(self.parse_statement()?);
        }

        meta.infix = self.take_leading();
        self.advance();
        self.nest -= 1;
        Ok(Node::new(BlockStatement { statements }, meta))
    }

    fn parse_import(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        self.advance();
        let name = self.expect_ident("module name")?;
        self.end_statement(&mut meta)?;
        Ok(Statement::Import(Node::new(ImportStatement { name }, meta)))
    }

    fn parse_include(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        self.advance();
        let module = self.expect_string("file name")?;
        self.end_statement(&mut meta)?;
        Ok(Statement::Include(Node::new(IncludeStatement { module }, meta)))
    }

    /// `declare local var.name TYPE;`
    fn parse_declare(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        self.advance();
        self.expect(Token::Local)?;
        let name = self.expect_ident("variable name")?;
        let value_type = self.expect_ident("variable type")?;
        self.end_statement(&mut meta)?;
        Ok(Statement::Declare(Node::new(DeclareStatement { name, value_type }, meta)))
    }

    /// `set` / `add`: `target <op> value;`
    fn parse_assign(&mut self, mut meta: Meta) -> ParseResult<Node<AssignStatement>> {
        self.advance();
        let mut target = self.expect_ident("variable name")?;

        let operator = match self.peek() {
            Token::Assign => AssignOperator::Assign,
            Token::AddAssign => AssignOperator::Add,
            Token::SubtractAssign => AssignOperator::Subtract,
            Token::MultiplyAssign => AssignOperator::Multiply,
            Token::DivideAssign => AssignOperator::Divide,
            Token::RemainderAssign => AssignOperator::Remainder,
            Token::BitwiseOrAssign => AssignOperator::BitwiseOr,
            Token::BitwiseAndAssign => AssignOperator::BitwiseAnd,
            Token::BitwiseXorAssign => AssignOperator::BitwiseXor,
            Token::LeftShiftAssign => AssignOperator::LeftShift,
            Token::RightShiftAssign => AssignOperator::RightShift,
            Token::LogicalAndAssign => AssignOperator::LogicalAnd,
            Token::LogicalOrAssign => AssignOperator::LogicalOr,
            _ => return Err(self.unexpected("assignment operator")),
        };
        target.meta.trailing.extend(self.take_leading());
        self.advance();

        let value = self.parse_expression()?;
        self.end_statement(&mut meta)?;
        Ok(Node::new(
            AssignStatement {
                target,
                operator,
                value,
            },
            meta,
        ))
    }

    /// `unset` / `remove`
    fn parse_unset(&mut self, mut meta: Meta) -> ParseResult<Node<UnsetStatement>> {
        self.advance();
        let target = self.expect_ident("variable name")?;
        self.end_statement(&mut meta)?;
        Ok(Node::new(UnsetStatement { target }, meta))
    }

    /// `restart;` and `esi;`
    fn parse_bare<T>(&mut self, inner: T, mut meta: Meta) -> ParseResult<Node<T>> {
        self.advance();
        self.end_statement(&mut meta)?;
        Ok(Node::new(inner, meta))
    }

    fn parse_if(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        self.advance();
        let condition = self.parse_condition()?;
        let consequence = self.parse_block(Vec::new())?;

        let mut another = Vec::new();
        let mut alternative = None;
        loop {
            let keyword = match (self.peek(), self.peek_nth(1)) {
                (Token::Else, Token::If) => ElseIfKeyword::ElseIf,
                (Token::ElseIf, _) => ElseIfKeyword::Elseif,
                (Token::Elsif, _) => ElseIfKeyword::Elsif,
                (Token::Else, _) => {
                    let leading = self.take_leading();
                    let mut branch = self.meta().with_leading(leading);
                    self.advance();
                    branch.infix = self.take_leading();
                    let consequence = self.parse_block(Vec::new())?;
                    alternative = Some(Node::new(ElseBranch { consequence }, branch));
                    break;
                }
                _ => break,
            };

            let mut leading = self.take_leading();
            let branch = self.meta();
            self.advance();
            if keyword == ElseIfKeyword::ElseIf {
                leading.extend(self.take_leading());
                self.advance();
            }
            let condition = self.parse_condition()?;
            let consequence = self.parse_block(Vec::new())?;
            another.push(Node::new(
                ElseIfBranch {
                    keyword,
                    condition,
                    consequence,
                },
                branch.with_leading(leading),
            ));
        }

        meta.trailing = self.take_trailing();
        Ok(Statement::If(Node::new(
            IfStatement {
                condition,
                consequence,
                another,
                alternative,
            },
            meta,
        )))
    }

    /// `( expression )`, keeping comments up to the following `{` on the
    /// expression.
    fn parse_condition(&mut self) -> ParseResult<Expression> {
        self.expect(Token::ParenOpen)?;
        let mut condition = self.parse_expression()?;
        condition.meta_mut().trailing.extend(self.take_leading());
        self.expect(Token::ParenClose)?;
        condition.meta_mut().trailing.extend(self.take_leading());
        Ok(condition)
    }

    fn parse_switch(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        self.advance();
        let control = self.parse_condition()?;
        self.expect(Token::BraceOpen)?;
        self.nest += 1;

        let mut cases: Vec<Node<SwitchCase>> = Vec::new();
        while !self.check(&Token::BraceClose) {
            match self.peek() {
                Token::Default if cases.iter().any(|c| c.inner.test.is_none()) => {
                    return Err(self.invalid("switch has more than one default case"));
                }
                Token::Case | Token::Default => cases.push(self.parse_case()?),
                _ => return Err(self.unexpected("`case`, `default` or `}`")),
            }
        }

        meta.infix = self.take_leading();
        self.advance();
        self.nest -= 1;
        meta.trailing = self.take_trailing();
        Ok(Statement::Switch(Node::new(SwitchStatement { control, cases }, meta)))
    }

    fn parse_case(&mut self) -> ParseResult<Node<SwitchCase>> {
        let leading = self.take_leading();
        let mut meta = self.meta().with_leading(leading);

        let test = match self.advance() {
            Token::Case => {
                let operator = if self.check(&Token::Match) {
                    self.advance();
                    CaseOperator::Match
                } else {
                    CaseOperator::Equal
                };
                let value = self.parse_expression()?;
                Some(CaseTest { operator, value })
            }
            _ => None,
        };
        meta.infix = self.take_leading();
        self.expect(Token::Colon)?;
        meta.trailing = self.take_trailing();

        self.nest += 1;
        let mut statements = Vec::new();
        let mut terminator = self.meta();
        let mut is_break = false;
        let mut fallthrough = false;
        loop {
            match self.peek() {
                Token::Break | Token::Fallthrough => {
                    let leading = self.take_leading();
                    terminator = self.meta().with_leading(leading);
                    is_break = self.advance() == Token::Break;
                    fallthrough = !is_break;
                    self.end_statement(&mut terminator)?;
                    break;
                }
                Token::Case | Token::Default | Token::BraceClose => break,
                Token::Eof => return Err(self.unexpected("`}`")),
                _ => statements.push(self.parse_statement()?),
            }
        }
        self.nest -= 1;

        Ok(Node::new(
            SwitchCase {
                test,
                statements,
                is_break,
                fallthrough,
                terminator,
            },
            meta,
        ))
    }

    fn parse_call(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        self.advance();
        let subroutine = self.expect_ident("subroutine name")?;
        self.end_statement(&mut meta)?;
        Ok(Statement::Call(Node::new(CallStatement { subroutine }, meta)))
    }

    /// `error <code> [argument];`
    fn parse_error(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        self.advance();
        let code = self.parse_prefix()?;
        let argument = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.end_statement(&mut meta)?;
        Ok(Statement::Error(Node::new(ErrorStatement { code, argument }, meta)))
    }

    fn parse_log(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        self.advance();
        let value = self.parse_expression()?;
        self.end_statement(&mut meta)?;
        Ok(Statement::Log(Node::new(LogStatement { value }, meta)))
    }

    /// `return;`, `return expr;` or `return (expr);`
    fn parse_return(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        self.advance();
        let (value, parenthesized) = if self.check(&Token::Semicolon) {
            (None, false)
        } else {
            match self.parse_expression()? {
                Expression::Group(group) => {
                    let Node { inner, meta: outer } = group;
                    let mut value = *inner.right;
                    let inner_meta = value.meta_mut();
                    let mut leading = outer.leading;
                    leading.append(&mut inner_meta.leading);
                    inner_meta.leading = leading;
                    inner_meta.trailing.extend(outer.trailing);
                    (Some(value), true)
                }
                value => (Some(value), false),
            }
        };
        self.end_statement(&mut meta)?;
        Ok(Statement::Return(Node::new(
            ReturnStatement {
                value,
                parenthesized,
            },
            meta,
        )))
    }

    fn parse_synthetic(&mut self, mut meta: Meta) -> ParseResult<Node<SyntheticStatement>> {
        self.advance();
        let value = self.parse_expression()?;
        self.end_statement(&mut meta)?;
        Ok(Node::new(SyntheticStatement { value }, meta))
    }

    fn parse_goto(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        self.advance();
        let destination = self.expect_ident("label")?;
        self.end_statement(&mut meta)?;
        Ok(Statement::Goto(Node::new(GotoStatement { destination }, meta)))
    }

    /// `label:`
    fn parse_goto_label(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        let name = match self.advance() {
            Token::Ident(name) => name,
            _ => return Err(self.invalid("expected a label name")),
        };
        meta.infix = self.take_leading();
        self.expect(Token::Colon)?;
        meta.trailing = self.take_trailing();
        Ok(Statement::GotoLabel(Node::new(GotoLabelStatement { name }, meta)))
    }

    /// `name(arguments);`
    fn parse_function_call_statement(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        let function = self.expect_ident("function name")?;
        let (arguments, dangling) = self.parse_arguments()?;
        meta.infix = dangling;
        self.end_statement(&mut meta)?;
        Ok(Statement::FunctionCall(Node::new(
            FunctionCallStatement {
                function,
                arguments,
            },
            meta,
        )))
    }

    // ========================================
    // Comment attachment
    // ========================================

    /// Everything written before the current token that nobody claimed yet
    pub(super) fn take_leading(&mut self) -> Comments {
        let mut comments = std::mem::take(&mut self.pending);
        let index = self.index();
        comments.extend(self.tokens[index].comments.drain(..).map(|c| c.comment));
        comments
    }

    /// Comments on the line of the terminator just consumed
    pub(super) fn take_trailing(&mut self) -> Comments {
        let index = self.index();
        let comments = &mut self.tokens[index].comments;
        let same_line = comments
            .iter()
            .take_while(|c| c.adjacency == Adjacency::SameLine)
            .count();
        comments.drain(..same_line).map(|c| c.comment).collect()
    }

    /// Consume `;`, recording comments in front of it as infix and
    /// comments after it on the same line as trailing.
    pub(super) fn end_statement(&mut self, meta: &mut Meta) -> ParseResult<()> {
        meta.infix.extend(self.take_leading());
        self.expect(Token::Semicolon)?;
        meta.trailing = self.take_trailing();
        Ok(())
    }

    // ========================================
    // Helper methods
    // ========================================

    fn index(&self) -> usize {
        self.pos.min(self.tokens.len() - 1)
    }

    pub(super) fn peek(&self) -> &Token {
        &self.tokens[self.index()].token
    }

    pub(super) fn peek_nth(&self, n: usize) -> &Token {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[index].token
    }

    /// Consume the current token. Comments in front of it that were not
    /// taken move to `pending`.
    pub(super) fn advance(&mut self) -> Token {
        let index = self.index();
        let current = &mut self.tokens[index];
        self.pending.extend(current.comments.drain(..).map(|c| c.comment));
        let token = current.token.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub(super) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(super) fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.check(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    /// Identifier node, keywords that double as names included
    pub(super) fn expect_ident(&mut self, expected: &str) -> ParseResult<Node<Ident>> {
        let value = match self.peek() {
            Token::Ident(value) => value.clone(),
            token => match token.keyword_as_ident() {
                Some(value) => value.to_string(),
                None => return Err(self.unexpected(expected)),
            },
        };
        let leading = self.take_leading();
        let meta = self.meta().with_leading(leading);
        self.advance();
        Ok(Node::new(Ident { value }, meta))
    }

    /// Plain or long string literal node
    pub(super) fn expect_string(&mut self, expected: &str) -> ParseResult<Node<StringLiteral>> {
        let (value, long) = match self.peek() {
            Token::String(value) => (value.clone(), false),
            Token::LongString(value) => (value.clone(), true),
            _ => return Err(self.unexpected(expected)),
        };
        let leading = self.take_leading();
        let meta = self.meta().with_leading(leading);
        self.advance();
        Ok(Node::new(StringLiteral { value, long }, meta))
    }

    pub(super) fn is_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    pub(super) fn position(&self) -> Position {
        self.tokens[self.index()].position
    }

    /// Metadata for a node starting at the current token
    pub(super) fn meta(&self) -> Meta {
        Meta::new(self.position(), self.nest)
    }

    pub(super) fn meta_at(&self, position: Position) -> Meta {
        Meta::new(position, self.nest)
    }

    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        self.unexpected_at(0, expected)
    }

    fn unexpected_at(&self, n: usize, expected: &str) -> ParseError {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        let token = &self.tokens[index];
        if token.token == Token::Eof {
            return ParseError::UnexpectedEof {
                expected: expected.to_string(),
            };
        }
        ParseError::UnexpectedToken {
            line: token.position.line,
            column: token.position.column,
            span: token.span.into(),
            expected: expected.to_string(),
            found: token.token.to_string(),
        }
    }

    pub(super) fn invalid(&self, message: &str) -> ParseError {
        let token = &self.tokens[self.index()];
        ParseError::InvalidSyntax {
            line: token.position.line,
            column: token.position.column,
            span: token.span.into(),
            message: message.to_string(),
        }
    }
}

/// Parse VCL source into a [`Program`]
pub fn parse(source: &str) -> ParseResult<Program> {
    let mut parser = Parser::new(source)?;
    parser.parse()
}
