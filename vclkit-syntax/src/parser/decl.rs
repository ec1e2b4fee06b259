//! Top-level declarations: `sub`, `acl`, `table` and `backend`

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parser::{ParseResult, Parser};

impl Parser {
    /// `sub name [TYPE] { ... }`
    pub(super) fn parse_subroutine(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        self.advance();
        let mut name = self.expect_ident("subroutine name")?;
        let mut return_type = match self.peek() {
            Token::Ident(_) => Some(self.expect_ident("return type")?),
            _ => None,
        };

        let before_brace = self.take_leading();
        match return_type.as_mut() {
            Some(ty) => ty.meta.trailing.extend(before_brace),
            None => name.meta.trailing.extend(before_brace),
        }

        let block = self.parse_block(Vec::new())?;
        meta.trailing = self.take_trailing();
        Ok(Statement::Subroutine(Node::new(
            SubroutineDeclaration {
                name,
                return_type,
                block,
            },
            meta,
        )))
    }

    /// `acl name { ["!"] "ip" ["/" mask]; ... }`
    pub(super) fn parse_acl(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        self.advance();
        let mut name = self.expect_ident("acl name")?;
        name.meta.trailing.extend(self.take_leading());
        self.expect(Token::BraceOpen)?;
        self.nest += 1;

        let mut entries = Vec::new();
        while !self.check(&Token::BraceClose) {
            if self.is_eof() {
                return Err(self.unexpected("`}`"));
            }
            entries.push(self.parse_acl_entry()?);
        }

        meta.infix = self.take_leading();
        self.advance();
        self.nest -= 1;
        meta.trailing = self.take_trailing();
        Ok(Statement::Acl(Node::new(AclDeclaration { name, entries }, meta)))
    }

    fn parse_acl_entry(&mut self) -> ParseResult<Node<AclEntry>> {
        let leading = self.take_leading();
        let mut meta = self.meta().with_leading(leading);

        let inverse = self.check(&Token::Bang);
        if inverse {
            self.advance();
        }
        let mut ip = self.expect_string("ip address")?;
        let mask = if self.check(&Token::Slash) {
            ip.meta.trailing.extend(self.take_leading());
            self.advance();
            match self.peek() {
                Token::Integer(mask) => {
                    let mask = *mask;
                    self.advance();
                    Some(mask)
                }
                _ => return Err(self.unexpected("mask length")),
            }
        } else {
            None
        };

        self.end_statement(&mut meta)?;
        Ok(Node::new(AclEntry { inverse, ip, mask }, meta))
    }

    /// `table name [TYPE] { "key": value, ... }`
    pub(super) fn parse_table(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        self.advance();
        let mut name = self.expect_ident("table name")?;
        let mut value_type = match self.peek() {
            Token::Ident(_) => Some(self.expect_ident("table type")?),
            _ => None,
        };

        let before_brace = self.take_leading();
        match value_type.as_mut() {
            Some(ty) => ty.meta.trailing.extend(before_brace),
            None => name.meta.trailing.extend(before_brace),
        }
        self.expect(Token::BraceOpen)?;
        self.nest += 1;

        let mut properties = Vec::new();
        while !self.check(&Token::BraceClose) {
            if self.is_eof() {
                return Err(self.unexpected("`}`"));
            }
            properties.push(self.parse_table_property()?);
        }

        meta.infix = self.take_leading();
        self.advance();
        self.nest -= 1;
        meta.trailing = self.take_trailing();
        Ok(Statement::Table(Node::new(
            TableDeclaration {
                name,
                value_type,
                properties,
            },
            meta,
        )))
    }

    fn parse_table_property(&mut self) -> ParseResult<Node<TableProperty>> {
        let leading = self.take_leading();
        let mut meta = self.meta().with_leading(leading);

        let mut key = self.expect_string("table key")?;
        key.meta.trailing.extend(self.take_leading());
        self.expect(Token::Colon)?;
        let value = self.parse_expression()?;

        match self.peek() {
            Token::Comma => {
                meta.infix = self.take_leading();
                self.advance();
            }
            Token::BraceClose => {}
            _ => return Err(self.unexpected("`,` or `}`")),
        }
        meta.trailing = self.take_trailing();
        Ok(Node::new(TableProperty { key, value }, meta))
    }

    /// `backend name { .property = value; .object = { ... } }`
    pub(super) fn parse_backend(&mut self, mut meta: Meta) -> ParseResult<Statement> {
        self.advance();
        let mut name = self.expect_ident("backend name")?;
        name.meta.trailing.extend(self.take_leading());
        let (properties, infix) = self.parse_backend_object()?;
        meta.infix = infix;
        meta.trailing = self.take_trailing();
        Ok(Statement::Backend(Node::new(BackendDeclaration { name, properties }, meta)))
    }

    /// `{ .property ... }`, returning the comments before `}`
    fn parse_backend_object(&mut self) -> ParseResult<(Vec<Node<BackendProperty>>, Comments)> {
        self.expect(Token::BraceOpen)?;
        self.nest += 1;

        let mut properties = Vec::new();
        while !self.check(&Token::BraceClose) {
            if self.is_eof() {
                return Err(self.unexpected("`}`"));
            }
            properties.push(self.parse_backend_property()?);
        }

        let infix = self.take_leading();
        self.advance();
        self.nest -= 1;
        Ok((properties, infix))
    }

    fn parse_backend_property(&mut self) -> ParseResult<Node<BackendProperty>> {
        let leading = self.take_leading();
        let mut meta = self.meta().with_leading(leading);

        self.expect(Token::Dot)?;
        let mut name = self.expect_ident("property name")?;
        name.meta.trailing.extend(self.take_leading());
        self.expect(Token::Assign)?;

        let value = if self.check(&Token::BraceOpen) {
            let (properties, infix) = self.parse_backend_object()?;
            meta.infix = infix;
            if self.check(&Token::Semicolon) {
                // the `;` is not written back, its comments follow the `}`
                meta.trailing = self.take_leading();
                self.advance();
            }
            meta.trailing.extend(self.take_trailing());
            BackendValue::Object(properties)
        } else {
            let value = self.parse_expression()?;
            self.end_statement(&mut meta)?;
            BackendValue::Expression(value)
        };

        Ok(Node::new(BackendProperty { name, value }, meta))
    }
}
