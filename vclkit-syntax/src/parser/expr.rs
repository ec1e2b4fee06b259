//! Expression parsing
//!
//! Pratt parser over the precedence table
//! `||` < `&&` < equality/match < relational < `+` (explicit or by
//! juxtaposition) < prefix. All infix operators are left-associative.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parser::{ParseResult, Parser};

/// Binding power of prefix operators
const PREFIX_BP: u8 = 11;

/// Infix operator the token starts, whether it is written out, and its
/// (left, right) binding power.
fn infix_binding_power(token: &Token) -> Option<(InfixOperator, bool, (u8, u8))> {
    let (operator, explicit) = match token {
        Token::Or => (InfixOperator::Or, true),
        Token::And => (InfixOperator::And, true),
        Token::Equal => (InfixOperator::Equal, true),
        Token::NotEqual => (InfixOperator::NotEqual, true),
        Token::Match => (InfixOperator::Match, true),
        Token::NotMatch => (InfixOperator::NotMatch, true),
        Token::LessThan => (InfixOperator::LessThan, true),
        Token::LessThanEqual => (InfixOperator::LessThanEqual, true),
        Token::GreaterThan => (InfixOperator::GreaterThan, true),
        Token::GreaterThanEqual => (InfixOperator::GreaterThanEqual, true),
        Token::Plus => (InfixOperator::Plus, true),
        // string-producing operands concatenate by juxtaposition
        Token::String(_) | Token::LongString(_) | Token::Ident(_) | Token::If => {
            (InfixOperator::Plus, false)
        }
        _ => return None,
    };
    let bp = match operator {
        InfixOperator::Or => (1, 2),
        InfixOperator::And => (3, 4),
        InfixOperator::Equal
        | InfixOperator::NotEqual
        | InfixOperator::Match
        | InfixOperator::NotMatch => (5, 6),
        InfixOperator::LessThan
        | InfixOperator::LessThanEqual
        | InfixOperator::GreaterThan
        | InfixOperator::GreaterThanEqual => (7, 8),
        InfixOperator::Plus => (9, 10),
    };
    Some((operator, explicit, bp))
}

impl Parser {
    /// Parses any expression.
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_expression_bp(0)
    }

    fn parse_expression_bp(&mut self, min_bp: u8) -> ParseResult<Expression> {
        let mut left = self.parse_prefix()?;

        loop {
            let Some((operator, explicit, (l_bp, r_bp))) = infix_binding_power(self.peek()) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }

            let position = left.meta().position;
            if explicit {
                // comments before an operator stay with the left operand
                left.meta_mut().trailing.extend(self.take_leading());
                self.advance();
            }
            let right = self.parse_expression_bp(r_bp)?;

            left = Expression::Infix(Node::new(
                InfixExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                    explicit,
                },
                self.meta_at(position),
            ));
        }

        Ok(left)
    }

    /// Primary expression or prefix operation. Takes the comments in
    /// front of it as leading.
    pub(super) fn parse_prefix(&mut self) -> ParseResult<Expression> {
        let leading = self.take_leading();
        let meta = self.meta().with_leading(leading);

        let expression = match self.peek().clone() {
            Token::Ident(value) => {
                self.advance();
                if self.check(&Token::ParenOpen) {
                    self.parse_function_call(Node::new(Ident { value }, meta))?
                } else {
                    Expression::Ident(Node::new(Ident { value }, meta))
                }
            }
            Token::String(value) => {
                self.advance();
                Expression::String(Node::new(StringLiteral { value, long: false }, meta))
            }
            Token::LongString(value) => {
                self.advance();
                Expression::String(Node::new(StringLiteral { value, long: true }, meta))
            }
            Token::Integer(value) => {
                self.advance();
                Expression::Integer(Node::new(IntegerLiteral { value }, meta))
            }
            Token::Float(literal) => {
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| self.invalid("invalid float literal"))?;
                self.advance();
                Expression::Float(Node::new(FloatLiteral { value, literal }, meta))
            }
            Token::RTime(value) => {
                self.advance();
                Expression::RTime(Node::new(RTimeLiteral { value }, meta))
            }
            Token::True | Token::False => {
                let value = self.advance() == Token::True;
                Expression::Bool(Node::new(BoolLiteral { value }, meta))
            }
            Token::Bang | Token::Minus | Token::Plus => {
                let operator = match self.advance() {
                    Token::Bang => PrefixOperator::Not,
                    Token::Minus => PrefixOperator::Minus,
                    _ => PrefixOperator::Plus,
                };
                let right = self.parse_expression_bp(PREFIX_BP)?;
                Expression::Prefix(Node::new(
                    PrefixExpression {
                        operator,
                        right: Box::new(right),
                    },
                    meta,
                ))
            }
            Token::ParenOpen => {
                self.advance();
                let mut right = self.parse_expression()?;
                right.meta_mut().trailing.extend(self.take_leading());
                self.expect(Token::ParenClose)?;
                Expression::Group(Node::new(
                    GroupExpression {
                        right: Box::new(right),
                    },
                    meta,
                ))
            }
            Token::If => self.parse_if_expression(meta)?,
            token => match token.keyword_as_ident() {
                Some(value) => {
                    self.advance();
                    Expression::Ident(Node::new(
                        Ident {
                            value: value.to_string(),
                        },
                        meta,
                    ))
                }
                None => return Err(self.unexpected("expression")),
            },
        };

        Ok(expression)
    }

    /// `if(condition, consequence, alternative)`
    fn parse_if_expression(&mut self, meta: Meta) -> ParseResult<Expression> {
        self.advance();
        self.expect(Token::ParenOpen)?;

        let mut condition = self.parse_expression()?;
        condition.meta_mut().trailing.extend(self.take_leading());
        self.expect(Token::Comma)?;

        let mut consequence = self.parse_expression()?;
        consequence.meta_mut().trailing.extend(self.take_leading());
        self.expect(Token::Comma)?;

        let mut alternative = self.parse_expression()?;
        alternative.meta_mut().trailing.extend(self.take_leading());
        self.expect(Token::ParenClose)?;

        Ok(Expression::If(Node::new(
            IfExpression {
                condition: Box::new(condition),
                consequence: Box::new(consequence),
                alternative: Box::new(alternative),
            },
            meta,
        )))
    }

    fn parse_function_call(&mut self, mut function: Node<Ident>) -> ParseResult<Expression> {
        let leading = std::mem::take(&mut function.meta.leading);
        let mut meta = self.meta_at(function.meta.position).with_leading(leading);
        function.meta.trailing.extend(self.take_leading());
        let (arguments, dangling) = self.parse_arguments()?;
        meta.infix = dangling;
        Ok(Expression::FunctionCall(Node::new(
            FunctionCallExpression {
                function,
                arguments,
            },
            meta,
        )))
    }

    /// `( [argument {, argument}] )`
    ///
    /// Returns the arguments and the comments inside an empty list.
    pub(super) fn parse_arguments(&mut self) -> ParseResult<(Vec<Expression>, Comments)> {
        self.expect(Token::ParenOpen)?;
        let mut arguments = Vec::new();

        if self.check(&Token::ParenClose) {
            let dangling = self.take_leading();
            self.advance();
            return Ok((arguments, dangling));
        }

        loop {
            let mut argument = self.parse_expression()?;
            argument.meta_mut().trailing.extend(self.take_leading());
            arguments.push(argument);

            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                Token::ParenClose => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("`,` or `)`")),
            }
        }

        Ok((arguments, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parser::{parse, ParseError};

    /// Parse `source` as the value of a `set` inside a subroutine
    fn expr(source: &str) -> Expression {
        let wrapped = format!("sub vcl_recv {{\n  set req.http.Foo = {source};\n}}");
        let program = parse(&wrapped).unwrap();
        let Statement::Subroutine(sub) = &program.statements[0] else {
            panic!("expected subroutine");
        };
        let Statement::Set(set) = &sub.inner.block.inner.statements[0] else {
            panic!("expected set");
        };
        set.inner.value.clone()
    }

    fn ident(expression: &Expression) -> &str {
        match expression {
            Expression::Ident(i) => &i.inner.value,
            other => panic!("expected identifier, got {other:?}"),
        }
    }

    fn string(expression: &Expression) -> &str {
        match expression {
            Expression::String(s) => &s.inner.value,
            other => panic!("expected string, got {other:?}"),
        }
    }

    fn infix(expression: &Expression) -> &InfixExpression {
        match expression {
            Expression::Infix(i) => &i.inner,
            other => panic!("expected infix expression, got {other:?}"),
        }
    }

    #[test]
    fn test_literals() {
        assert!(matches!(expr("10"), Expression::Integer(i) if i.inner.value == 10));
        assert!(matches!(expr("1.50"), Expression::Float(f) if f.inner.literal == "1.50"));
        assert!(matches!(expr("10s"), Expression::RTime(r) if r.inner.value == "10s"));
        assert!(matches!(expr("true"), Expression::Bool(b) if b.inner.value));
        assert!(matches!(
            expr("{\"long\"}"),
            Expression::String(s) if s.inner.long && s.inner.value == "long"
        ));
    }

    #[test]
    fn test_if_expression() {
        let value = expr(r#"if (req.http.Host, "example.com", "foobar")"#);
        let Expression::If(node) = value else {
            panic!("expected if expression");
        };
        assert_eq!(ident(&node.inner.condition), "req.http.Host");
        assert_eq!(string(&node.inner.consequence), "example.com");
        assert_eq!(string(&node.inner.alternative), "foobar");
    }

    #[test]
    fn test_if_expression_in_concatenation() {
        let program = parse(
            "sub vcl_recv {\n  log {\"foo bar\"} if (req.http.Host, \"example.com\", \"foobar\") {\"baz\"};\n}",
        )
        .unwrap();
        let Statement::Subroutine(sub) = &program.statements[0] else {
            panic!("expected subroutine");
        };
        let Statement::Log(log) = &sub.inner.block.inner.statements[0] else {
            panic!("expected log");
        };

        let outer = infix(&log.inner.value);
        assert_eq!(outer.operator, InfixOperator::Plus);
        assert!(!outer.explicit);
        assert_eq!(string(&outer.right), "baz");

        let inner = infix(&outer.left);
        assert_eq!(string(&inner.left), "foo bar");
        assert!(matches!(inner.right.as_ref(), Expression::If(_)));
    }

    #[test]
    fn test_juxtaposition_is_left_associative() {
        let value = expr(r#""a" "b" "c""#);
        let outer = infix(&value);
        assert_eq!(string(&outer.right), "c");
        let inner = infix(&outer.left);
        assert_eq!(string(&inner.left), "a");
        assert_eq!(string(&inner.right), "b");
    }

    #[test]
    fn test_explicit_plus() {
        let value = expr(r#"req.http.A + "-" req.http.B"#);
        let outer = infix(&value);
        assert!(!outer.explicit);
        assert!(infix(&outer.left).explicit);
    }

    #[test]
    fn test_precedence() {
        let value = expr("req.http.A || req.http.B && req.http.C == \"x\"");
        let or = infix(&value);
        assert_eq!(or.operator, InfixOperator::Or);
        let and = infix(&or.right);
        assert_eq!(and.operator, InfixOperator::And);
        assert_eq!(infix(&and.right).operator, InfixOperator::Equal);

        let value = expr("a == b == c");
        let outer = infix(&value);
        assert_eq!(infix(&outer.left).operator, InfixOperator::Equal);
        assert_eq!(ident(&outer.right), "c");
    }

    #[test]
    fn test_prefix_binds_tighter_than_infix() {
        let value = expr("!req.http.A && req.http.B");
        let and = infix(&value);
        assert!(matches!(
            and.left.as_ref(),
            Expression::Prefix(p) if p.inner.operator == PrefixOperator::Not
        ));
    }

    #[test]
    fn test_group() {
        let value = expr("!(req.http.A || req.http.B)");
        let Expression::Prefix(prefix) = value else {
            panic!("expected prefix");
        };
        assert!(matches!(prefix.inner.right.as_ref(), Expression::Group(_)));
    }

    #[test]
    fn test_function_calls() {
        let Expression::FunctionCall(call) = expr("uuid.version4()") else {
            panic!("expected call");
        };
        assert_eq!(call.inner.function.inner.value, "uuid.version4");
        assert!(call.inner.arguments.is_empty());

        let Expression::FunctionCall(call) = expr(r#"regsub(req.http.Host, "example.com", "")"#) else {
            panic!("expected call");
        };
        assert_eq!(call.inner.function.inner.value, "regsub");
        assert_eq!(call.inner.arguments.len(), 3);
        assert_eq!(ident(&call.inner.arguments[0]), "req.http.Host");
        assert_eq!(string(&call.inner.arguments[1]), "example.com");
        assert_eq!(string(&call.inner.arguments[2]), "");
    }

    #[test]
    fn test_comment_in_if_condition() {
        let program = parse(
            "sub vcl_recv {\n  if (req.http.Foo && /* comment */ req.http.Bar) {\n    esi;\n  }\n}",
        )
        .unwrap();
        let Statement::Subroutine(sub) = &program.statements[0] else {
            panic!("expected subroutine");
        };
        let Statement::If(stmt) = &sub.inner.block.inner.statements[0] else {
            panic!("expected if");
        };
        let and = infix(&stmt.inner.condition);
        assert_eq!(and.right.meta().leading, vec![Comment::new("/* comment */")]);
    }

    #[test]
    fn test_comment_before_operator_is_trailing() {
        let value = expr("req.http.A /* a */ && req.http.B");
        let and = infix(&value);
        assert_eq!(and.left.meta().trailing, vec![Comment::new("/* a */")]);
    }

    #[test]
    fn test_trailing_comma_is_rejected() {
        let err = parse("sub vcl_recv {\n  set req.http.A = regsub(req.http.B, \"x\",);\n}").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { line: 2, .. }));
    }

    #[test]
    fn test_unmatched_parenthesis() {
        let err = parse("sub vcl_recv {\n  set req.http.A = (req.http.B;\n}").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref expected, .. } if expected == "`)`"));
    }

    #[test]
    fn test_unknown_prefix() {
        let err = parse("sub vcl_recv {\n  set req.http.A = ;\n}").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref expected, .. } if expected == "expression"));
    }
}
