//! Expression formatting
//!
//! Expressions render on one line. Leading comments go right before the
//! expression and trailing comments right after it; a line comment moves
//! whatever follows to the next line.

use crate::formatter::Formatter;
use vclkit_syntax::parser::ast::*;

impl Formatter<'_> {
    pub fn format_expression(&self, expression: &Expression) -> String {
        let body = match expression {
            Expression::Ident(n) => n.inner.value.clone(),
            Expression::String(n) => quote(&n.inner),
            Expression::Integer(n) => n.inner.value.to_string(),
            Expression::Float(n) => n.inner.literal.clone(),
            Expression::Bool(n) => n.inner.value.to_string(),
            Expression::RTime(n) => n.inner.value.clone(),
            Expression::Prefix(n) => {
                format!("{}{}", n.inner.operator, self.format_expression(&n.inner.right))
            }
            Expression::Infix(n) => {
                let left = self.format_expression(&n.inner.left);
                let right = self.format_expression(&n.inner.right);
                if n.inner.explicit {
                    format!("{} {} {}", left, n.inner.operator, right)
                } else {
                    format!("{} {}", left, right)
                }
            }
            Expression::Group(n) => format!("({})", self.format_expression(&n.inner.right)),
            Expression::If(n) => format!(
                "if ({}, {}, {})",
                self.format_expression(&n.inner.condition),
                self.format_expression(&n.inner.consequence),
                self.format_expression(&n.inner.alternative)
            ),
            Expression::FunctionCall(n) => format!(
                "{}({}{})",
                self.ident(&n.inner.function),
                self.arguments(&n.inner.arguments),
                self.inline(&n.meta.infix, n.meta.nest)
            ),
        };
        self.with_comments(expression.meta(), body)
    }

    /// Comma separated, on one line
    pub(crate) fn arguments(&self, arguments: &[Expression]) -> String {
        arguments
            .iter()
            .map(|argument| self.format_expression(argument))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn ident(&self, ident: &Node<Ident>) -> String {
        self.with_comments(&ident.meta, ident.inner.value.clone())
    }

    pub(crate) fn string(&self, string: &Node<StringLiteral>) -> String {
        self.with_comments(&string.meta, quote(&string.inner))
    }

    fn with_comments(&self, meta: &Meta, body: String) -> String {
        let mut buf = String::new();
        for comment in &meta.leading {
            buf.push_str(&comment.value);
            if comment.is_line_comment() {
                buf.push('\n');
                buf.push_str(&self.indent(meta.nest));
            } else {
                buf.push(' ');
            }
        }
        buf.push_str(&body);
        buf.push_str(&self.inline(&meta.trailing, meta.nest));
        buf
    }
}

fn quote(string: &StringLiteral) -> String {
    if string.long {
        format!("{{\"{}\"}}", string.value)
    } else {
        format!("\"{}\"", string.value)
    }
}

#[cfg(test)]
mod tests {
    use crate::format_source;
    use vclkit_core::StyleConfig;

    fn fmt(source: &str) -> String {
        format_source(source, &StyleConfig::default()).unwrap()
    }

    #[test]
    fn test_if_expression() {
        let source = "set req.http.Foo = if (req.http.Host, \"example.com\", \"foobar\");\n";
        assert_eq!(fmt(source), source);
        assert_eq!(
            fmt("set req.http.Foo = if(req.http.Host,\"example.com\",\"foobar\");"),
            source
        );
    }

    #[test]
    fn test_concatenation_keeps_spelling() {
        let source = "log {\"foo bar\"} if (req.http.Host, \"example.com\", \"foobar\") {\"baz\"};\n";
        assert_eq!(fmt(source), source);
        assert_eq!(
            fmt("set req.http.A = req.http.B+\"x\"  req.http.C;"),
            "set req.http.A = req.http.B + \"x\" req.http.C;\n"
        );
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(
            fmt("set req.http.A = uuid.version4( );"),
            "set req.http.A = uuid.version4();\n"
        );
        assert_eq!(
            fmt("set req.http.A = regsub(req.http.Host,\"example.com\",\"\");"),
            "set req.http.A = regsub(req.http.Host, \"example.com\", \"\");\n"
        );
        assert_eq!(
            fmt("h2.push( \"/a.css\" );"),
            "h2.push(\"/a.css\");\n"
        );
    }

    #[test]
    fn test_operators_and_literals() {
        assert_eq!(
            fmt("if(!req.http.A&&(req.http.B~\"^x\"||req.http.C!=\"y\")){esi;}"),
            "if (!req.http.A && (req.http.B ~ \"^x\" || req.http.C != \"y\")) {\n  esi;\n}\n"
        );
        assert_eq!(
            fmt("set beresp.ttl = 1.50s; set var.f = 1.50; set var.n = -1; set var.b = true;"),
            "set beresp.ttl = 1.50s;\nset var.f = 1.50;\nset var.n = -1;\nset var.b = true;\n"
        );
    }

    #[test]
    fn test_expression_comments() {
        assert_eq!(
            fmt("if (req.http.Foo && /* comment */ req.http.Bar) { esi; }"),
            "if (req.http.Foo && /* comment */ req.http.Bar) {\n  esi;\n}\n"
        );
        assert_eq!(
            fmt("set req.http.A = req.http.B /* b */ + \"c\";"),
            "set req.http.A = req.http.B /* b */ + \"c\";\n"
        );
        assert_eq!(
            fmt("set req.http.A = foo(/* none */);"),
            "set req.http.A = foo( /* none */);\n"
        );
    }

    #[test]
    fn test_line_comment_inside_expression() {
        let source = "sub vcl_recv {\n  if (req.http.A // first\n    && req.http.B) {\n    esi;\n  }\n}\n";
        let once = fmt(source);
        assert_eq!(
            once,
            "sub vcl_recv {\n  if (req.http.A // first\n   && req.http.B) {\n    esi;\n  }\n}\n"
        );
        assert_eq!(fmt(&once), once);
    }
}
