//! Statement and declaration formatting
//!
//! Every method returns an owned `String`; nothing is written through
//! shared state. A statement renders as its leading comments (one per
//! line), the indented statement text, infix comments before the
//! terminator, the terminator, and trailing comments on the same line.

use vclkit_core::StyleConfig;
use vclkit_syntax::parser::ast::*;

/// Renders AST nodes under a style configuration
pub struct Formatter<'a> {
    pub(crate) conf: &'a StyleConfig,
}

impl<'a> Formatter<'a> {
    pub fn new(conf: &'a StyleConfig) -> Self {
        Self { conf }
    }

    /// Render a whole file. Top-level declarations are separated from
    /// their neighbours by a blank line.
    pub fn format_program(&self, program: &Program) -> String {
        let mut buf = String::new();

        for (i, statement) in program.statements.iter().enumerate() {
            if i > 0 {
                let previous = &program.statements[i - 1];
                if statement.is_declaration() || previous.is_declaration() {
                    buf.push_str("\n\n");
                } else {
                    buf.push('\n');
                }
            }
            buf.push_str(&self.format_statement(statement));
        }
        if !program.statements.is_empty() {
            buf.push('\n');
        }
        buf.push_str(&self.comment_lines(&program.meta.infix, 0));

        buf
    }

    pub fn format_statement(&self, statement: &Statement) -> String {
        match statement {
            Statement::Subroutine(n) => self.format_subroutine(n),
            Statement::Acl(n) => self.format_acl(n),
            Statement::Table(n) => self.format_table(n),
            Statement::Backend(n) => self.format_backend(n),
            Statement::Block(n) => self.format_block(n, true),
            Statement::Import(n) => self.simple(&n.meta, format!("import {}", self.ident(&n.inner.name))),
            Statement::Include(n) => {
                self.simple(&n.meta, format!("include {}", self.string(&n.inner.module)))
            }
            Statement::Declare(n) => self.simple(
                &n.meta,
                format!(
                    "declare local {} {}",
                    self.ident(&n.inner.name),
                    self.ident(&n.inner.value_type)
                ),
            ),
            Statement::Set(n) => self.format_assign("set", n),
            Statement::Add(n) => self.format_assign("add", n),
            Statement::Unset(n) => self.simple(&n.meta, format!("unset {}", self.ident(&n.inner.target))),
            Statement::Remove(n) => self.simple(&n.meta, format!("remove {}", self.ident(&n.inner.target))),
            Statement::If(n) => self.format_if(n),
            Statement::Switch(n) => self.format_switch(n),
            Statement::Restart(n) => self.simple(&n.meta, "restart".to_string()),
            Statement::Esi(n) => self.simple(&n.meta, "esi".to_string()),
            Statement::Call(n) => self.simple(&n.meta, format!("call {}", self.ident(&n.inner.subroutine))),
            Statement::Error(n) => {
                let mut text = format!("error {}", self.format_expression(&n.inner.code));
                if let Some(argument) = &n.inner.argument {
                    text.push(' ');
                    text.push_str(&self.format_expression(argument));
                }
                self.simple(&n.meta, text)
            }
            Statement::Log(n) => self.simple(&n.meta, format!("log {}", self.format_expression(&n.inner.value))),
            Statement::Return(n) => self.format_return(n),
            Statement::Synthetic(n) => {
                self.simple(&n.meta, format!("synthetic {}", self.format_expression(&n.inner.value)))
            }
            Statement::SyntheticBase64(n) => self.simple(
                &n.meta,
                format!("synthetic.base64 {}", self.format_expression(&n.inner.value)),
            ),
            Statement::Goto(n) => self.simple(&n.meta, format!("goto {}", self.ident(&n.inner.destination))),
            Statement::GotoLabel(n) => self.terminated(&n.meta, n.inner.name.clone(), ":"),
            Statement::FunctionCall(n) => {
                let text = format!(
                    "{}({})",
                    self.ident(&n.inner.function),
                    self.arguments(&n.inner.arguments)
                );
                self.simple(&n.meta, text)
            }
        }
    }

    // ========================================
    // Statements
    // ========================================

    /// Block statement. Braces sit one level shallower than the
    /// statements inside; an independent block also renders its own
    /// leading comments and indent.
    pub(crate) fn format_block(&self, block: &Node<BlockStatement>, independent: bool) -> String {
        let nest = block.meta.nest;
        assert!(nest > 0, "block statement must record the depth of its contents");
        let mut buf = String::new();

        if independent {
            buf.push_str(&self.comment_lines(&block.meta.leading, nest - 1));
            buf.push_str(&self.indent(nest - 1));
        }
        buf.push_str("{\n");
        for statement in &block.inner.statements {
            buf.push_str(&self.format_statement(statement));
            buf.push('\n');
        }
        buf.push_str(&self.comment_lines(&block.meta.infix, nest));
        buf.push_str(&self.indent(nest - 1));
        buf.push('}');
        buf.push_str(&self.trailing(&block.meta.trailing));

        buf
    }

    fn format_assign(&self, keyword: &str, node: &Node<AssignStatement>) -> String {
        let text = format!(
            "{} {} {} {}",
            keyword,
            self.ident(&node.inner.target),
            node.inner.operator,
            self.format_expression(&node.inner.value)
        );
        self.simple(&node.meta, text)
    }

    fn format_if(&self, node: &Node<IfStatement>) -> String {
        let stmt = &node.inner;
        let mut buf = self.comment_lines(&node.meta.leading, node.meta.nest);
        buf.push_str(&self.indent(node.meta.nest));
        buf.push_str(&format!("if ({}) ", self.format_expression(&stmt.condition)));
        buf.push_str(&self.format_block(&stmt.consequence, false));

        for branch in &stmt.another {
            buf.push_str(&self.branch_separator(&branch.meta));
            let keyword = if self.conf.else_if {
                ElseIfKeyword::ElseIf.as_str()
            } else {
                branch.inner.keyword.as_str()
            };
            buf.push_str(&format!(
                "{} ({}) ",
                keyword,
                self.format_expression(&branch.inner.condition)
            ));
            buf.push_str(&self.format_block(&branch.inner.consequence, false));
        }

        if let Some(alternative) = &stmt.alternative {
            buf.push_str(&self.branch_separator(&alternative.meta));
            buf.push_str("else");
            buf.push_str(&self.inline(&alternative.meta.infix, alternative.meta.nest));
            separate(&mut buf);
            buf.push_str(&self.format_block(&alternative.inner.consequence, false));
        }

        buf.push_str(&self.trailing(&node.meta.trailing));
        buf
    }

    /// A branch with leading comments starts on its own line after them;
    /// otherwise it follows the previous `}` after one space.
    fn branch_separator(&self, meta: &Meta) -> String {
        if meta.leading.is_empty() {
            return " ".to_string();
        }
        let mut buf = String::from("\n");
        buf.push_str(&self.comment_lines(&meta.leading, meta.nest));
        buf.push_str(&self.indent(meta.nest));
        buf
    }

    fn format_switch(&self, node: &Node<SwitchStatement>) -> String {
        let nest = node.meta.nest;
        let mut buf = self.comment_lines(&node.meta.leading, nest);
        buf.push_str(&self.indent(nest));
        buf.push_str(&format!("switch ({}) {{\n", self.format_expression(&node.inner.control)));

        for case in &node.inner.cases {
            buf.push_str(&self.format_case(case));
        }

        buf.push_str(&self.comment_lines(&node.meta.infix, nest));
        buf.push_str(&self.indent(nest));
        buf.push('}');
        buf.push_str(&self.trailing(&node.meta.trailing));
        buf
    }

    fn format_case(&self, node: &Node<SwitchCase>) -> String {
        let case = &node.inner;
        assert!(
            !(case.is_break && case.fallthrough),
            "switch case cannot both break and fall through"
        );

        let label = match &case.test {
            Some(test) => {
                let operator = match test.operator {
                    CaseOperator::Equal => "",
                    CaseOperator::Match => "~ ",
                };
                format!("case {}{}", operator, self.format_expression(&test.value))
            }
            None => "default".to_string(),
        };
        let mut buf = self.terminated(&node.meta, label, ":");
        buf.push('\n');

        for statement in &case.statements {
            buf.push_str(&self.format_statement(statement));
            buf.push('\n');
        }

        let keyword = if case.is_break {
            Some("break")
        } else if case.fallthrough {
            Some("fallthrough")
        } else {
            None
        };
        if let Some(keyword) = keyword {
            buf.push_str(&self.simple(&case.terminator, keyword.to_string()));
            buf.push('\n');
        }

        buf
    }

    fn format_return(&self, node: &Node<ReturnStatement>) -> String {
        let mut text = String::from("return");
        if let Some(value) = &node.inner.value {
            let value = self.format_expression(value);
            if self.conf.return_argument_parenthesis || node.inner.parenthesized {
                text.push_str(&format!(" ({})", value));
            } else {
                text.push(' ');
                text.push_str(&value);
            }
        }
        self.simple(&node.meta, text)
    }

    // ========================================
    // Declarations
    // ========================================

    fn format_subroutine(&self, node: &Node<SubroutineDeclaration>) -> String {
        let sub = &node.inner;
        let mut buf = self.comment_lines(&node.meta.leading, node.meta.nest);
        buf.push_str(&self.indent(node.meta.nest));
        buf.push_str("sub ");
        buf.push_str(&self.ident(&sub.name));
        if let Some(return_type) = &sub.return_type {
            separate(&mut buf);
            buf.push_str(&self.ident(return_type));
        }
        separate(&mut buf);
        buf.push_str(&self.format_block(&sub.block, false));
        buf.push_str(&self.trailing(&node.meta.trailing));
        buf
    }

    fn format_acl(&self, node: &Node<AclDeclaration>) -> String {
        let nest = node.meta.nest;
        let mut buf = self.comment_lines(&node.meta.leading, nest);
        buf.push_str(&self.indent(nest));
        buf.push_str("acl ");
        buf.push_str(&self.ident(&node.inner.name));
        separate(&mut buf);
        buf.push_str("{\n");

        for entry in &node.inner.entries {
            let mut text = String::new();
            if entry.inner.inverse {
                text.push('!');
            }
            text.push_str(&self.string(&entry.inner.ip));
            if let Some(mask) = entry.inner.mask {
                text.push_str(&format!("/{}", mask));
            }
            buf.push_str(&self.simple(&entry.meta, text));
            buf.push('\n');
        }

        buf.push_str(&self.close_declaration(&node.meta));
        buf
    }

    fn format_table(&self, node: &Node<TableDeclaration>) -> String {
        let table = &node.inner;
        let nest = node.meta.nest;
        let mut buf = self.comment_lines(&node.meta.leading, nest);
        buf.push_str(&self.indent(nest));
        buf.push_str("table ");
        buf.push_str(&self.ident(&table.name));
        if let Some(value_type) = &table.value_type {
            separate(&mut buf);
            buf.push_str(&self.ident(value_type));
        }
        separate(&mut buf);
        buf.push_str("{\n");

        for property in &table.properties {
            let text = format!(
                "{}: {}",
                self.string(&property.inner.key),
                self.format_expression(&property.inner.value)
            );
            buf.push_str(&self.terminated(&property.meta, text, ","));
            buf.push('\n');
        }

        buf.push_str(&self.close_declaration(&node.meta));
        buf
    }

    fn format_backend(&self, node: &Node<BackendDeclaration>) -> String {
        let nest = node.meta.nest;
        let mut buf = self.comment_lines(&node.meta.leading, nest);
        buf.push_str(&self.indent(nest));
        buf.push_str("backend ");
        buf.push_str(&self.ident(&node.inner.name));
        separate(&mut buf);
        buf.push_str("{\n");
        buf.push_str(&self.backend_properties(&node.inner.properties));
        buf.push_str(&self.close_declaration(&node.meta));
        buf
    }

    fn backend_properties(&self, properties: &[Node<BackendProperty>]) -> String {
        let mut buf = String::new();
        for property in properties {
            let name = format!(".{} = ", self.ident(&property.inner.name));
            match &property.inner.value {
                BackendValue::Expression(value) => {
                    let text = format!("{}{}", name, self.format_expression(value));
                    buf.push_str(&self.simple(&property.meta, text));
                }
                BackendValue::Object(nested) => {
                    let nest = property.meta.nest;
                    buf.push_str(&self.comment_lines(&property.meta.leading, nest));
                    buf.push_str(&self.indent(nest));
                    buf.push_str(&name);
                    buf.push_str("{\n");
                    buf.push_str(&self.backend_properties(nested));
                    buf.push_str(&self.close_declaration(&property.meta));
                }
            }
            buf.push('\n');
        }
        buf
    }

    /// Infix comments, then `}` and trailing comments
    fn close_declaration(&self, meta: &Meta) -> String {
        let mut buf = self.comment_lines(&meta.infix, meta.nest + 1);
        buf.push_str(&self.indent(meta.nest));
        buf.push('}');
        buf.push_str(&self.trailing(&meta.trailing));
        buf
    }

    // ========================================
    // Comments and layout
    // ========================================

    /// `text;` with the node's comments around it
    fn simple(&self, meta: &Meta, text: String) -> String {
        self.terminated(meta, text, ";")
    }

    fn terminated(&self, meta: &Meta, text: String, terminator: &str) -> String {
        let mut buf = self.comment_lines(&meta.leading, meta.nest);
        buf.push_str(&self.indent(meta.nest));
        buf.push_str(&text);
        buf.push_str(&self.inline(&meta.infix, meta.nest));
        buf.push_str(terminator);
        buf.push_str(&self.trailing(&meta.trailing));
        buf
    }

    /// One comment per line at `nest`
    pub(crate) fn comment_lines(&self, comments: &[Comment], nest: usize) -> String {
        let indent = self.indent(nest);
        comments
            .iter()
            .map(|comment| format!("{}{}\n", indent, comment))
            .collect()
    }

    /// Comments after a terminator; the line always ends after them.
    pub(crate) fn trailing(&self, comments: &[Comment]) -> String {
        comments.iter().map(|comment| format!(" {}", comment)).collect()
    }

    /// Comments inside a line, each preceded by a space. A line comment
    /// ends the line, so the text after it continues on a new one.
    pub(crate) fn inline(&self, comments: &[Comment], nest: usize) -> String {
        let mut buf = String::new();
        for comment in comments {
            buf.push(' ');
            buf.push_str(&comment.value);
            if comment.is_line_comment() {
                buf.push('\n');
                buf.push_str(&self.indent(nest));
            }
        }
        buf
    }

    pub(crate) fn indent(&self, nest: usize) -> String {
        self.conf.indent(nest)
    }
}

/// Single space between two words, unless a line comment already ended
/// the line and the indent is in place.
fn separate(buf: &mut String) {
    if !buf.ends_with(char::is_whitespace) {
        buf.push(' ');
    }
}
