//! Lexer for VCL
//!
//! Tokenizes VCL source text.
//!
//! Key features:
//! - Comments (`//`, `#`, `/* */`) are real tokens, not skipped, so the
//!   parser can attach them to nodes
//! - `{"..."}` long strings are a single token and keep embedded newlines
//! - Identifiers may contain dots, hyphens and one `:` subfield
//!   (`req.http.Cookie:session`)

use logos::{Lexer, Logos, Span};
use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// Byte range of a token in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

impl From<Span> for Location {
    fn from(span: Span) -> Self {
        Self {
            start: span.start,
            end: span.end,
        }
    }
}

impl From<Location> for Range<usize> {
    fn from(location: Location) -> Self {
        location.start..location.end
    }
}

/// 1-based line and column of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A token with its location in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Location,
    pub position: Position,
    /// Line on which the token ends; differs from `position.line` for
    /// long strings and block comments.
    pub end_line: usize,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: impl Into<Location>, index: &LineIndex) -> Self {
        let span = span.into();
        let position = index.position(span.start);
        let end_line = index.position(span.end.saturating_sub(1).max(span.start)).line;
        Self {
            value,
            span,
            position,
            end_line,
        }
    }
}

/// Maps byte offsets to line/column pairs
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    pub fn position(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line - 1,
        };
        Position {
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }
}

/// Failure reasons reported by token callbacks
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LexErrorKind {
    #[default]
    UnexpectedChar,
    UnterminatedLongString,
    UnterminatedComment,
    InvalidNumber,
}

/// Token types for VCL
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(error = LexErrorKind)]
pub enum Token {
    // ============================================================
    // Comments
    // ============================================================
    #[regex(r"//[^\n]*", |lex| lex.slice().trim_end().to_string())]
    #[regex(r"#[^\n]*", |lex| lex.slice().trim_end().to_string())]
    LineComment(String),

    #[token("/*", block_comment)]
    BlockComment(String),

    // ============================================================
    // Keywords
    // ============================================================
    #[token("sub")]
    Sub,
    #[token("acl")]
    Acl,
    #[token("table")]
    Table,
    #[token("backend")]
    Backend,
    #[token("import")]
    Import,
    #[token("include")]
    Include,
    #[token("declare")]
    Declare,
    #[token("local")]
    Local,
    #[token("set")]
    Set,
    #[token("add")]
    Add,
    #[token("unset")]
    Unset,
    #[token("remove")]
    Remove,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("elseif")]
    ElseIf,
    #[token("elsif")]
    Elsif,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("break")]
    Break,
    #[token("fallthrough")]
    Fallthrough,
    #[token("restart")]
    Restart,
    #[token("esi")]
    Esi,
    #[token("call")]
    Call,
    #[token("error")]
    Error,
    #[token("log")]
    Log,
    #[token("return")]
    Return,
    #[token("synthetic")]
    Synthetic,
    #[token("synthetic.base64")]
    SyntheticBase64,
    #[token("goto")]
    Goto,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // ============================================================
    // Values
    // ============================================================
    /// Quoted string literal: "..." (quotes removed, no escapes in VCL)
    #[regex(r#""[^"\n]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    String(String),

    /// Long string literal: {"..."}
    #[token("{\"", long_string)]
    LongString(String),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().map_err(|_| LexErrorKind::InvalidNumber))]
    Integer(i64),

    /// Float literal, kept as written
    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().to_string())]
    Float(String),

    /// Relative time literal: 10s, 1.5m, 100ms
    #[regex(r"[0-9]+(\.[0-9]+)?(ms|s|m|h|d|y)", |lex| lex.slice().to_string())]
    RTime(String),

    /// Identifier, with an optional `:subfield` (`req.http.Cookie:session`)
    #[regex(r"[A-Za-z_][A-Za-z0-9_.\-]*", ident)]
    Ident(String),

    // ============================================================
    // Operators
    // ============================================================
    #[token("=")]
    Assign,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubtractAssign,
    #[token("*=")]
    MultiplyAssign,
    #[token("/=")]
    DivideAssign,
    #[token("%=")]
    RemainderAssign,
    #[token("|=")]
    BitwiseOrAssign,
    #[token("&=")]
    BitwiseAndAssign,
    #[token("^=")]
    BitwiseXorAssign,
    #[token("<<=")]
    LeftShiftAssign,
    #[token(">>=")]
    RightShiftAssign,
    #[token("&&=")]
    LogicalAndAssign,
    #[token("||=")]
    LogicalOrAssign,

    #[token("==")]
    Equal,
    #[token("!=")]
    NotEqual,
    #[token("~")]
    Match,
    #[token("!~")]
    NotMatch,
    #[token("<")]
    LessThan,
    #[token("<=")]
    LessThanEqual,
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterThanEqual,
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("!")]
    Bang,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("/")]
    Slash,

    // ============================================================
    // Structural
    // ============================================================
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    /// Only generated by the comment collector after the last token.
    Eof,
}

fn block_comment(lex: &mut Lexer<Token>) -> Result<String, LexErrorKind> {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Ok(lex.slice().to_string())
        }
        None => {
            lex.bump(rest.len());
            Err(LexErrorKind::UnterminatedComment)
        }
    }
}

/// Extends an identifier over a `:subfield` suffix. Keywords never reach
/// this callback, so `default:` stays a keyword followed by `:`.
fn ident(lex: &mut Lexer<Token>) -> String {
    if let Some(field) = lex.remainder().strip_prefix(':') {
        let len = field
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
            .unwrap_or(field.len());
        if len > 0 {
            lex.bump(len + 1);
        }
    }
    lex.slice().to_string()
}

fn long_string(lex: &mut Lexer<Token>) -> Result<String, LexErrorKind> {
    let rest = lex.remainder();
    match rest.find("\"}") {
        Some(end) => {
            let value = rest[..end].to_string();
            lex.bump(end + 2);
            Ok(value)
        }
        None => {
            lex.bump(rest.len());
            Err(LexErrorKind::UnterminatedLongString)
        }
    }
}

impl Token {
    pub fn is_comment(&self) -> bool {
        matches!(self, Token::LineComment(_) | Token::BlockComment(_))
    }

    /// Keywords that read as plain identifiers in expression position,
    /// e.g. `return(error)` or `return(restart)`.
    pub fn keyword_as_ident(&self) -> Option<&'static str> {
        match self {
            Token::Error => Some("error"),
            Token::Restart => Some("restart"),
            Token::Esi => Some("esi"),
            Token::Call => Some("call"),
            Token::Log => Some("log"),
            Token::Set => Some("set"),
            Token::Add => Some("add"),
            Token::Unset => Some("unset"),
            Token::Remove => Some("remove"),
            Token::Local => Some("local"),
            Token::Synthetic => Some("synthetic"),
            Token::Goto => Some("goto"),
            Token::Default => Some("default"),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::LineComment(s) | Token::BlockComment(s) => return write!(f, "comment `{}`", s),
            Token::String(s) => return write!(f, "\"{}\"", s),
            Token::LongString(s) => return write!(f, "{{\"{}\"}}", s),
            Token::Integer(n) => return write!(f, "{}", n),
            Token::Float(s) | Token::RTime(s) | Token::Ident(s) => return write!(f, "{}", s),
            Token::Sub => "sub",
            Token::Acl => "acl",
            Token::Table => "table",
            Token::Backend => "backend",
            Token::Import => "import",
            Token::Include => "include",
            Token::Declare => "declare",
            Token::Local => "local",
            Token::Set => "set",
            Token::Add => "add",
            Token::Unset => "unset",
            Token::Remove => "remove",
            Token::If => "if",
            Token::Else => "else",
            Token::ElseIf => "elseif",
            Token::Elsif => "elsif",
            Token::Switch => "switch",
            Token::Case => "case",
            Token::Default => "default",
            Token::Break => "break",
            Token::Fallthrough => "fallthrough",
            Token::Restart => "restart",
            Token::Esi => "esi",
            Token::Call => "call",
            Token::Error => "error",
            Token::Log => "log",
            Token::Return => "return",
            Token::Synthetic => "synthetic",
            Token::SyntheticBase64 => "synthetic.base64",
            Token::Goto => "goto",
            Token::True => "true",
            Token::False => "false",
            Token::Assign => "=",
            Token::AddAssign => "+=",
            Token::SubtractAssign => "-=",
            Token::MultiplyAssign => "*=",
            Token::DivideAssign => "/=",
            Token::RemainderAssign => "%=",
            Token::BitwiseOrAssign => "|=",
            Token::BitwiseAndAssign => "&=",
            Token::BitwiseXorAssign => "^=",
            Token::LeftShiftAssign => "<<=",
            Token::RightShiftAssign => ">>=",
            Token::LogicalAndAssign => "&&=",
            Token::LogicalOrAssign => "||=",
            Token::Equal => "==",
            Token::NotEqual => "!=",
            Token::Match => "~",
            Token::NotMatch => "!~",
            Token::LessThan => "<",
            Token::LessThanEqual => "<=",
            Token::GreaterThan => ">",
            Token::GreaterThanEqual => ">=",
            Token::And => "&&",
            Token::Or => "||",
            Token::Bang => "!",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Slash => "/",
            Token::BraceOpen => "{",
            Token::BraceClose => "}",
            Token::ParenOpen => "(",
            Token::ParenClose => ")",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Colon => ":",
            Token::Dot => ".",
            Token::Eof => "end of input",
        };
        write!(f, "`{}`", text)
    }
}

/// Lexer result type
pub type LexResult = Result<Vec<Spanned<Token>>, LexError>;

/// Lexer error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character {ch:?} at line {line}, column {column}")]
    UnexpectedChar {
        ch: char,
        line: usize,
        column: usize,
        offset: usize,
    },

    #[error("Unterminated string literal at line {line}, column {column}")]
    UnterminatedString {
        line: usize,
        column: usize,
        offset: usize,
    },

    #[error("Unterminated long string literal at line {line}, column {column}")]
    UnterminatedLongString {
        line: usize,
        column: usize,
        offset: usize,
    },

    #[error("Unterminated block comment at line {line}, column {column}")]
    UnterminatedComment {
        line: usize,
        column: usize,
        offset: usize,
    },

    #[error("Invalid number literal at line {line}, column {column}")]
    InvalidNumber {
        line: usize,
        column: usize,
        offset: usize,
    },
}

impl LexError {
    pub fn position(&self) -> Position {
        match *self {
            LexError::UnexpectedChar { line, column, .. }
            | LexError::UnterminatedString { line, column, .. }
            | LexError::UnterminatedLongString { line, column, .. }
            | LexError::UnterminatedComment { line, column, .. }
            | LexError::InvalidNumber { line, column, .. } => Position { line, column },
        }
    }

    pub fn offset(&self) -> usize {
        match *self {
            LexError::UnexpectedChar { offset, .. }
            | LexError::UnterminatedString { offset, .. }
            | LexError::UnterminatedLongString { offset, .. }
            | LexError::UnterminatedComment { offset, .. }
            | LexError::InvalidNumber { offset, .. } => offset,
        }
    }

    fn new(kind: LexErrorKind, source: &str, offset: usize, index: &LineIndex) -> Self {
        let Position { line, column } = index.position(offset);
        match kind {
            LexErrorKind::UnterminatedLongString => {
                LexError::UnterminatedLongString { line, column, offset }
            }
            LexErrorKind::UnterminatedComment => LexError::UnterminatedComment { line, column, offset },
            LexErrorKind::InvalidNumber => LexError::InvalidNumber { line, column, offset },
            LexErrorKind::UnexpectedChar => match source[offset..].chars().next() {
                Some('"') => LexError::UnterminatedString { line, column, offset },
                Some(ch) => LexError::UnexpectedChar {
                    ch,
                    line,
                    column,
                    offset,
                },
                None => LexError::UnexpectedChar {
                    ch: '\0',
                    line,
                    column,
                    offset,
                },
            },
        }
    }
}

/// Tokenize VCL source, comments included
pub fn tokenize(source: &str) -> LexResult {
    let index = LineIndex::new(source);
    let lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    for (result, span) in lexer.spanned() {
        match result {
            Ok(token) => tokens.push(Spanned::new(token, span, &index)),
            Err(kind) => return Err(LexError::new(kind, source, span.start, &index)),
        }
    }

    tracing::trace!(tokens = tokens.len(), "tokenized source");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|s| s.value).collect()
    }

    #[test]
    fn test_set_statement() {
        let tokens = values(r#"set req.http.X-Trace-Id = "abc";"#);
        assert_eq!(
            tokens,
            vec![
                Token::Set,
                Token::Ident("req.http.X-Trace-Id".to_string()),
                Token::Assign,
                Token::String("abc".to_string()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_comments_are_tokens() {
        let tokens = values("# hash\n// slash\nrestart; /* block\ncomment */");
        assert_eq!(tokens[0], Token::LineComment("# hash".to_string()));
        assert_eq!(tokens[1], Token::LineComment("// slash".to_string()));
        assert_eq!(tokens[2], Token::Restart);
        assert_eq!(tokens[4], Token::BlockComment("/* block\ncomment */".to_string()));
    }

    #[test]
    fn test_long_string_keeps_newlines() {
        let tokens = tokenize("synthetic {\"line1\nline \"2\"\"};").unwrap();
        assert_eq!(tokens[1].value, Token::LongString("line1\nline \"2\"".to_string()));
        assert_eq!(tokens[1].position.line, 1);
        assert_eq!(tokens[1].end_line, 2);
        assert_eq!(tokens[2].value, Token::Semicolon);
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = values("synthetic.base64 settings elsif req.http.Cookie:session label:");
        assert_eq!(tokens[0], Token::SyntheticBase64);
        assert_eq!(tokens[1], Token::Ident("settings".to_string()));
        assert_eq!(tokens[2], Token::Elsif);
        assert_eq!(tokens[3], Token::Ident("req.http.Cookie:session".to_string()));
        assert_eq!(tokens[4], Token::Ident("label".to_string()));
        assert_eq!(tokens[5], Token::Colon);
    }

    #[test]
    fn test_keyword_before_colon() {
        assert_eq!(
            values("default: esi;"),
            vec![Token::Default, Token::Colon, Token::Esi, Token::Semicolon]
        );
        assert_eq!(values("default:
esi;")[..2], [Token::Default, Token::Colon]);
        assert_eq!(
            values("case \"x\": esi; break; default: esi;"),
            vec![
                Token::Case,
                Token::String("x".to_string()),
                Token::Colon,
                Token::Esi,
                Token::Semicolon,
                Token::Break,
                Token::Semicolon,
                Token::Default,
                Token::Colon,
                Token::Esi,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = values("10 1.50 10s 1.5m 100ms");
        assert_eq!(tokens[0], Token::Integer(10));
        assert_eq!(tokens[1], Token::Float("1.50".to_string()));
        assert_eq!(tokens[2], Token::RTime("10s".to_string()));
        assert_eq!(tokens[3], Token::RTime("1.5m".to_string()));
        assert_eq!(tokens[4], Token::RTime("100ms".to_string()));
    }

    #[test]
    fn test_operators() {
        let tokens = values("== != ~ !~ && || ! += <<= &&=");
        assert_eq!(
            tokens,
            vec![
                Token::Equal,
                Token::NotEqual,
                Token::Match,
                Token::NotMatch,
                Token::And,
                Token::Or,
                Token::Bang,
                Token::AddAssign,
                Token::LeftShiftAssign,
                Token::LogicalAndAssign,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("sub vcl_recv {\n  restart;\n}").unwrap();
        assert_eq!(tokens[3].position, Position { line: 2, column: 3 });
        assert_eq!(tokens[5].position, Position { line: 3, column: 1 });
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("set x = \"abc;\n").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { line: 1, column: 9, .. }));
    }

    #[test]
    fn test_unterminated_long_string() {
        let err = tokenize("log {\"abc").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedLongString { line: 1, column: 5, .. }));
    }

    #[test]
    fn test_unterminated_comment() {
        let err = tokenize("restart; /* abc").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedComment { .. }));
    }

    #[test]
    fn test_unexpected_char() {
        let err = tokenize("set x = @;").unwrap_err();
        assert!(matches!(err, LexError::UnexpectedChar { ch: '@', line: 1, column: 9, .. }));
    }
}
