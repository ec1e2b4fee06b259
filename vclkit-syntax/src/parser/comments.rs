//! Comment collector
//!
//! Folds the lexer's comment tokens into the code token that follows them,
//! remembering whether each comment shares a line with the code token
//! before it. The parser uses that flag to tell trailing comments
//! (`restart; // why`) from leading ones on their own line.

use crate::parser::ast::Comment;
use crate::parser::lexer::{Location, Position, Spanned, Token};

/// Where a comment sits relative to the preceding code token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    /// Starts on the line the previous code token ends on
    SameLine,
    /// Starts on a line of its own (or is the first thing in the file)
    OwnLine,
}

/// A comment waiting to be attached to a node
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedComment {
    pub comment: Comment,
    pub adjacency: Adjacency,
}

/// A code token together with the comments written before it
#[derive(Debug, Clone, PartialEq)]
pub struct CommentedToken {
    pub token: Token,
    pub span: Location,
    pub position: Position,
    pub comments: Vec<CollectedComment>,
}

/// Split a token stream into code tokens carrying their preceding comments.
///
/// The result always ends with a [`Token::Eof`] entry that owns the
/// comments written after the last code token.
pub fn collect(tokens: Vec<Spanned<Token>>, source_len: usize, eof: Position) -> Vec<CommentedToken> {
    let mut out = Vec::with_capacity(tokens.len() + 1);
    let mut buffer = Vec::new();
    let mut previous_end_line: Option<usize> = None;

    for spanned in tokens {
        match spanned.value {
            Token::LineComment(text) | Token::BlockComment(text) => {
                let adjacency = match previous_end_line {
                    Some(line) if line == spanned.position.line => Adjacency::SameLine,
                    _ => Adjacency::OwnLine,
                };
                buffer.push(CollectedComment {
                    comment: Comment::new(text),
                    adjacency,
                });
            }
            token => {
                previous_end_line = Some(spanned.end_line);
                out.push(CommentedToken {
                    token,
                    span: spanned.span,
                    position: spanned.position,
                    comments: std::mem::take(&mut buffer),
                });
            }
        }
    }

    out.push(CommentedToken {
        token: Token::Eof,
        span: Location {
            start: source_len,
            end: source_len,
        },
        position: eof,
        comments: buffer,
    });
    out
}
