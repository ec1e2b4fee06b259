//! Parser module for VCL
//!
//! This module provides the lexer, comment collector, AST, and parser.

pub mod ast;
pub mod comments;
mod decl;
mod expr;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use lexer::{tokenize, LexError, Location, Position, Spanned, Token};
pub use parser::{parse, ParseError, ParseResult, Parser};
