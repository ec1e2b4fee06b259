//! VCL syntax
//!
//! Lexer and parser for Fastly/Varnish-style VCL that keep every comment
//! attached to the node it documents, so the tree can be printed back
//! without losing any of them.
//!
//! # Example
//!
//! ```rust
//! use vclkit_syntax::{parse, Statement};
//!
//! let source = r#"
//! sub vcl_recv {
//!   // normalize the host
//!   set req.http.Host = "example.com";
//! }
//! "#;
//!
//! let program = parse(source).unwrap();
//! assert!(matches!(program.statements[0], Statement::Subroutine(_)));
//! assert_eq!(program.comments().len(), 1);
//! ```

pub mod parser;

pub use parser::{
    parse, tokenize, Comment, Comments, Expression, HasMeta, LexError, Meta, Node, ParseError,
    Position, Program, Statement, Token,
};
