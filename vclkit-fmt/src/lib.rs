//! VCL formatter
//!
//! Renders a parsed [`Program`] as canonical text. Indentation comes from
//! the nesting depth the parser recorded on each node and every attached
//! comment is written back next to its node.
//!
//! # Example
//!
//! ```rust
//! use vclkit_core::StyleConfig;
//! use vclkit_fmt::format_source;
//!
//! let formatted = format_source("sub vcl_recv{set req.http.A=\"b\";}", &StyleConfig::default()).unwrap();
//! assert_eq!(formatted, "sub vcl_recv {\n  set req.http.A = \"b\";\n}\n");
//! ```

mod expression;
mod formatter;

pub use formatter::Formatter;

use vclkit_core::StyleConfig;
use vclkit_syntax::{parse, ParseError, Program};

/// Format a parsed program
pub fn format(program: &Program, conf: &StyleConfig) -> String {
    Formatter::new(conf).format_program(program)
}

/// Parse and format source text
pub fn format_source(source: &str, conf: &StyleConfig) -> Result<String, ParseError> {
    let program = parse(source)?;
    let formatted = format(&program, conf);
    tracing::debug!(
        input = source.len(),
        output = formatted.len(),
        changed = formatted != source,
        "formatted VCL"
    );
    Ok(formatted)
}
