//! vclkit Core Library
//!
//! This crate provides the pieces shared by the formatter and the command
//! line tool: the error type and the formatting style configuration.

pub mod config;
pub mod error;

pub use config::{ConfigLoader, IndentStyle, StyleConfig};
pub use error::{Error, Result};

/// vclkit version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
