//! Style options understood by the formatter

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Formatting style
///
/// Keys are spelled in PascalCase in every configuration format
/// (`ElseIf = true`). Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase", default)]
pub struct StyleConfig {
    /// Write every else-if branch as `else if`, whatever the source used
    pub else_if: bool,

    /// Always wrap the value of `return` in parentheses. When unset the
    /// source's own choice is kept.
    pub return_argument_parenthesis: bool,

    /// Width of one indent level when indenting with spaces
    pub indent_width: usize,

    /// Indent with spaces or tabs
    pub indent_style: IndentStyle,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            else_if: false,
            return_argument_parenthesis: false,
            indent_width: 2,
            indent_style: IndentStyle::Space,
        }
    }
}

/// Indent character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    #[default]
    Space,
    Tab,
}

impl FromStr for IndentStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "space" => Ok(IndentStyle::Space),
            "tab" => Ok(IndentStyle::Tab),
            _ => Err(Error::Config(format!(
                "Invalid IndentStyle {:?}: expected \"space\" or \"tab\"",
                s
            ))),
        }
    }
}

impl fmt::Display for IndentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndentStyle::Space => f.write_str("space"),
            IndentStyle::Tab => f.write_str("tab"),
        }
    }
}

impl StyleConfig {
    /// Parse TOML style configuration
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Parse JSON style configuration
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Config(format!("Invalid JSON: {}", e)))
    }

    /// Set a single option by its configuration key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "ElseIf" => self.else_if = parse_bool(key, value)?,
            "ReturnArgumentParenthesis" => self.return_argument_parenthesis = parse_bool(key, value)?,
            "IndentWidth" => {
                self.indent_width = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid {}: {:?} is not a number", key, value)))?;
            }
            "IndentStyle" => self.indent_style = value.parse()?,
            _ => return Err(Error::Config(format!("Unknown style option: {}", key))),
        }
        tracing::debug!(key, value, "style option set");
        Ok(())
    }

    /// Apply a `Key=value` override
    pub fn apply_override(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| Error::Config(format!("Expected Key=value, got {:?}", assignment)))?;
        self.set(key.trim(), value.trim())
    }

    /// Whitespace for `level` indent levels
    pub fn indent(&self, level: usize) -> String {
        match self.indent_style {
            IndentStyle::Space => " ".repeat(self.indent_width * level),
            IndentStyle::Tab => "\t".repeat(level),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {}: {:?} is not true or false", key, value)))
}
