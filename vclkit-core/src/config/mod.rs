//! Formatting style configuration

mod loader;
mod style;

pub use loader::ConfigLoader;
pub use style::{IndentStyle, StyleConfig};
