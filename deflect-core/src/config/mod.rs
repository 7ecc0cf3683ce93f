//! Configuration types and parser
//!
//! Board-agnostic configuration structures, loaded from a small TOML file.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
