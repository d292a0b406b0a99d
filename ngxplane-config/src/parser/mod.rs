//! Parser module for nginx-style configuration files
//!
//! Tokens flow from the lexer through the brace balancer into the recursive
//! descent parser, which validates each statement against the grammar table.

pub mod analyzer;
pub mod ast;
pub mod balance;
pub mod grammar;
pub mod include;
pub mod lexer;
pub mod parser;

pub use analyzer::Analyzer;
pub use ast::Statement;
pub use balance::BraceBalancer;
pub use grammar::{Context, Mask};
pub use include::{IncludeEntry, IncludeError, Worklist};
pub use lexer::{tokenize, DirectiveLexer, LexError, Lexer, LexerRegistry, Scanner, Token};
pub use parser::{read_source, ConfigParser};

use crate::payload::Payload;
use ngxplane_core::{ParseOptions, Result};
use std::path::Path;

/// Parse a file and everything it includes
pub fn parse(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Payload> {
    ConfigParser::new(options.clone()).parse(path)
}
