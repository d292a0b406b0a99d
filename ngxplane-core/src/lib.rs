//! ngxplane Core Library
//!
//! This crate provides the types shared by the ngxplane parser and CLI:
//! the error taxonomy and the parse options with their file loader.

pub mod config;
pub mod error;

pub use config::{ConfigLoader, OutputFormat, ParseOptions};
pub use error::{Error, Result};

/// ngxplane version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
