//! ngxplane configuration parser
//!
//! Parses nginx-style configuration files, follows their includes and
//! produces either the line-annotated statement tree of every file or a
//! simplified nested map.
//!
//! # Example
//!
//! ```rust,ignore
//! use ngxplane_config::{run, ParseOptions};
//!
//! let options = ParseOptions {
//!     combine: true,
//!     ..Default::default()
//! };
//! let value = run("/etc/nginx/nginx.conf", &options).unwrap();
//! println!("{}", value["nginx"]["http"]);
//! ```

pub mod parser;
pub mod payload;
pub mod transform;

pub use parser::{parse, tokenize, ConfigParser, Statement, Token};
pub use payload::{FileError, FileParseResult, Payload, PayloadError, Status};
pub use transform::{combine, readable, Readable};

pub use ngxplane_core::{Error, OutputFormat, ParseOptions};

use serde_json::Value;
use std::path::Path;

/// Serialize a payload in the requested form
pub fn render(payload: &Payload, format: OutputFormat) -> serde_json::Result<Value> {
    match format {
        OutputFormat::Crossplane => serde_json::to_value(payload),
        OutputFormat::Readable => serde_json::to_value(readable(payload)),
    }
}

/// Full pipeline: root file -> payload -> output form from `options.format`
pub fn run(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Value, PipelineError> {
    let payload = parse(path, options)?;
    Ok(render(&payload, options.format)?)
}

/// Full pipeline error
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Parse error: {0}")]
    Parse(#[from] Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}
