//! Parse option definitions
//!
//! These types control a single parse run.

use serde::{Deserialize, Serialize};

/// Options for one parse run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParseOptions {
    /// Keep top-level comments as `#` statements
    pub comments: bool,

    /// Parse only the root file, never follow `include`
    pub single: bool,

    /// Directive names dropped from the output, blocks included
    pub ignore: Vec<String>,

    /// Treat undeclared directives as errors
    pub strict: bool,

    /// Inline every included file into the first one
    pub combine: bool,

    /// Record errors and keep going; `false` returns the first error
    pub catch_errors: bool,

    /// Validate the context each directive appears in
    pub check_ctx: bool,

    /// Validate argument counts and terminators
    pub check_args: bool,

    /// Output form produced by the pipeline
    pub format: OutputFormat,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            comments: false,
            single: false,
            ignore: Vec::new(),
            strict: false,
            combine: false,
            catch_errors: true,
            check_ctx: true,
            check_args: true,
            format: OutputFormat::default(),
        }
    }
}

impl ParseOptions {
    pub fn is_ignored(&self, directive: &str) -> bool {
        self.ignore.iter().any(|name| name == directive)
    }
}

/// Output forms
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Nested map keyed by directive name
    #[default]
    Readable,
    /// Line-annotated statement tree with include cross-references
    Crossplane,
}
