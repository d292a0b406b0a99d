//! Statement tree
//!
//! A parsed file is an ordered forest of statements:
//! - Directives (name + args + optional block)
//! - Comments (`#` directive with the comment text)
//! - Includes, which point at other files by their index in the payload

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Originating file, only recorded when files are combined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Directive name (e.g. "server", "listen", "#" for comments)
    pub directive: String,

    /// Line the directive name starts on
    pub line: usize,

    /// Arguments following the name
    #[serde(default)]
    pub args: Vec<String>,

    /// Indices into the payload's `config` list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Vec<usize>>,

    /// Optional block { ... }
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<Vec<Statement>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Statement {
    pub fn new(directive: impl Into<String>, line: usize) -> Self {
        Self {
            file: None,
            directive: directive.into(),
            line,
            args: Vec::new(),
            includes: None,
            block: None,
            comment: None,
        }
    }

    /// Comment statement; `text` excludes the leading `#`
    pub fn comment(line: usize, text: impl Into<String>) -> Self {
        Self {
            comment: Some(text.into()),
            ..Self::new("#", line)
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_block(mut self, block: Vec<Statement>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn is_comment(&self) -> bool {
        self.directive == "#" && self.comment.is_some()
    }
}
