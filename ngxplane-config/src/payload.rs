//! Parse results
//!
//! A run produces one [`Payload`] holding a [`FileParseResult`] per file that
//! was reached through `include`, in the order the files were discovered.

use crate::parser::ast::Statement;
use ngxplane_core::Error;
use serde::{Deserialize, Serialize};

/// Overall status of a file or a run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Ok,
    Failed,
}

/// Error recorded against a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub error: String,
    pub line: Option<usize>,
}

/// Error recorded against the whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadError {
    pub file: String,
    pub error: String,
    pub line: Option<usize>,
}

/// Parse result of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileParseResult {
    pub file: String,
    pub status: Status,
    pub errors: Vec<FileError>,
    pub parsed: Vec<Statement>,
}

impl FileParseResult {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            status: Status::Ok,
            errors: Vec::new(),
            parsed: Vec::new(),
        }
    }

    pub fn record(&mut self, err: &Error) {
        self.status = Status::Failed;
        self.errors.push(FileError {
            error: err.to_string(),
            line: err.line(),
        });
    }
}

/// Result of a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Payload {
    pub status: Status,
    pub errors: Vec<PayloadError>,
    pub config: Vec<FileParseResult>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, file: &str, err: &Error) {
        self.status = Status::Failed;
        self.errors.push(PayloadError {
            file: file.to_string(),
            error: err.to_string(),
            line: err.line(),
        });
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Files after the root, in discovery order
    pub fn included_files(&self) -> impl Iterator<Item = &str> {
        self.config.iter().skip(1).map(|parsing| parsing.file.as_str())
    }
}
