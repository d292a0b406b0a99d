//! Error types for ngxplane

use thiserror::Error;

/// Result type for ngxplane operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ngxplane
///
/// Every variant produced while parsing carries the file it was raised in and,
/// when known, the 1-based line. The rendered message is the one recorded in
/// payload error entries, e.g. `unexpected "}" in /etc/nginx/nginx.conf:12`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Lexical or brace-nesting error
    #[error("{reason} in {file}:{line}")]
    Syntax {
        reason: String,
        file: String,
        line: usize,
    },

    /// Directive used outside of the contexts that allow it
    #[error("{reason} in {file}:{line}")]
    DirectiveContext {
        reason: String,
        file: String,
        line: usize,
    },

    /// Wrong argument count, bad flag value or wrong terminator
    #[error("{reason} in {file}:{line}")]
    DirectiveArguments {
        reason: String,
        file: String,
        line: usize,
    },

    /// Undeclared directive (strict mode only)
    #[error("{reason} in {file}:{line}")]
    DirectiveUnknown {
        reason: String,
        file: String,
        line: usize,
    },

    /// Literal include path that cannot be opened
    #[error("{reason} in {file}:{line}")]
    IncludeResolution {
        reason: String,
        file: String,
        line: usize,
    },

    /// A configuration file could not be read
    #[error("{reason} in {file}")]
    Io { reason: String, file: String },

    /// Invalid options file
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn syntax(reason: impl Into<String>, file: impl Into<String>, line: usize) -> Self {
        Self::Syntax {
            reason: reason.into(),
            file: file.into(),
            line,
        }
    }

    pub fn io(err: &std::io::Error, file: impl Into<String>) -> Self {
        Self::Io {
            reason: err.to_string(),
            file: file.into(),
        }
    }

    /// Human readable reason, without the location suffix
    pub fn reason(&self) -> &str {
        match self {
            Self::Syntax { reason, .. }
            | Self::DirectiveContext { reason, .. }
            | Self::DirectiveArguments { reason, .. }
            | Self::DirectiveUnknown { reason, .. }
            | Self::IncludeResolution { reason, .. }
            | Self::Io { reason, .. } => reason,
            Self::Config(reason) => reason,
        }
    }

    /// File the error was raised in
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::Syntax { file, .. }
            | Self::DirectiveContext { file, .. }
            | Self::DirectiveArguments { file, .. }
            | Self::DirectiveUnknown { file, .. }
            | Self::IncludeResolution { file, .. }
            | Self::Io { file, .. } => Some(file),
            Self::Config(_) => None,
        }
    }

    /// Line the error was raised at
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. }
            | Self::DirectiveContext { line, .. }
            | Self::DirectiveArguments { line, .. }
            | Self::DirectiveUnknown { line, .. }
            | Self::IncludeResolution { line, .. } => Some(*line),
            Self::Io { .. } | Self::Config(_) => None,
        }
    }
}
