//! Include resolution
//!
//! `include` arguments are literal paths or glob patterns, relative to the
//! directory of the file that contains them. Every resolved file is queued
//! once on the run's [`Worklist`] together with the context of the include.

use crate::parser::grammar::Context;
use glob::MatchOptions;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Include resolution error
#[derive(Debug, thiserror::Error)]
pub enum IncludeError {
    #[error("open() \"{path}\" failed ({source})")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("open() \"{path}\" failed (Is a directory)")]
    Directory { path: String },
}

/// A file waiting to be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeEntry {
    pub path: PathBuf,
    pub context: Context,
}

/// Append-only FIFO of files to parse, deduplicated by path
#[derive(Debug, Default)]
pub struct Worklist {
    entries: Vec<IncludeEntry>,
    index: HashMap<PathBuf, usize>,
}

impl Worklist {
    /// Worklist holding the root file at index 0
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let mut worklist = Self::default();
        worklist.register(root.into(), &Context::main());
        worklist
    }

    /// Queue `path` unless already known; returns its index either way
    pub fn register(&mut self, path: PathBuf, context: &Context) -> usize {
        if let Some(&index) = self.index.get(&path) {
            return index;
        }

        let index = self.entries.len();
        tracing::debug!("Queueing {} as file #{} ({})", path.display(), index, context);
        self.index.insert(path.clone(), index);
        self.entries.push(IncludeEntry {
            path,
            context: context.clone(),
        });
        index
    }

    pub fn get(&self, index: usize) -> Option<&IncludeEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Absolute pattern for an include argument found in a file under `dir`
pub fn resolve_pattern(dir: &Path, arg: &str) -> PathBuf {
    let path = Path::new(arg);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}

pub fn has_magic(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Files an include pattern refers to
///
/// Glob patterns expand to their sorted regular-file matches, possibly none.
/// Literal paths must name a file that can be opened.
pub fn expand(pattern: &Path) -> Result<Vec<PathBuf>, IncludeError> {
    let text = pattern.to_string_lossy();
    if has_magic(&text) {
        return Ok(glob_files(&text));
    }

    probe(pattern)?;
    Ok(vec![pattern.to_path_buf()])
}

fn probe(path: &Path) -> Result<(), IncludeError> {
    let file = File::open(path).map_err(|source| IncludeError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let is_dir = file.metadata().map(|meta| meta.is_dir()).unwrap_or(false);
    if is_dir {
        return Err(IncludeError::Directory {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

fn glob_files(pattern: &str) -> Vec<PathBuf> {
    let paths = match glob::glob_with(pattern, MATCH_OPTIONS) {
        Ok(paths) => paths,
        Err(err) => {
            tracing::warn!("Invalid include pattern {}: {}", pattern, err);
            return Vec::new();
        }
    };

    let mut matches: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!("Skipping unreadable include match: {}", err);
                None
            }
        })
        .filter(|path| {
            let is_dir = path.is_dir();
            if is_dir {
                tracing::debug!("Skipping directory {} matched by {}", path.display(), pattern);
            }
            !is_dir
        })
        .collect();
    matches.sort_by(|left, right| left.as_os_str().cmp(right.as_os_str()));
    matches
}
