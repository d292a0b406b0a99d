//! Brace balancing over a token stream

use crate::parser::lexer::Token;
use ngxplane_core::{Error, Result};

/// Passes tokens through and fails as soon as the nesting is broken
pub struct BraceBalancer<'a, I> {
    tokens: I,
    file: &'a str,
    depth: usize,
    line: usize,
    finished: bool,
}

impl<'a, I> BraceBalancer<'a, I>
where
    I: Iterator<Item = Result<Token>>,
{
    pub fn new(tokens: I, file: &'a str) -> Self {
        Self {
            tokens,
            file,
            depth: 0,
            line: 1,
            finished: false,
        }
    }

    /// Number of blocks currently open
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl<I> Iterator for BraceBalancer<'_, I>
where
    I: Iterator<Item = Result<Token>>,
{
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.tokens.next() {
            Some(Ok(token)) => {
                self.line = token.line;
                if token.is_punct("{") {
                    self.depth += 1;
                } else if token.is_punct("}") {
                    if self.depth == 0 {
                        self.finished = true;
                        return Some(Err(Error::syntax("unexpected \"}\"", self.file, token.line)));
                    }
                    self.depth -= 1;
                }
                Some(Ok(token))
            }
            Some(Err(err)) => {
                self.finished = true;
                Some(Err(err))
            }
            None => {
                self.finished = true;
                if self.depth > 0 {
                    return Some(Err(Error::syntax(
                        "unexpected end of file, expecting \"}\"",
                        self.file,
                        self.line,
                    )));
                }
                None
            }
        }
    }
}
