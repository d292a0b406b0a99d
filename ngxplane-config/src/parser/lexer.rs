//! Lexer for nginx-style configuration files
//!
//! Tokenizing happens in two layers:
//! - [`Scanner`] cuts the source into raw lexemes with logos and counts lines
//! - [`Lexer`] assembles lexemes into `(text, line, quoted)` tokens
//!
//! Key rules:
//! - Whitespace separates tokens
//! - `#` at the start of a token comments out the rest of the line
//! - `\` escapes the next character, the pair is kept verbatim
//! - '...' and "..." quote, only `\<quote>` is unescaped inside
//! - `{`, `}` and `;` are always tokens of their own
//! - `${...}` is parameter expansion, its braces are not structural

use logos::Logos;
use ngxplane_core::{Error, Result};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

/// Raw lexemes recognized by the scanner
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme {
    #[regex(r"[ \t\r\x0B\x0C]+")]
    Space,

    #[token("\n")]
    Newline,

    /// Backslash followed by any character
    #[regex(r"\\[^\n]")]
    #[token("\\\n")]
    Escaped,

    /// Backslash with nothing after it
    #[token("\\")]
    DanglingEscape,

    #[token("\"")]
    #[token("'")]
    Quote,

    #[token("{")]
    BlockOpen,

    #[token("}")]
    BlockClose,

    #[token(";")]
    Semicolon,

    #[token("#")]
    Hash,

    /// Anything else, up to the next special character
    #[regex(r##"[^ \t\r\n\x0B\x0C\\"'{};#]+"##)]
    Text,
}

/// A lexeme with its text and the line it ends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPiece<'a> {
    pub kind: Lexeme,
    pub text: &'a str,
    pub line: usize,
}

impl RawPiece<'_> {
    pub fn is_whitespace(&self) -> bool {
        matches!(self.kind, Lexeme::Space | Lexeme::Newline)
    }
}

/// Pull-based cursor over the raw lexemes of one source
pub struct Scanner<'a> {
    inner: logos::Lexer<'a, Lexeme>,
    line: usize,
    pending: Option<RawPiece<'a>>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: Lexeme::lexer(source),
            line: 1,
            pending: None,
        }
    }

    /// Current line (1-based)
    pub fn line(&self) -> usize {
        self.line
    }

    /// Advance to the next lexeme
    pub fn next_piece(&mut self) -> Option<RawPiece<'a>> {
        if let Some(piece) = self.pending.take() {
            return Some(piece);
        }

        // The Text pattern accepts everything the others reject
        let kind = self.inner.next()?.unwrap_or(Lexeme::Text);
        let text = self.inner.slice();
        self.line += text.matches('\n').count();

        Some(RawPiece {
            kind,
            text,
            line: self.line,
        })
    }

    /// Return a lexeme so the next call yields it again
    pub fn push_back(&mut self, piece: RawPiece<'a>) {
        self.pending = Some(piece);
    }
}

/// A token with the line it starts on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    pub line: usize,
    pub quoted: bool,
}

impl Token {
    pub fn new(text: impl Into<String>, line: usize, quoted: bool) -> Self {
        Self {
            text: text.into(),
            line,
            quoted,
        }
    }

    /// Unquoted token with exactly this text (`{`, `}`, `;`)
    pub fn is_punct(&self, punct: &str) -> bool {
        !self.quoted && self.text == punct
    }

    pub fn is_comment(&self) -> bool {
        !self.quoted && self.text.starts_with('#')
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.text)
        } else {
            write!(f, "{}", self.text)
        }
    }
}

/// Lexer error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unexpected end of file, expecting closing quote {0}")]
    UnterminatedQuote(String),

    #[error("unexpected end of file, expecting a character after \"\\\"")]
    DanglingEscape,

    #[error("{0}")]
    Custom(String),
}

/// Sub-lexer for the statement that follows a given directive name
///
/// It receives the scanner positioned right after the directive token and
/// returns the tokens for the rest of that statement, terminator included.
pub trait DirectiveLexer: Send + Sync {
    fn lex(
        &self,
        directive: &str,
        scanner: &mut Scanner<'_>,
    ) -> std::result::Result<Vec<Token>, LexError>;
}

/// Custom sub-lexers keyed by directive name
#[derive(Clone, Default)]
pub struct LexerRegistry {
    lexers: HashMap<String, Arc<dyn DirectiveLexer>>,
}

impl LexerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sub-lexer for a directive
    pub fn register(&mut self, directive: impl Into<String>, lexer: Arc<dyn DirectiveLexer>) {
        let directive = directive.into();
        tracing::debug!("Registering custom lexer for \"{}\"", directive);
        self.lexers.insert(directive, lexer);
    }

    pub fn get(&self, directive: &str) -> Option<&Arc<dyn DirectiveLexer>> {
        self.lexers.get(directive)
    }
}

impl fmt::Debug for LexerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.lexers.keys()).finish()
    }
}

/// Token stream over one source
pub struct Lexer<'a> {
    scanner: Scanner<'a>,
    file: &'a str,
    lexers: &'a LexerRegistry,
    queue: VecDeque<Token>,
    token: String,
    token_line: usize,
    expect_directive: bool,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: &'a str, lexers: &'a LexerRegistry) -> Self {
        Self {
            scanner: Scanner::new(source),
            file,
            lexers,
            queue: VecDeque::new(),
            token: String::new(),
            token_line: 0,
            expect_directive: true,
            finished: false,
        }
    }

    /// Consume lexemes until at least one token is ready or input ends
    fn step(&mut self) -> std::result::Result<(), LexError> {
        while self.queue.is_empty() {
            let Some(piece) = self.scanner.next_piece() else {
                self.flush(false)?;
                self.finished = true;
                return Ok(());
            };

            match piece.kind {
                Lexeme::Space | Lexeme::Newline => self.flush(true)?,
                Lexeme::Hash if self.token.is_empty() => self.lex_comment(piece),
                Lexeme::BlockOpen if self.token.ends_with('$') => self.lex_expansion(piece),
                Lexeme::Quote if self.token.is_empty() => self.lex_quoted(piece)?,
                Lexeme::BlockOpen | Lexeme::BlockClose | Lexeme::Semicolon => {
                    self.flush(false)?;
                    self.queue.push_back(Token::new(piece.text, piece.line, false));
                    self.expect_directive = true;
                }
                Lexeme::DanglingEscape => return Err(LexError::DanglingEscape),
                _ => {
                    if self.token.is_empty() {
                        self.token_line = piece.line;
                    }
                    self.token.push_str(piece.text);
                }
            }
        }
        Ok(())
    }

    /// Emit the pending token; `by_space` is false when a `{`, `}`, `;` or
    /// the end of input ends it, which leaves no statement for a sub-lexer
    fn flush(&mut self, by_space: bool) -> std::result::Result<(), LexError> {
        if self.token.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.token);
        self.emit(Token::new(text, self.token_line, false), by_space)
    }

    fn emit(&mut self, token: Token, allow_custom: bool) -> std::result::Result<(), LexError> {
        let lexers = self.lexers;
        let custom = if allow_custom && self.expect_directive {
            lexers.get(&token.text)
        } else {
            None
        };

        match custom {
            Some(lexer) => {
                let directive = token.text.clone();
                self.queue.push_back(token);
                tracing::debug!("Handing \"{}\" to a custom lexer", directive);
                let tokens = lexer.lex(&directive, &mut self.scanner)?;
                self.queue.extend(tokens);
                self.expect_directive = true;
            }
            None => {
                self.queue.push_back(token);
                self.expect_directive = false;
            }
        }
        Ok(())
    }

    fn lex_comment(&mut self, hash: RawPiece<'a>) {
        let mut text = String::from(hash.text);
        while let Some(piece) = self.scanner.next_piece() {
            if piece.text.ends_with('\n') {
                break;
            }
            text.push_str(piece.text);
        }
        self.queue.push_back(Token::new(text, hash.line, false));
    }

    fn lex_expansion(&mut self, open: RawPiece<'a>) {
        self.expect_directive = false;
        self.token.push_str(open.text);
        while !self.token.ends_with('}') {
            match self.scanner.next_piece() {
                Some(piece) if piece.is_whitespace() => {
                    self.scanner.push_back(piece);
                    break;
                }
                Some(piece) => self.token.push_str(piece.text),
                None => break,
            }
        }
    }

    fn lex_quoted(&mut self, open: RawPiece<'a>) -> std::result::Result<(), LexError> {
        let quote = open.text;
        let mut text = String::new();
        loop {
            let piece = self
                .scanner
                .next_piece()
                .ok_or_else(|| LexError::UnterminatedQuote(quote.to_string()))?;

            match piece.kind {
                Lexeme::Quote if piece.text == quote => break,
                Lexeme::Escaped if &piece.text[1..] == quote => text.push_str(quote),
                Lexeme::DanglingEscape => {
                    return Err(LexError::UnterminatedQuote(quote.to_string()));
                }
                _ => text.push_str(piece.text),
            }
        }
        self.emit(Token::new(text, open.line, true), true)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.queue.pop_front() {
                return Some(Ok(token));
            }
            if self.finished {
                return None;
            }
            if let Err(err) = self.step() {
                self.finished = true;
                self.queue.clear();
                return Some(Err(Error::syntax(err.to_string(), self.file, self.scanner.line())));
            }
        }
    }
}

/// Tokenize a source string with no custom lexers
pub fn tokenize(source: &str, file: &str) -> Result<Vec<Token>> {
    let lexers = LexerRegistry::default();
    Lexer::new(source, file, &lexers).collect()
}
