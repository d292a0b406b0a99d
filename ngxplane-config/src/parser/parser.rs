//! Configuration parser
//!
//! Recursive descent parser that turns the balanced token stream of each
//! file into a statement tree, validating every statement on the way and
//! following `include` directives through the run's worklist.

use crate::parser::analyzer::Analyzer;
use crate::parser::ast::Statement;
use crate::parser::balance::BraceBalancer;
use crate::parser::grammar::Context;
use crate::parser::include::{self, IncludeEntry, Worklist};
use crate::parser::lexer::{DirectiveLexer, Lexer, LexerRegistry, Token};
use crate::payload::{FileParseResult, Payload};
use crate::transform::combine;
use ngxplane_core::{Error, ParseOptions, Result};
use std::path::Path;
use std::sync::Arc;

/// Parser entry point; holds options and custom lexers, no run state
#[derive(Debug, Clone, Default)]
pub struct ConfigParser {
    options: ParseOptions,
    lexers: LexerRegistry,
}

impl ConfigParser {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            lexers: LexerRegistry::default(),
        }
    }

    /// Route statements starting with `directive` through a custom lexer
    pub fn with_lexer(
        mut self,
        directive: impl Into<String>,
        lexer: Arc<dyn DirectiveLexer>,
    ) -> Self {
        self.lexers.register(directive, lexer);
        self
    }

    /// Parse `path` and every file it includes
    ///
    /// With `catch_errors` the returned payload carries all errors; otherwise
    /// the first error is returned.
    pub fn parse(&self, path: impl AsRef<Path>) -> Result<Payload> {
        let mut worklist = Worklist::new(path.as_ref());
        let mut payload = Payload::new();

        // The worklist grows while it is drained
        let mut next = 0;
        while let Some(entry) = worklist.get(next).cloned() {
            next += 1;
            let parsing = self.parse_entry(&entry, &mut worklist, &mut payload)?;
            payload.config.push(parsing);
        }

        tracing::debug!(
            "Parsed {} file(s) from {}, {} error(s)",
            payload.config.len(),
            path.as_ref().display(),
            payload.errors.len()
        );

        if self.options.combine {
            Ok(combine(payload))
        } else {
            Ok(payload)
        }
    }

    fn parse_entry(
        &self,
        entry: &IncludeEntry,
        worklist: &mut Worklist,
        payload: &mut Payload,
    ) -> Result<FileParseResult> {
        let file = entry.path.display().to_string();
        tracing::debug!("Parsing {} ({})", file, entry.context);

        let mut parsing = FileParseResult::new(&file);
        let source = match read_source(&entry.path) {
            Ok(source) => source,
            Err(err) => return self.fail(Error::io(&err, &file), parsing, payload),
        };

        let dir = entry.path.parent().unwrap_or(Path::new(""));
        let result = {
            let mut parser = FileParser {
                tokens: BraceBalancer::new(Lexer::new(&source, &file, &self.lexers), &file),
                file: &file,
                dir,
                options: &self.options,
                analyzer: Analyzer::new(&self.options),
                worklist,
                payload: &mut *payload,
                parsing: &mut parsing,
            };
            parser.parse_block(&entry.context)
        };

        match result {
            Ok(parsed) => {
                parsing.parsed = parsed;
                Ok(parsing)
            }
            Err(err) => self.fail(err, parsing, payload),
        }
    }

    /// A file could not be parsed to the end; its tree is dropped
    fn fail(
        &self,
        err: Error,
        mut parsing: FileParseResult,
        payload: &mut Payload,
    ) -> Result<FileParseResult> {
        if !self.options.catch_errors {
            return Err(err);
        }
        tracing::warn!("{}", err);
        parsing.parsed.clear();
        parsing.record(&err);
        payload.record(&parsing.file, &err);
        Ok(parsing)
    }
}

/// Read a configuration file the way nginx sees it: lossy UTF-8, LF newlines
pub fn read_source(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    let source = String::from_utf8_lossy(&bytes);
    Ok(source.replace("\r\n", "\n"))
}

struct FileParser<'a, I> {
    tokens: BraceBalancer<'a, I>,
    file: &'a str,
    dir: &'a Path,
    options: &'a ParseOptions,
    analyzer: Analyzer,
    worklist: &'a mut Worklist,
    payload: &'a mut Payload,
    parsing: &'a mut FileParseResult,
}

impl<I> FileParser<'_, I>
where
    I: Iterator<Item = Result<Token>>,
{
    fn next_token(&mut self) -> Result<Option<Token>> {
        self.tokens.next().transpose()
    }

    fn expect_token(&mut self, line: usize) -> Result<Token> {
        self.next_token()?.ok_or_else(|| {
            Error::syntax("unexpected end of file, expecting \";\" or \"}\"", self.file, line)
        })
    }

    /// Record a statement error, or return it when errors are not caught
    fn recover(&mut self, err: Error) -> Result<()> {
        if !self.options.catch_errors {
            return Err(err);
        }
        tracing::warn!("{}", err);
        self.parsing.record(&err);
        self.payload.record(self.file, &err);
        Ok(())
    }

    /// Parse statements until the closing `}` of the current block or EOF
    fn parse_block(&mut self, ctx: &Context) -> Result<Vec<Statement>> {
        let mut parsed = Vec::new();

        while let Some(token) = self.next_token()? {
            if token.is_punct("}") {
                break;
            }

            let line = token.line;
            if token.is_comment() {
                if self.options.comments {
                    parsed.push(Statement::comment(line, &token.text[1..]));
                }
                continue;
            }

            let mut stmt = Statement::new(token.text, line);
            if self.options.combine {
                stmt.file = Some(self.file.to_string());
            }

            // Arguments up to the terminator; comments among them come after
            let mut comments = Vec::new();
            let term = loop {
                let arg = self.expect_token(line)?;
                if arg.is_punct("{") || arg.is_punct(";") || arg.is_punct("}") {
                    break arg;
                }
                if arg.is_comment() {
                    comments.push(arg.text[1..].to_string());
                } else {
                    stmt.args.push(arg.text);
                }
            };
            let closes_block = term.is_punct("}");

            if self.options.is_ignored(&stmt.directive) {
                if term.is_punct("{") {
                    self.skip_block()?;
                }
                if closes_block {
                    break;
                }
                continue;
            }

            if stmt.directive == "if" {
                prepare_if_args(&mut stmt.args);
            }

            if let Err(err) = self.analyzer.analyze(self.file, &stmt, &term.text, ctx) {
                self.recover(err)?;
                if term.is_punct("{") {
                    self.skip_block()?;
                }
                if closes_block {
                    break;
                }
                continue;
            }

            if !self.options.single && stmt.directive == "include" {
                self.resolve_includes(&mut stmt, ctx)?;
            }

            if term.is_punct("{") {
                let inner = ctx.enter(&stmt.directive);
                stmt.block = Some(self.parse_block(&inner)?);
            }

            parsed.push(stmt);
            parsed.extend(comments.into_iter().map(|text| Statement::comment(line, text)));

            if closes_block {
                break;
            }
        }

        Ok(parsed)
    }

    /// Consume a block without examining it
    fn skip_block(&mut self) -> Result<()> {
        while let Some(token) = self.next_token()? {
            if token.is_punct("}") {
                break;
            }
            if token.is_punct("{") {
                self.skip_block()?;
            }
        }
        Ok(())
    }

    fn resolve_includes(&mut self, stmt: &mut Statement, ctx: &Context) -> Result<()> {
        let Some(arg) = stmt.args.first() else {
            return Ok(());
        };

        let pattern = include::resolve_pattern(self.dir, arg);
        let files = match include::expand(&pattern) {
            Ok(files) => files,
            Err(err) => {
                self.recover(Error::IncludeResolution {
                    reason: err.to_string(),
                    file: self.file.to_string(),
                    line: stmt.line,
                })?;
                Vec::new()
            }
        };

        let indices = files
            .into_iter()
            .map(|path| self.worklist.register(path, ctx))
            .collect();
        stmt.includes = Some(indices);
        Ok(())
    }
}

/// Strip the parentheses around an `if` condition
fn prepare_if_args(args: &mut Vec<String>) {
    let wrapped = match (args.first(), args.last()) {
        (Some(first), Some(last)) => first.starts_with('(') && last.ends_with(')'),
        _ => false,
    };
    if !wrapped {
        return;
    }

    args[0] = args[0][1..].trim_start().to_string();
    let last = args.len() - 1;
    args[last] = args[last]
        .strip_suffix(')')
        .unwrap_or(&args[last])
        .trim_end()
        .to_string();

    let start = usize::from(args[0].is_empty());
    let end = args.len() - usize::from(args[last].is_empty());
    if start >= end {
        args.clear();
    } else {
        args.truncate(end);
        args.drain(..start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::{LexError, Lexeme, Scanner};
    use crate::payload::Status;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        dir
    }

    fn parse_with(dir: &TempDir, options: ParseOptions) -> Payload {
        ConfigParser::new(options)
            .parse(dir.path().join("nginx.conf"))
            .unwrap()
    }

    fn parse(source: &str) -> Payload {
        let dir = fixture(&[("nginx.conf", source)]);
        parse_with(&dir, ParseOptions::default())
    }

    fn directives(stmts: &[Statement]) -> Vec<&str> {
        stmts.iter().map(|s| s.directive.as_str()).collect()
    }

    #[test]
    fn test_parse_empty() {
        let payload = parse("");
        assert!(payload.is_ok());
        assert_eq!(payload.config.len(), 1);
        assert!(payload.config[0].parsed.is_empty());
    }

    #[test]
    fn test_parse_tree() {
        let payload = parse(
            r#"
            user nginx;
            worker_processes 4;
            events {
                worker_connections 1024;
            }
            http {
                server {
                    listen 80;
                    server_name example.com www.example.com;
                    location / {
                        root /var/www/html;
                        try_files $uri $uri/ =404;
                    }
                }
            }
            "#,
        );

        assert_eq!(payload.status, Status::Ok);
        assert!(payload.errors.is_empty());

        let parsed = &payload.config[0].parsed;
        assert_eq!(directives(parsed), vec!["user", "worker_processes", "events", "http"]);
        assert_eq!(parsed[1].args, vec!["4"]);
        assert_eq!(parsed[1].line, 3);

        let server = &parsed[3].block.as_ref().unwrap()[0];
        let server_block = server.block.as_ref().unwrap();
        assert_eq!(directives(server_block), vec!["listen", "server_name", "location"]);
        assert_eq!(server_block[1].args, vec!["example.com", "www.example.com"]);

        let location = &server_block[2];
        assert_eq!(location.args, vec!["/"]);
        assert_eq!(location.block.as_ref().unwrap()[1].args, vec!["$uri", "$uri/", "=404"]);
    }

    #[test]
    fn test_unterminated_block() {
        let payload = parse("http {\n    server {\n        listen 80;\n    }\n");
        assert_eq!(payload.status, Status::Failed);
        assert_eq!(payload.errors.len(), 1);
        assert!(payload.errors[0].error.starts_with("unexpected end of file, expecting \"}\""));
        assert_eq!(payload.errors[0].line, Some(4));
        assert!(payload.config[0].parsed.is_empty());
    }

    #[test]
    fn test_stray_close() {
        let payload = parse("user nginx;\n}\n");
        assert_eq!(payload.status, Status::Failed);
        assert!(payload.errors[0].error.starts_with("unexpected \"}\""));
        assert_eq!(payload.errors[0].line, Some(2));
    }

    #[test]
    fn test_missing_terminator_at_eof() {
        let payload = parse("worker_processes 4");
        assert_eq!(payload.status, Status::Failed);
        let expected = "unexpected end of file, expecting \";\" or \"}\"";
        assert!(payload.errors[0].error.starts_with(expected));
    }

    #[test]
    fn test_recovers_and_skips_block() {
        let payload = parse(
            concat!(
                "http {\n",
                "    listen 80 {\n",
                "        bogus;\n",
                "    }\n",
                "    gzip on;\n",
                "}\n",
                "worker_processes 2;\n",
            ),
        );
        assert_eq!(payload.status, Status::Failed);
        assert_eq!(payload.errors.len(), 1);
        assert_eq!(payload.errors[0].line, Some(2));
        assert_eq!(payload.config[0].errors.len(), 1);
        assert_eq!(payload.config[0].status, Status::Failed);

        let parsed = &payload.config[0].parsed;
        assert_eq!(directives(parsed), vec!["http", "worker_processes"]);
        assert_eq!(directives(parsed[0].block.as_ref().unwrap()), vec!["gzip"]);
    }

    #[test]
    fn test_block_directive_in_wrong_context_skips_block() {
        let payload = parse("server {\n    listen 80;\n}\nworker_processes 1;\n");
        assert_eq!(payload.errors.len(), 1);
        assert!(payload.errors[0].error.contains("\"server\" directive is not allowed here"));
        assert_eq!(directives(&payload.config[0].parsed), vec!["worker_processes"]);
    }

    #[test]
    fn test_raise_mode() {
        let dir = fixture(&[("nginx.conf", "worker_processes 1 2;\n")]);
        let options = ParseOptions {
            catch_errors: false,
            ..Default::default()
        };
        let err = ConfigParser::new(options)
            .parse(dir.path().join("nginx.conf"))
            .unwrap_err();
        assert!(matches!(err, Error::DirectiveArguments { line: 1, .. }));
    }

    #[test]
    fn test_strict_mode() {
        let source = "http {\n    frobnicate on;\n}\n";
        let payload = parse(source);
        assert!(payload.is_ok());
        assert_eq!(payload.config[0].parsed[0].block.as_ref().unwrap()[0].directive, "frobnicate");

        let dir = fixture(&[("nginx.conf", source)]);
        let payload = parse_with(&dir, ParseOptions {
            strict: true,
            ..Default::default()
        });
        assert_eq!(payload.status, Status::Failed);
        assert!(payload.errors[0].error.starts_with("unknown directive \"frobnicate\""));
        assert!(payload.config[0].parsed[0].block.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_ignored_directives() {
        let dir = fixture(&[(
            "nginx.conf",
            concat!(
                "http {\n",
                "    access_log off;\n",
                "    server {\n",
                "        bogus_in_server x y z {\n",
                "        }\n",
                "        listen 80;\n",
                "    }\n",
                "}\n",
            ),
        )]);
        let payload = parse_with(&dir, ParseOptions {
            ignore: vec!["access_log".to_string(), "server".to_string()],
            strict: true,
            ..Default::default()
        });
        assert!(payload.is_ok());
        assert!(payload.config[0].parsed[0].block.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_comments() {
        let source = "# top\nuser nginx; # after user\nworker_processes 1 # inside\n;\n";
        let payload = parse(source);
        // comments among arguments are always kept, top-level ones only on request
        assert_eq!(directives(&payload.config[0].parsed), vec!["user", "worker_processes", "#"]);
        assert_eq!(payload.config[0].parsed[1].args, vec!["1"]);
        assert_eq!(payload.config[0].parsed[2].comment.as_deref(), Some(" inside"));
        assert_eq!(payload.config[0].parsed[2].line, 3);

        let dir = fixture(&[("nginx.conf", source)]);
        let payload = parse_with(&dir, ParseOptions {
            comments: true,
            ..Default::default()
        });
        let parsed = &payload.config[0].parsed;
        assert_eq!(directives(parsed), vec!["#", "user", "#", "worker_processes", "#"]);
        assert_eq!(parsed[0].comment.as_deref(), Some(" top"));
        assert_eq!(parsed[2].comment.as_deref(), Some(" after user"));
        assert_eq!(parsed[2].line, 2);
    }

    #[test]
    fn test_if_arguments() {
        let payload = parse(
            concat!(
                "http {\n",
                "    server {\n",
                "        if ($request_method = POST) {\n",
                "            return 405;\n",
                "        }\n",
                "        if ( $slow ) { return 444; }\n",
                "    }\n",
                "}\n",
            ),
        );
        assert!(payload.is_ok());
        let server = &payload.config[0].parsed[0].block.as_ref().unwrap()[0];
        let block = server.block.as_ref().unwrap();
        assert_eq!(block[0].args, vec!["$request_method", "=", "POST"]);
        assert_eq!(block[1].args, vec!["$slow"]);
    }

    #[test]
    fn test_prepare_if_args() {
        let mut args = vec!["($a)".to_string()];
        prepare_if_args(&mut args);
        assert_eq!(args, vec!["$a"]);

        let mut args = vec!["(".to_string(), "$a".to_string(), ")".to_string()];
        prepare_if_args(&mut args);
        assert_eq!(args, vec!["$a"]);

        let mut args = vec!["()".to_string()];
        prepare_if_args(&mut args);
        assert!(args.is_empty());

        let mut args = vec!["$a".to_string()];
        prepare_if_args(&mut args);
        assert_eq!(args, vec!["$a"]);
    }

    #[test]
    fn test_nested_location_context() {
        let payload = parse(
            concat!(
                "http {\n",
                "    server {\n",
                "        location / {\n",
                "            location /api {\n",
                "                proxy_pass http://backend;\n",
                "            }\n",
                "        }\n",
                "    }\n",
                "}\n",
            ),
        );
        assert!(payload.is_ok(), "{:?}", payload.errors);
    }

    #[test]
    fn test_statement_closed_by_brace() {
        let payload = parse("http {\n    frobnicate x }\nworker_processes 1;\n");
        assert!(payload.is_ok());
        let parsed = &payload.config[0].parsed;
        assert_eq!(directives(parsed), vec!["http", "worker_processes"]);
        assert_eq!(parsed[0].block.as_ref().unwrap()[0].args, vec!["x"]);
    }

    #[test]
    fn test_include_literal_and_glob() {
        let dir = fixture(&[
            (
                "nginx.conf",
                concat!(
                    "events {}\n",
                    "http {\n",
                    "    include mime.types;\n",
                    "    include conf.d/*.conf;\n",
                    "}\n",
                ),
            ),
            ("mime.types", "types {\n    text/html html;\n}\n"),
            ("conf.d/b.conf", "server {\n    listen 8081;\n}\n"),
            ("conf.d/a.conf", "server {\n    listen 8080;\n}\n"),
        ]);
        let payload = parse_with(&dir, ParseOptions::default());
        assert!(payload.is_ok(), "{:?}", payload.errors);
        assert_eq!(payload.config.len(), 4);

        let http = &payload.config[0].parsed[1].block.as_ref().unwrap();
        assert_eq!(http[0].includes, Some(vec![1]));
        assert_eq!(http[1].includes, Some(vec![2, 3]));
        assert!(payload.config[2].file.ends_with("a.conf"));
        assert!(payload.config[3].file.ends_with("b.conf"));
        // included servers validate in the http context
        assert_eq!(payload.config[2].parsed[0].directive, "server");
    }

    #[test]
    fn test_include_relative_to_including_file() {
        let dir = fixture(&[
            ("nginx.conf", "http {\n    include sites/site.conf;\n}\n"),
            ("sites/site.conf", "server {\n    include common.conf;\n}\n"),
            ("sites/common.conf", "listen 80;\n"),
        ]);
        let payload = parse_with(&dir, ParseOptions::default());
        assert!(payload.is_ok(), "{:?}", payload.errors);
        assert_eq!(payload.config.len(), 3);
        assert!(payload.config[2].file.ends_with("common.conf"));
    }

    #[test]
    fn test_include_parsed_once() {
        let dir = fixture(&[
            (
                "nginx.conf",
                concat!(
                    "http {\n",
                    "    include common.conf;\n",
                    "    server {\n",
                    "        listen 80;\n",
                    "    }\n",
                    "    include common.conf;\n",
                    "}\n",
                ),
            ),
            ("common.conf", "gzip on;\n"),
        ]);
        let payload = parse_with(&dir, ParseOptions::default());
        assert!(payload.is_ok());
        assert_eq!(payload.config.len(), 2);

        let http = payload.config[0].parsed[0].block.as_ref().unwrap();
        assert_eq!(http[0].includes, Some(vec![1]));
        assert_eq!(http[2].includes, Some(vec![1]));
    }

    #[test]
    fn test_include_missing_and_empty_glob() {
        let dir = fixture(&[(
            "nginx.conf",
            "http {\n    include missing.conf;\n    include conf.d/*.conf;\n    gzip on;\n}\n",
        )]);
        let payload = parse_with(&dir, ParseOptions::default());
        assert_eq!(payload.status, Status::Failed);
        assert_eq!(payload.errors.len(), 1);
        assert_eq!(payload.errors[0].line, Some(2));
        assert!(payload.errors[0].error.contains("missing.conf"));
        assert_eq!(payload.config.len(), 1);

        let http = payload.config[0].parsed[0].block.as_ref().unwrap();
        assert_eq!(http[0].includes, Some(vec![]));
        assert_eq!(http[1].includes, Some(vec![]));
        assert_eq!(http[2].directive, "gzip");
    }

    #[test]
    fn test_include_inherits_context() {
        let dir = fixture(&[
            ("nginx.conf", "http {\n    include bad.conf;\n}\n"),
            ("bad.conf", "worker_processes 1;\n"),
        ]);
        let payload = parse_with(&dir, ParseOptions::default());
        assert_eq!(payload.status, Status::Failed);
        assert!(payload.errors[0].file.ends_with("bad.conf"));
        let expected = "\"worker_processes\" directive is not allowed here";
        assert!(payload.errors[0].error.contains(expected));
        assert_eq!(payload.config[0].status, Status::Ok);
        assert_eq!(payload.config[1].status, Status::Failed);
    }

    #[test]
    fn test_single_file_mode() {
        let dir = fixture(&[
            ("nginx.conf", "http {\n    include common.conf;\n}\n"),
            ("common.conf", "gzip on;\n"),
        ]);
        let payload = parse_with(&dir, ParseOptions {
            single: true,
            ..Default::default()
        });
        assert_eq!(payload.config.len(), 1);
        let include = &payload.config[0].parsed[0].block.as_ref().unwrap()[0];
        assert_eq!(include.directive, "include");
        assert!(include.includes.is_none());
    }

    #[test]
    fn test_unreadable_root() {
        let dir = tempfile::tempdir().unwrap();
        let payload = ConfigParser::default()
            .parse(dir.path().join("nope.conf"))
            .unwrap();
        assert_eq!(payload.status, Status::Failed);
        assert_eq!(payload.config.len(), 1);
        assert_eq!(payload.config[0].status, Status::Failed);
        assert_eq!(payload.errors[0].line, None);
    }

    #[test]
    fn test_failed_include_does_not_stop_run() {
        let dir = fixture(&[
            ("nginx.conf", "http {\n    include a.conf;\n    include b.conf;\n}\n"),
            ("a.conf", "server {\n"),
            ("b.conf", "gzip on;\n"),
        ]);
        let payload = parse_with(&dir, ParseOptions::default());
        assert_eq!(payload.status, Status::Failed);
        assert_eq!(payload.config.len(), 3);
        assert_eq!(payload.config[1].status, Status::Failed);
        assert_eq!(payload.config[2].status, Status::Ok);
        assert_eq!(payload.config[2].parsed[0].directive, "gzip");
    }

    #[test]
    fn test_combine_marks_origin_file() {
        let dir = fixture(&[
            ("nginx.conf", "http {\n    include common.conf;\n}\n"),
            ("common.conf", "gzip on;\n"),
        ]);
        let payload = parse_with(&dir, ParseOptions {
            combine: true,
            ..Default::default()
        });
        assert_eq!(payload.config.len(), 1);
        let http = &payload.config[0].parsed[0];
        let gzip = &http.block.as_ref().unwrap()[0];
        assert_eq!(gzip.directive, "gzip");
        assert!(gzip.file.as_deref().unwrap().ends_with("common.conf"));
        assert!(http.file.as_deref().unwrap().ends_with("nginx.conf"));
    }

    /// Everything up to `;` becomes a single argument
    struct RawStatement;

    impl DirectiveLexer for RawStatement {
        fn lex(
            &self,
            _directive: &str,
            scanner: &mut Scanner<'_>,
        ) -> std::result::Result<Vec<Token>, LexError> {
            let line = scanner.line();
            let mut text = String::new();
            while let Some(piece) = scanner.next_piece() {
                if piece.kind == Lexeme::Semicolon {
                    return Ok(vec![
                        Token::new(text.trim(), line, true),
                        Token::new(";", piece.line, false),
                    ]);
                }
                text.push_str(piece.text);
            }
            Err(LexError::Custom("raw statement is not terminated".to_string()))
        }
    }

    #[test]
    fn test_custom_lexer() {
        let dir = fixture(&[(
            "nginx.conf",
            concat!(
                "http {\n",
                "    lua_block ngx.say(\"{ok}\") {x};\n",
                "    lua_block;\n",
                "    gzip on;\n",
                "}\n",
            ),
        )]);
        let payload = ConfigParser::new(ParseOptions::default())
            .with_lexer("lua_block", Arc::new(RawStatement))
            .parse(dir.path().join("nginx.conf"))
            .unwrap();
        assert!(payload.is_ok(), "{:?}", payload.errors);

        let http = payload.config[0].parsed[0].block.as_ref().unwrap();
        assert_eq!(directives(http), vec!["lua_block", "lua_block", "gzip"]);
        assert_eq!(http[0].args, vec!["ngx.say(\"{ok}\") {x}"]);
        assert_eq!(http[0].line, 2);
        // a statement ending right after the name never reaches the lexer
        assert!(http[1].args.is_empty());
        assert_eq!(http[2].args, vec!["on"]);
    }

    #[test]
    fn test_custom_lexer_error_fails_file() {
        let dir = fixture(&[("nginx.conf", "http {\n    lua_block ngx.exit(0)\n")]);
        let payload = ConfigParser::new(ParseOptions::default())
            .with_lexer("lua_block", Arc::new(RawStatement))
            .parse(dir.path().join("nginx.conf"))
            .unwrap();
        assert_eq!(payload.status, Status::Failed);
        assert!(payload.errors[0].error.starts_with("raw statement is not terminated"));
        assert!(payload.config[0].parsed.is_empty());
    }
}
