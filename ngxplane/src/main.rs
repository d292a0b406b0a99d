//! ngxplane - nginx-style configuration parser
//!
//! This is the main entry point for the ngxplane CLI.

use anyhow::Context as _;
use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ngxplane_config::parser::{read_source, Lexer, LexerRegistry};
use ngxplane_config::PayloadError;
use ngxplane_core::{ConfigLoader, OutputFormat, ParseOptions};
use std::collections::HashMap;
use std::ops::Range;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// ngxplane - parse nginx-style configuration files into JSON
#[derive(Parser)]
#[command(name = "ngxplane")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a configuration file and print the result as JSON
    Parse {
        /// Path to the root configuration file
        path: PathBuf,

        #[command(flatten)]
        args: ParseArgs,

        /// Output form
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Validate a configuration file and report every error
    Check {
        /// Path to the root configuration file
        path: PathBuf,

        #[command(flatten)]
        args: ParseArgs,
    },

    /// Print the tokens of a single file
    Lex {
        /// Path to the file
        path: PathBuf,
    },

    /// Show version information
    Version,
}

/// Parser flags shared by `parse` and `check`
#[derive(Args, Debug, Default)]
struct ParseArgs {
    /// Load parse options from a TOML or JSON file; flags override it
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Keep comments as `#` statements
    #[arg(long)]
    comments: bool,

    /// Do not follow include directives
    #[arg(long)]
    single: bool,

    /// Drop a directive (and its block) from the output
    #[arg(long, value_name = "NAME")]
    ignore: Vec<String>,

    /// Reject directives missing from the grammar
    #[arg(long)]
    strict: bool,

    /// Inline included files into the root file
    #[arg(long)]
    combine: bool,

    /// Stop at the first error
    #[arg(long)]
    raise: bool,

    /// Skip context validation
    #[arg(long)]
    no_check_ctx: bool,

    /// Skip argument validation
    #[arg(long)]
    no_check_args: bool,
}

impl ParseArgs {
    fn options(&self) -> anyhow::Result<ParseOptions> {
        let mut options = match &self.options {
            Some(path) => ConfigLoader::load(path)?,
            None => ParseOptions::default(),
        };

        options.comments |= self.comments;
        options.single |= self.single;
        options.strict |= self.strict;
        options.combine |= self.combine;
        options.ignore.extend(self.ignore.iter().cloned());
        if self.raise {
            options.catch_errors = false;
        }
        if self.no_check_ctx {
            options.check_ctx = false;
        }
        if self.no_check_args {
            options.check_args = false;
        }
        Ok(options)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Readable,
    Crossplane,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Readable => OutputFormat::Readable,
            FormatArg::Crossplane => OutputFormat::Crossplane,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, stdout carries the JSON
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    match cli.command {
        Commands::Parse {
            path,
            args,
            format,
            compact,
        } => {
            let mut options = args.options()?;
            if let Some(format) = format {
                options.format = format.into();
            }
            tracing::debug!("Parsing {} with {:?}", path.display(), options);

            let value = ngxplane_config::run(&path, &options)?;
            let output = if compact {
                serde_json::to_string(&value)?
            } else {
                serde_json::to_string_pretty(&value)?
            };
            println!("{}", output);
        }

        Commands::Check { path, args } => {
            let options = args.options()?;
            tracing::info!("Validating config: {}", path.display());

            let errors = match ngxplane_config::parse(&path, &options) {
                Ok(payload) => payload.errors,
                Err(err) => vec![PayloadError {
                    file: err
                        .file()
                        .map(String::from)
                        .unwrap_or_else(|| path.display().to_string()),
                    error: err.to_string(),
                    line: err.line(),
                }],
            };

            if errors.is_empty() {
                println!("✅ Configuration '{}' is valid!", path.display());
            } else {
                report_errors(&errors);
                eprintln!("❌ {} error(s) in '{}'", errors.len(), path.display());
                std::process::exit(1);
            }
        }

        Commands::Lex { path } => {
            let file = path.display().to_string();
            let source = read_source(&path).with_context(|| format!("Failed to read {}", file))?;
            let lexers = LexerRegistry::new();
            for token in Lexer::new(&source, &file, &lexers) {
                let token = token?;
                println!("{}", serde_json::to_string(&(&token.text, token.line, token.quoted))?);
            }
        }

        Commands::Version => {
            println!("ngxplane v{}", ngxplane_core::VERSION);
        }
    }

    Ok(())
}

/// Render errors against the lines they point at
fn report_errors(errors: &[PayloadError]) {
    let mut sources: HashMap<&str, Option<String>> = HashMap::new();

    for err in errors {
        let source = sources
            .entry(err.file.as_str())
            .or_insert_with(|| read_source(err.file.as_ref()).ok());

        let (Some(source), Some(line)) = (source.as_deref(), err.line) else {
            eprintln!("❌ {}", err.error);
            continue;
        };

        let file = err.file.as_str();
        let suffix = format!(" in {}:{}", file, line);
        let reason = err.error.strip_suffix(&suffix).unwrap_or(&err.error);
        let span = line_span(source, line);

        let report = Report::build(ReportKind::Error, (file, span.clone()))
            .with_message(&err.error)
            .with_label(Label::new((file, span)).with_message(reason).with_color(Color::Red))
            .finish();
        if let Err(e) = report.eprint((file, Source::from(source))) {
            tracing::error!("Failed to render error report: {}", e);
            eprintln!("❌ {}", err.error);
        }
    }
}

/// Character range of a 1-based line
fn line_span(source: &str, line: usize) -> Range<usize> {
    let mut start = 0;
    for (index, text) in source.split('\n').enumerate() {
        let len = text.chars().count();
        if index + 1 == line {
            return start..start + len;
        }
        start += len + 1;
    }
    let end = source.chars().count();
    end..end
}
