//! Statement validation against the grammar table
//!
//! Checks that a directive is allowed in its context, that its terminator
//! matches the grammar (`{` for blocks, `;` otherwise) and that it has an
//! acceptable number of arguments.

use crate::parser::ast::Statement;
use crate::parser::grammar::{self, Context, Mask};
use ngxplane_core::{Error, ParseOptions, Result};

/// Per-run validation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analyzer {
    strict: bool,
    check_ctx: bool,
    check_args: bool,
}

impl Analyzer {
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            strict: options.strict,
            check_ctx: options.check_ctx,
            check_args: options.check_args,
        }
    }

    /// Validate one statement terminated by `term` inside `ctx`
    pub fn analyze(&self, file: &str, stmt: &Statement, term: &str, ctx: &Context) -> Result<()> {
        let directive = stmt.directive.as_str();
        let line = stmt.line;
        let declared = grammar::directive_masks(directive);

        if self.strict && declared.is_none() {
            return Err(Error::DirectiveUnknown {
                reason: format!("unknown directive \"{}\"", directive),
                file: file.to_string(),
                line,
            });
        }

        // Unknown contexts and directives are not examined
        let (Some(ctx_mask), Some(declared)) = (ctx.mask(), declared) else {
            return Ok(());
        };

        let masks: Vec<Mask> = if self.check_ctx {
            let allowed: Vec<Mask> = declared
                .iter()
                .copied()
                .filter(|mask| mask.intersects(ctx_mask))
                .collect();
            if allowed.is_empty() {
                return Err(Error::DirectiveContext {
                    reason: format!("\"{}\" directive is not allowed here", directive),
                    file: file.to_string(),
                    line,
                });
            }
            allowed
        } else {
            declared.to_vec()
        };

        if !self.check_args {
            return Ok(());
        }

        let args = &stmt.args;
        let n_args = args.len();
        let flag_arg = args.first().filter(|_| n_args == 1);
        let mut reason = String::new();

        // The message of the last mask examined is the one reported
        for mask in masks.iter().rev() {
            if mask.contains(Mask::BLOCK) && term != "{" {
                reason = format!("directive \"{}\" has no opening \"{{\"", directive);
                continue;
            }
            if !mask.contains(Mask::BLOCK) && term != ";" {
                reason = format!("directive \"{}\" is not terminated by \";\"", directive);
                continue;
            }

            let valid_flag = flag_arg.is_some_and(|arg| is_flag(arg));
            if mask.takes(n_args)
                || (mask.contains(Mask::FLAG) && valid_flag)
                || mask.contains(Mask::ANY)
                || (mask.contains(Mask::ONE_OR_MORE) && n_args >= 1)
                || (mask.contains(Mask::TWO_OR_MORE) && n_args >= 2)
            {
                return Ok(());
            }

            reason = match flag_arg {
                Some(arg) if mask.contains(Mask::FLAG) => format!(
                    "invalid value \"{}\" in \"{}\" directive, it must be \"on\" or \"off\"",
                    arg, directive
                ),
                _ => format!("invalid number of arguments in \"{}\" directive", directive),
            };
        }

        Err(Error::DirectiveArguments {
            reason,
            file: file.to_string(),
            line,
        })
    }
}

fn is_flag(arg: &str) -> bool {
    arg.eq_ignore_ascii_case("on") || arg.eq_ignore_ascii_case("off")
}
