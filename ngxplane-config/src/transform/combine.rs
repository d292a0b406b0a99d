use crate::parser::ast::Statement;
use crate::payload::{FileParseResult, Payload, Status};

/// Inline included files into the first file of the payload
///
/// Statements carrying `includes` are replaced by the statements of the files
/// they reference, recursively. Only what the first file reaches is kept, but
/// the errors of every file are gathered on the combined result.
pub fn combine(payload: Payload) -> Payload {
    let Payload {
        status,
        errors,
        config,
    } = payload;

    let Some(first) = config.first() else {
        return Payload {
            status,
            errors,
            config,
        };
    };

    let mut combined = FileParseResult::new(first.file.clone());
    for parsing in &config {
        combined.errors.extend(parsing.errors.iter().cloned());
        if parsing.status == Status::Failed {
            combined.status = Status::Failed;
        }
    }

    let mut stack = vec![0];
    combined.parsed = inline(&first.parsed, &config, &mut stack);

    tracing::debug!(
        "Combined {} file(s) into {}",
        config.len(),
        combined.file
    );

    Payload {
        status,
        errors,
        config: vec![combined],
    }
}

/// `stack` holds the files being inlined; a file never inlines itself
fn inline(
    block: &[Statement],
    config: &[FileParseResult],
    stack: &mut Vec<usize>,
) -> Vec<Statement> {
    let mut out = Vec::with_capacity(block.len());

    for stmt in block {
        let Some(includes) = &stmt.includes else {
            let mut stmt = stmt.clone();
            if let Some(inner) = &stmt.block {
                stmt.block = Some(inline(inner, config, stack));
            }
            out.push(stmt);
            continue;
        };

        for &index in includes {
            if stack.contains(&index) {
                tracing::warn!("Include cycle through file #{} cut at line {}", index, stmt.line);
                continue;
            }
            let Some(included) = config.get(index) else {
                continue;
            };
            stack.push(index);
            out.extend(inline(&included.parsed, config, stack));
            stack.pop();
        }
    }

    out
}
