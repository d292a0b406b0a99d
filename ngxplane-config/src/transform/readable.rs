use crate::parser::ast::Statement;
use crate::payload::{FileParseResult, Payload, PayloadError, Status};
use serde::Serialize;
use serde_json::{Map, Value};

/// Directives keyed together with their first argument
const SELECTOR_DIRECTIVES: &[&str] = &["location", "if"];

const FAILED_MESSAGE: &str = "Parsing failed - see errors above";

/// Simplified view of a payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Readable {
    Parsed {
        status: Status,
        nginx: Map<String, Value>,
        info: ReadableInfo,
    },
    Failed {
        status: Status,
        errors: Vec<PayloadError>,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadableInfo {
    pub main_file: String,
    pub included_files: Vec<String>,
    pub total_files_processed: usize,
    pub parsing_successful: bool,
}

/// Build the nested map view of a successful payload
///
/// Keys are directive names, or `"name arg"` for `location` and `if`. A block
/// becomes a nested map, an include becomes the merged content of the files
/// it pulled in, and arguments become `null`, a string or a list. Later keys
/// overwrite earlier ones.
pub fn readable(payload: &Payload) -> Readable {
    if !payload.is_ok() {
        return Readable::Failed {
            status: payload.status,
            errors: payload.errors.clone(),
            message: FAILED_MESSAGE.to_string(),
        };
    }

    let (main_file, nginx) = match payload.config.first() {
        Some(main) => {
            let mut stack = vec![0];
            (main.file.clone(), to_map(&main.parsed, &payload.config, &mut stack))
        }
        None => (String::new(), Map::new()),
    };

    Readable::Parsed {
        status: payload.status,
        nginx,
        info: ReadableInfo {
            main_file,
            included_files: payload.included_files().map(String::from).collect(),
            total_files_processed: payload.config.len(),
            parsing_successful: true,
        },
    }
}

fn to_map(
    block: &[Statement],
    config: &[FileParseResult],
    stack: &mut Vec<usize>,
) -> Map<String, Value> {
    let mut map = Map::new();

    for stmt in block {
        let first = stmt.args.first();
        let key = match first {
            Some(arg) if SELECTOR_DIRECTIVES.contains(&stmt.directive.as_str()) => {
                format!("{} {}", stmt.directive, arg)
            }
            _ => stmt.directive.clone(),
        };

        let inner = stmt.block.as_deref().filter(|inner| !inner.is_empty());
        let includes = stmt.includes.as_deref().filter(|includes| !includes.is_empty());

        if let Some(inner) = inner {
            map.insert(key, Value::Object(to_map(inner, config, stack)));
        } else if let Some(includes) = includes {
            let mut merged = Map::new();
            for &index in includes {
                if stack.contains(&index) {
                    continue;
                }
                let Some(included) = config.get(index) else {
                    continue;
                };
                stack.push(index);
                merged.extend(to_map(&included.parsed, config, stack));
                stack.pop();
            }

            let key = match first {
                Some(arg) => format!("{} {}", stmt.directive, arg),
                None => key,
            };
            map.insert(key, Value::Object(merged));
        } else {
            map.insert(key, args_value(&stmt.args));
        }
    }

    map
}

fn args_value(args: &[String]) -> Value {
    match args {
        [] => Value::Null,
        [arg] => Value::String(arg.clone()),
        _ => Value::Array(args.iter().cloned().map(Value::String).collect()),
    }
}
