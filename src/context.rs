use serde_json::Value;
use std::fmt;

/// The data a rule is evaluated against. Scoped operators (`map`, `filter`,
/// `reduce`, ...) evaluate their body against a fresh context built from each
/// element.
#[derive(Clone, Copy, Debug)]
pub struct Context<'a> {
    data: &'a Value,
}

impl<'a> Context<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &'a Value {
        self.data
    }

    /// Resolve a dotted path; `None` on any miss.
    pub fn resolve(&self, path: &str) -> Option<&'a Value> {
        walk(self.data, path).ok()
    }
}

/// Why a dotted path failed to resolve. `at` is the prefix that did resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum Miss {
    Key { at: String, key: String },
    IndexOutOfRange { at: String, index: usize, len: usize },
    NotAnIndex { at: String, segment: String },
    Primitive { at: String, segment: String, kind: &'static str },
}

impl fmt::Display for Miss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Miss::Key { at, key } => write!(f, "key \"{key}\" not found at {}", show(at)),
            Miss::IndexOutOfRange { at, index, len } => write!(
                f,
                "index {index} out of range at {} (length {len})",
                show(at)
            ),
            Miss::NotAnIndex { at, segment } => write!(
                f,
                "\"{segment}\" is not a valid array index at {}",
                show(at)
            ),
            Miss::Primitive { at, segment, kind } => write!(
                f,
                "cannot read \"{segment}\" from {kind} at {}",
                show(at)
            ),
        }
    }
}

fn show(at: &str) -> String {
    if at.is_empty() {
        "<root>".to_string()
    } else {
        format!("\"{at}\"")
    }
}

/// Walk `path` segment by segment. The empty path is the data itself.
pub fn walk<'a>(data: &'a Value, path: &str) -> Result<&'a Value, Miss> {
    if path.is_empty() {
        return Ok(data);
    }
    let mut current = data;
    let mut at = String::new();
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment).ok_or_else(|| Miss::Key {
                at: at.clone(),
                key: segment.to_string(),
            })?,
            Value::Array(items) => {
                let index = segment.parse::<usize>().map_err(|_| Miss::NotAnIndex {
                    at: at.clone(),
                    segment: segment.to_string(),
                })?;
                items.get(index).ok_or_else(|| Miss::IndexOutOfRange {
                    at: at.clone(),
                    index,
                    len: items.len(),
                })?
            }
            other => {
                return Err(Miss::Primitive {
                    at,
                    segment: segment.to_string(),
                    kind: kind_of(other),
                })
            }
        };
        if !at.is_empty() {
            at.push('.');
        }
        at.push_str(segment);
    }
    Ok(current)
}

pub fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
