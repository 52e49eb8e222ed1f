use crate::comparison::stringify;
use crate::context::walk;
use crate::operators::arguments;
use serde_json::Value;

/// Check every literal `var` path in `rule` against `data`, returning one
/// human-readable warning per path that does not resolve.
///
/// Each path stops at its first failing segment. Dynamic paths (computed by
/// a nested rule) and the empty path are skipped, since they have no literal
/// form to check.
pub fn check_data_paths(rule: &Value, data: &Value) -> Vec<String> {
    let mut warnings = Vec::new();
    collect(rule, data, &mut warnings);
    warnings
}

fn collect(node: &Value, data: &Value, out: &mut Vec<String>) {
    match node {
        Value::Array(items) => {
            for item in items {
                collect(item, data, out);
            }
        }
        // Only the first key is an operator; the rest are never evaluated.
        Value::Object(map) => {
            let Some((key, value)) = map.iter().next() else {
                return;
            };
            if key == "var" {
                if let Some(path) = literal_path(value) {
                    if let Err(miss) = walk(data, &path) {
                        out.push(format!("var \"{path}\": {miss}"));
                    }
                }
            }
            collect(value, data, out);
        }
        _ => {}
    }
}

fn literal_path(value: &Value) -> Option<String> {
    match arguments(value).first()? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        n @ Value::Number(_) => Some(stringify(n)),
        _ => None,
    }
}
