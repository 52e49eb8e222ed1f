//! Static structural checks over a rule tree.
//!
//! Validation never evaluates an operator and never fails: every problem is
//! collected into a [`ValidationReport`]. Errors make a rule invalid, warnings
//! are advisory.

use crate::context::kind_of;
use crate::operators::{arguments, builtin_names, Operator};
use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One finding. `path` locates the offending node, e.g. `root.and[0].>[1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub message: String,
    pub path: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl ValidationReport {
    fn empty() -> Self {
        Self { valid: true, errors: Vec::new(), warnings: Vec::new() }
    }

    fn error(&mut self, path: &str, message: String) {
        self.valid = false;
        self.errors.push(ValidationError {
            message,
            path: path.to_string(),
            severity: Severity::Error,
        });
    }

    fn warn(&mut self, path: &str, message: String) {
        self.warnings.push(ValidationError {
            message,
            path: path.to_string(),
            severity: Severity::Warning,
        });
    }
}

/// Validator configured with an allowlist of extra operator names on top of
/// the built-ins.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    custom: BTreeSet<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_custom_operators<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.custom.extend(names.into_iter().map(Into::into));
        self
    }

    /// Every recognised operator name, sorted.
    pub fn known_operators(&self) -> Vec<String> {
        builtin_names()
            .map(str::to_string)
            .chain(self.custom.iter().cloned())
            .sorted()
            .dedup()
            .collect()
    }

    pub fn validate(&self, rule: &Value) -> ValidationReport {
        let mut report = ValidationReport::empty();
        self.walk(rule, "root", &mut report);
        debug!(
            valid = report.valid,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "validated rule"
        );
        report
    }

    fn is_known(&self, name: &str) -> bool {
        Operator::from_name(name).is_some() || self.custom.contains(name)
    }

    fn walk(&self, node: &Value, path: &str, report: &mut ValidationReport) {
        let map = match node {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.walk(item, &format!("{path}[{i}]"), report);
                }
                return;
            }
            Value::Object(map) => map,
            _ => return,
        };
        let Some((name, value)) = map.iter().next() else {
            return;
        };

        if map.len() > 1 {
            report.warn(
                path,
                format!(
                    "object has {} keys; only the first (\"{name}\") is used as the operator",
                    map.len()
                ),
            );
        }

        if !self.is_known(name) {
            report.error(
                path,
                format!(
                    "unknown operator \"{name}\"; valid operators are: {}",
                    self.known_operators().join(", ")
                ),
            );
            return;
        }

        let args = arguments(value);
        if let Some(op) = Operator::from_name(name) {
            let arity = op.arity();
            if args.len() < arity.min {
                report.error(
                    path,
                    format!(
                        "operator \"{name}\" requires at least {} argument(s), got {}",
                        arity.min,
                        args.len()
                    ),
                );
            }
            if let Some(max) = arity.max.filter(|max| args.len() > *max) {
                report.error(
                    path,
                    format!(
                        "operator \"{name}\" accepts at most {max} argument(s), got {}",
                        args.len()
                    ),
                );
            }
            check_shape(op, args, path, report);
        }

        if value.is_array() {
            for (i, arg) in args.iter().enumerate() {
                self.walk(arg, &format!("{path}.{name}[{i}]"), report);
            }
        } else {
            self.walk(value, &format!("{path}.{name}"), report);
        }
    }
}

fn check_shape(op: Operator, args: &[Value], path: &str, report: &mut ValidationReport) {
    match op {
        Operator::Var => {
            if let Some(first @ (Value::Bool(_) | Value::Array(_))) = args.first() {
                report.warn(
                    path,
                    format!(
                        "\"var\" path should be a string, number or null, got {}",
                        kind_of(first)
                    ),
                );
            }
        }
        Operator::MissingSome => {
            if args.first().is_some_and(|v| !v.is_number()) {
                report.error(
                    path,
                    "\"missing_some\" first argument (minimum required) must be a number".to_string(),
                );
            }
            if args.get(1).is_some_and(|v| !v.is_array()) {
                report.error(
                    path,
                    "\"missing_some\" second argument (keys) must be an array".to_string(),
                );
            }
        }
        Operator::If | Operator::Ternary => {
            if args.len() >= 3 && args.len() % 2 == 0 {
                report.warn(
                    path,
                    format!(
                        "\"{}\" has an even number of arguments ({}); there is no else branch",
                        op.name(),
                        args.len()
                    ),
                );
            }
        }
        // Heuristic: a substring search over the serialized reducer. String
        // literals mentioning either name also satisfy it.
        Operator::Reduce => {
            if let Some(reducer @ Value::Object(_)) = args.get(1) {
                let text = reducer.to_string();
                if !text.contains("accumulator") && !text.contains("current") {
                    report.warn(
                        path,
                        "\"reduce\" reducer references neither \"accumulator\" nor \"current\"".to_string(),
                    );
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn validate(rule: Value) -> ValidationReport {
        Validator::new().validate(&rule)
    }

    #[test]
    fn primitives_and_literals_are_valid() {
        for rule in [json!(null), json!(true), json!(3), json!("x"), json!({}), json!([1, "a"])] {
            let report = validate(rule);
            assert!(report.valid);
            assert!(report.errors.is_empty() && report.warnings.is_empty());
        }
    }

    #[test]
    fn unknown_operator_lists_known_ones_and_stops() {
        let report = validate(json!({"unknown_op": [{"also_unknown": 1}]}));
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        let err = &report.errors[0];
        assert_eq!(err.path, "root");
        assert_eq!(err.severity, Severity::Error);
        assert!(err.message.contains("\"unknown_op\""));
        assert!(err.message.contains("!, !!, !=, !==, %"));
        assert!(err.message.contains("var"));
    }

    #[test]
    fn nested_paths() {
        let report = validate(json!({"and": [{">": [1, {"bogus": []}]}]}));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "root.and[0].>[1]");

        let report = validate(json!({"!": {"bogus": 1}}));
        assert_eq!(report.errors[0].path, "root.!");

        let report = validate(json!([1, {"bogus": 1}]));
        assert_eq!(report.errors[0].path, "root[1]");
    }

    #[test]
    fn arity_bounds() {
        let report = validate(json!({"/": [1]}));
        assert_eq!(
            report.errors[0].message,
            "operator \"/\" requires at least 2 argument(s), got 1"
        );
        let report = validate(json!({"!": [1, 2]}));
        assert_eq!(
            report.errors[0].message,
            "operator \"!\" accepts at most 1 argument(s), got 2"
        );
        assert!(validate(json!({"var": "a"})).valid);
        assert!(validate(json!({"+": [1, 2, 3, 4]})).valid);
    }

    #[test]
    fn multiple_keys_warn_but_validate() {
        let report = validate(json!({"var": "a", "other": 1}));
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("only the first (\"var\")"));
    }

    #[test]
    fn var_path_types() {
        assert_eq!(validate(json!({"var": true})).warnings.len(), 1);
        assert_eq!(validate(json!({"var": [false, 1]})).warnings.len(), 1);
        assert!(validate(json!({"var": ["a", 1]})).warnings.is_empty());
        assert!(validate(json!({"var": [""]})).warnings.is_empty());
        assert!(validate(json!({"var": [null]})).warnings.is_empty());
        assert!(validate(json!({"var": {"cat": ["a", "b"]}})).warnings.is_empty());
    }

    #[test]
    fn missing_some_shape() {
        let report = validate(json!({"missing_some": ["not-a-number", ["a", "b"]]}));
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        let report = validate(json!({"missing_some": [1, "a"]}));
        assert!(!report.valid);
        assert!(validate(json!({"missing_some": [1, ["a", "b"]]})).valid);
    }

    #[test]
    fn if_without_else_warns() {
        let report = validate(json!({"if": [true, "a", false, "b"]}));
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].severity, Severity::Warning);
        assert!(validate(json!({"?:": [true, "a", "b"]})).warnings.is_empty());
    }

    #[test]
    fn if_arity_and_shape_are_both_checked() {
        let report = validate(json!({"if": [true, "a"]}));
        assert_eq!(report.errors.len(), 1);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn reduce_reducer_heuristic() {
        let report = validate(json!({"reduce": [[1], {"+": [1, 2]}, 0]}));
        assert_eq!(report.warnings.len(), 1);
        let ok = validate(json!({"reduce": [[1], {"+": [{"var": "current"}, 1]}, 0]}));
        assert!(ok.warnings.is_empty());
        // Literal mentions satisfy the heuristic too.
        let fooled = validate(json!({"reduce": [[1], {"cat": ["accumulator"]}, 0]}));
        assert!(fooled.warnings.is_empty());
    }

    #[test]
    fn custom_operators_are_accepted() {
        let v = Validator::new().with_custom_operators(["starts_with"]);
        assert!(v.validate(&json!({"starts_with": [{"var": "a"}, "x"]})).valid);
        assert!(v.known_operators().contains(&"starts_with".to_string()));
        assert!(!validate(json!({"starts_with": ["a", "b"]})).valid);
        // Arguments of custom operators are still checked.
        assert!(!v.validate(&json!({"starts_with": [{"nope": 1}, "x"]})).valid);
    }

    #[test]
    fn report_serializes_with_lowercase_severity() {
        let report = validate(json!({"if": [true, 1, false, 2]}));
        let out = serde_json::to_value(&report).unwrap();
        assert_eq!(out["warnings"][0]["severity"], json!("warning"));
        assert_eq!(out["valid"], json!(true));
    }
}
