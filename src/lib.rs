pub mod errors;
pub mod context;
pub mod engine;
pub mod functions;  // custom operator registry
pub mod operators;
pub mod validator;
mod comparison;
mod data_paths;

use serde_json::Value;
use errors::Result;

pub use comparison::truthy;
pub use data_paths::check_data_paths;
pub use engine::{Evaluator, LogSink};
pub use errors::EvalError;
pub use functions::{Function, Registry};
pub use validator::{Severity, ValidationError, ValidationReport, Validator};

/// Validate a rule against the built-in operator set.
pub fn validate(rule: &Value) -> ValidationReport {
    Validator::new().validate(rule)
}

/// Validate a rule, additionally accepting `custom_operators` as known names.
pub fn validate_with<I>(rule: &Value, custom_operators: I) -> ValidationReport
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    Validator::new()
        .with_custom_operators(custom_operators)
        .validate(rule)
}

/// Convenience: evaluate with the built-in operators only.
pub fn evaluate(rule: &Value, data: &Value) -> Result<Value> {
    Evaluator::default().evaluate(rule, data)
}
