use thiserror::Error;

/// Errors raised while evaluating a rule. Any of these aborts the whole
/// evaluation; there are no partial results.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("operator \"{op}\" expects {expected} argument(s), got {actual}")]
    Arity {
        op: String,
        expected: String,
        actual: usize,
    },

    #[error("operator \"{op}\": {reason}")]
    InvalidArgument { op: String, reason: String },

    #[error("operator \"{op}\": cannot convert {value} to a number")]
    NotANumber { op: String, value: String },

    #[error("operator \"{0}\": division by zero")]
    DivisionByZero(String),

    #[error("operator \"{0}\": result is not a finite number")]
    NonFiniteNumber(String),

    // Returned by registered custom operators.
    #[error("operator \"{op}\" failed: {message}")]
    Custom { op: String, message: String },
}

impl EvalError {
    pub(crate) fn invalid(op: &str, reason: impl Into<String>) -> Self {
        EvalError::InvalidArgument {
            op: op.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
