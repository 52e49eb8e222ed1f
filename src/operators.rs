//! The fixed set of built-in JSONLogic operators.
//!
//! Each operator carries its arity bounds and the order in which its
//! arguments are evaluated. Names are mapped to the closed [`Operator`] type
//! once, at dispatch time; everything after that matches on the enum.

use std::fmt;

/// Permitted argument count. `max == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    const fn exactly(n: usize) -> Self {
        Arity { min: n, max: Some(n) }
    }

    const fn between(min: usize, max: usize) -> Self {
        Arity { min, max: Some(max) }
    }

    const fn at_least(min: usize) -> Self {
        Arity { min, max: None }
    }

    pub fn accepts(&self, len: usize) -> bool {
        len >= self.min && self.max.map_or(true, |max| len <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {max}"),
            Some(max) => write!(f, "{} to {max}", self.min),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// How an operator consumes its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalOrder {
    /// Every argument is evaluated, left to right, before the operator runs.
    Eager,
    /// Arguments are evaluated on demand; untaken branches never run.
    ShortCircuit,
    /// The collection argument is evaluated in the outer context, the body
    /// once per element in a rebound context.
    Scoped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Var,
    Missing,
    MissingSome,
    If,
    Ternary,
    LooseEq,
    LooseNe,
    StrictEq,
    StrictNe,
    Not,
    DoubleNot,
    Or,
    And,
    Gt,
    Gte,
    Lt,
    Lte,
    Max,
    Min,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Map,
    Filter,
    Reduce,
    All,
    Some,
    None,
    Merge,
    In,
    Cat,
    Substr,
    Log,
}

/// Name, operator and arity for every built-in, in variant order.
const TABLE: &[(&str, Operator, Arity)] = &[
    ("var", Operator::Var, Arity::between(0, 2)),
    ("missing", Operator::Missing, Arity::at_least(1)),
    ("missing_some", Operator::MissingSome, Arity::exactly(2)),
    ("if", Operator::If, Arity::at_least(3)),
    ("?:", Operator::Ternary, Arity::at_least(3)),
    ("==", Operator::LooseEq, Arity::exactly(2)),
    ("!=", Operator::LooseNe, Arity::exactly(2)),
    ("===", Operator::StrictEq, Arity::exactly(2)),
    ("!==", Operator::StrictNe, Arity::exactly(2)),
    ("!", Operator::Not, Arity::exactly(1)),
    ("!!", Operator::DoubleNot, Arity::exactly(1)),
    ("or", Operator::Or, Arity::at_least(1)),
    ("and", Operator::And, Arity::at_least(1)),
    (">", Operator::Gt, Arity::between(2, 3)),
    (">=", Operator::Gte, Arity::between(2, 3)),
    ("<", Operator::Lt, Arity::between(2, 3)),
    ("<=", Operator::Lte, Arity::between(2, 3)),
    ("max", Operator::Max, Arity::at_least(1)),
    ("min", Operator::Min, Arity::at_least(1)),
    ("+", Operator::Add, Arity::at_least(1)),
    ("-", Operator::Sub, Arity::between(1, 2)),
    ("*", Operator::Mul, Arity::at_least(2)),
    ("/", Operator::Div, Arity::exactly(2)),
    ("%", Operator::Mod, Arity::exactly(2)),
    ("map", Operator::Map, Arity::exactly(2)),
    ("filter", Operator::Filter, Arity::exactly(2)),
    ("reduce", Operator::Reduce, Arity::exactly(3)),
    ("all", Operator::All, Arity::exactly(2)),
    ("some", Operator::Some, Arity::exactly(2)),
    ("none", Operator::None, Arity::exactly(2)),
    ("merge", Operator::Merge, Arity::at_least(1)),
    ("in", Operator::In, Arity::exactly(2)),
    ("cat", Operator::Cat, Arity::at_least(1)),
    ("substr", Operator::Substr, Arity::between(2, 3)),
    ("log", Operator::Log, Arity::exactly(1)),
];

impl Operator {
    pub fn from_name(name: &str) -> Option<Operator> {
        TABLE
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, op, _)| *op)
    }

    pub fn name(self) -> &'static str {
        self.entry().0
    }

    pub fn arity(self) -> Arity {
        self.entry().2
    }

    pub fn order(self) -> EvalOrder {
        match self {
            Operator::If | Operator::Ternary | Operator::And | Operator::Or => {
                EvalOrder::ShortCircuit
            }
            Operator::Map
            | Operator::Filter
            | Operator::Reduce
            | Operator::All
            | Operator::Some
            | Operator::None => EvalOrder::Scoped,
            _ => EvalOrder::Eager,
        }
    }

    // TABLE is laid out in variant order.
    fn entry(self) -> &'static (&'static str, Operator, Arity) {
        &TABLE[self as usize]
    }
}

/// Names of all built-in operators, in table order.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    TABLE.iter().map(|(name, _, _)| *name)
}

/// Normalize an operator's value into its argument list: arrays are the list
/// itself, anything else is a single argument.
pub fn arguments(value: &serde_json::Value) -> &[serde_json::Value] {
    match value {
        serde_json::Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}
