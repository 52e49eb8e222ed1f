use crate::comparison::{compare, loose_eq, number_value, stringify, strict_eq, to_number, truthy};
use crate::context::{kind_of, Context};
use crate::errors::{EvalError, Result};
use crate::functions::{Function, Registry};
use crate::operators::{arguments, EvalOrder, Operator};
use crate::validator::Validator;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, trace};

/// Receives the value of every `log` operation.
pub type LogSink = Arc<dyn Fn(&Value) + Send + Sync>;

/// Recursive JSONLogic evaluator.
///
/// An `Evaluator` is immutable once built and holds no per-call state, so a
/// single instance can be shared across threads.
#[derive(Clone)]
pub struct Evaluator {
    registry: Registry,
    log_sink: LogSink,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Registry::new())
    }
}

impl Evaluator {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            log_sink: Arc::new(|v: &Value| {
                tracing::info!(target: "json_logic::log", value = %v, "log");
            }),
        }
    }

    /// Replace the destination of `log` output.
    pub fn with_log_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.log_sink = Arc::new(sink);
        self
    }

    /// Register a custom operator. Built-in names always win.
    pub fn register<F: Function + 'static>(&mut self, f: F) {
        self.registry.register(f);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// A validator that accepts this evaluator's custom operators.
    pub fn validator(&self) -> Validator {
        Validator::new().with_custom_operators(self.registry.names())
    }

    pub fn evaluate(&self, rule: &Value, data: &Value) -> Result<Value> {
        let out = self.eval(rule, Context::new(data));
        if let Err(e) = &out {
            debug!(error = %e, "evaluation failed");
        }
        out
    }

    fn eval(&self, rule: &Value, ctx: Context<'_>) -> Result<Value> {
        match rule {
            Value::Array(items) => self.eval_all(items, ctx).map(Value::Array),
            Value::Object(map) => match map.iter().next() {
                Some((name, value)) => self.dispatch(name, value, ctx),
                None => Ok(rule.clone()),
            },
            literal => Ok(literal.clone()),
        }
    }

    fn eval_all(&self, rules: &[Value], ctx: Context<'_>) -> Result<Vec<Value>> {
        rules.iter().map(|r| self.eval(r, ctx)).collect()
    }

    fn dispatch(&self, name: &str, value: &Value, ctx: Context<'_>) -> Result<Value> {
        let args = arguments(value);
        if let Some(op) = Operator::from_name(name) {
            trace!(operator = name, args = args.len(), "dispatch");
            let arity = op.arity();
            if !arity.accepts(args.len()) {
                return Err(EvalError::Arity {
                    op: name.to_string(),
                    expected: arity.to_string(),
                    actual: args.len(),
                });
            }
            return match op.order() {
                EvalOrder::ShortCircuit => self.short_circuit(op, args, ctx),
                EvalOrder::Scoped => self.scoped(op, args, ctx),
                EvalOrder::Eager => {
                    let values = self.eval_all(args, ctx)?;
                    self.apply(op, &values, ctx)
                }
            };
        }

        let Some(f) = self.registry.get(name) else {
            return Err(EvalError::UnknownOperator(name.to_string()));
        };
        trace!(operator = name, args = args.len(), "dispatch custom");
        let arity = f.arity();
        if !arity.contains(&args.len()) {
            return Err(EvalError::Arity {
                op: name.to_string(),
                expected: format!("{} to {}", arity.start(), arity.end()),
                actual: args.len(),
            });
        }
        let values = self.eval_all(args, ctx)?;
        f.call(&values)
    }

    fn short_circuit(&self, op: Operator, args: &[Value], ctx: Context<'_>) -> Result<Value> {
        match op {
            Operator::If | Operator::Ternary => {
                let mut pairs = args.chunks_exact(2);
                for pair in pairs.by_ref() {
                    if truthy(&self.eval(&pair[0], ctx)?) {
                        return self.eval(&pair[1], ctx);
                    }
                }
                match pairs.remainder() {
                    [otherwise] => self.eval(otherwise, ctx),
                    _ => Ok(Value::Null),
                }
            }
            Operator::And | Operator::Or => {
                let stop_on = op == Operator::Or;
                let mut last = Value::Null;
                for arg in args {
                    last = self.eval(arg, ctx)?;
                    if truthy(&last) == stop_on {
                        break;
                    }
                }
                Ok(last)
            }
            other => Err(EvalError::invalid(other.name(), "not a short-circuit operator")),
        }
    }

    fn scoped(&self, op: Operator, args: &[Value], ctx: Context<'_>) -> Result<Value> {
        let items = match self.eval(&args[0], ctx)? {
            Value::Array(items) => items,
            other => {
                return Err(EvalError::invalid(
                    op.name(),
                    format!("expected an array, got {}", kind_of(&other)),
                ))
            }
        };
        let body = &args[1];
        let test = |item: &Value| -> Result<bool> {
            self.eval(body, Context::new(item)).map(|v| truthy(&v))
        };

        match op {
            Operator::Map => items
                .iter()
                .map(|item| self.eval(body, Context::new(item)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Operator::Filter => {
                let mut kept = Vec::new();
                for item in items {
                    if test(&item)? {
                        kept.push(item);
                    }
                }
                Ok(Value::Array(kept))
            }
            Operator::Reduce => {
                let mut acc = self.eval(&args[2], ctx)?;
                for item in items {
                    let mut scope = Map::with_capacity(2);
                    scope.insert("accumulator".to_string(), acc);
                    scope.insert("current".to_string(), item);
                    let scope = Value::Object(scope);
                    acc = self.eval(body, Context::new(&scope))?;
                }
                Ok(acc)
            }
            // Empty input is not "all true".
            Operator::All => {
                if items.is_empty() {
                    return Ok(Value::Bool(false));
                }
                for item in &items {
                    if !test(item)? {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            Operator::Some | Operator::None => {
                let mut found = false;
                for item in &items {
                    if test(item)? {
                        found = true;
                        break;
                    }
                }
                Ok(Value::Bool(found == (op == Operator::Some)))
            }
            other => Err(EvalError::invalid(other.name(), "not a scoped operator")),
        }
    }

    fn apply(&self, op: Operator, values: &[Value], ctx: Context<'_>) -> Result<Value> {
        let name = op.name();
        match op {
            Operator::Var => var(values, ctx),
            Operator::Missing => {
                let keys = match values.first() {
                    Some(Value::Array(keys)) => keys.as_slice(),
                    _ => values,
                };
                missing_keys(name, keys, ctx).map(Value::Array)
            }
            Operator::MissingSome => {
                let need = match &values[0] {
                    Value::Number(n) => n.as_f64().unwrap_or(0.0),
                    other => {
                        return Err(EvalError::invalid(
                            name,
                            format!("minimum must be a number, got {}", kind_of(other)),
                        ))
                    }
                };
                let Value::Array(keys) = &values[1] else {
                    return Err(EvalError::invalid(name, "keys must be an array"));
                };
                let missing = missing_keys(name, keys, ctx)?;
                let present = keys.len() - missing.len();
                if present as f64 >= need {
                    Ok(Value::Array(Vec::new()))
                } else {
                    Ok(Value::Array(missing))
                }
            }
            Operator::LooseEq => Ok(Value::Bool(loose_eq(&values[0], &values[1]))),
            Operator::LooseNe => Ok(Value::Bool(!loose_eq(&values[0], &values[1]))),
            Operator::StrictEq => Ok(Value::Bool(strict_eq(&values[0], &values[1]))),
            Operator::StrictNe => Ok(Value::Bool(!strict_eq(&values[0], &values[1]))),
            Operator::Not => Ok(Value::Bool(!truthy(&values[0]))),
            Operator::DoubleNot => Ok(Value::Bool(truthy(&values[0]))),
            Operator::Gt => Ok(chain(values, |o| o == Ordering::Greater)),
            Operator::Gte => Ok(chain(values, |o| o != Ordering::Less)),
            Operator::Lt => Ok(chain(values, |o| o == Ordering::Less)),
            Operator::Lte => Ok(chain(values, |o| o != Ordering::Greater)),
            Operator::Max | Operator::Min => {
                let nums = numbers(op, values)?;
                let pick: fn(f64, f64) -> f64 = if op == Operator::Max { f64::max } else { f64::min };
                let best = nums.iter().copied().reduce(pick).unwrap_or(f64::NAN);
                finish(op, best)
            }
            // A single operand is a numeric cast.
            Operator::Add => finish(op, numbers(op, values)?.iter().sum()),
            Operator::Sub => match numbers(op, values)?.as_slice() {
                [x] => finish(op, -x),
                [x, y] => finish(op, x - y),
                _ => Err(EvalError::invalid(name, "expects one or two operands")),
            },
            Operator::Mul => finish(op, numbers(op, values)?.iter().product()),
            Operator::Div | Operator::Mod => {
                let (x, y) = (number(op, &values[0])?, number(op, &values[1])?);
                if y == 0.0 {
                    return Err(EvalError::DivisionByZero(name.to_string()));
                }
                finish(op, if op == Operator::Div { x / y } else { x % y })
            }
            Operator::Merge => {
                let mut out = Vec::new();
                for v in values {
                    match v {
                        Value::Array(items) => out.extend(items.iter().cloned()),
                        other => out.push(other.clone()),
                    }
                }
                Ok(Value::Array(out))
            }
            Operator::In => match &values[1] {
                Value::Array(items) => Ok(Value::Bool(items.iter().any(|i| strict_eq(i, &values[0])))),
                Value::String(haystack) => Ok(Value::Bool(haystack.contains(&stringify(&values[0])))),
                other => Err(EvalError::invalid(
                    name,
                    format!("expected an array or string to search, got {}", kind_of(other)),
                )),
            },
            Operator::Cat => Ok(Value::String(values.iter().map(stringify).collect())),
            Operator::Substr => {
                let start = integer(op, &values[1])?;
                let length = values.get(2).map(|v| integer(op, v)).transpose()?;
                Ok(Value::String(substr(&stringify(&values[0]), start, length)))
            }
            Operator::Log => {
                (self.log_sink)(&values[0]);
                Ok(values[0].clone())
            }
            other => Err(EvalError::invalid(other.name(), "not an eager operator")),
        }
    }
}

fn var(values: &[Value], ctx: Context<'_>) -> Result<Value> {
    let path = match values.first() {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(n @ Value::Number(_)) => stringify(n),
        Some(other) => {
            return Err(EvalError::invalid(
                "var",
                format!("path must be a string, number or null, got {}", kind_of(other)),
            ))
        }
    };
    let found = ctx.resolve(&path).filter(|v| !v.is_null());
    Ok(match (found, values.get(1)) {
        (Some(v), _) => v.clone(),
        (None, Some(default)) => default.clone(),
        (None, None) => Value::Null,
    })
}

fn missing_keys(op: &str, keys: &[Value], ctx: Context<'_>) -> Result<Vec<Value>> {
    let mut missing = Vec::new();
    for key in keys {
        let path = match key {
            Value::String(s) => s.clone(),
            Value::Number(_) => stringify(key),
            other => {
                return Err(EvalError::invalid(
                    op,
                    format!("keys must be strings or numbers, got {}", kind_of(other)),
                ))
            }
        };
        if ctx.resolve(&path).map_or(true, Value::is_null) {
            missing.push(key.clone());
        }
    }
    Ok(missing)
}

fn chain(values: &[Value], holds: impl Fn(Ordering) -> bool) -> Value {
    let ok = values
        .windows(2)
        .all(|w| compare(&w[0], &w[1]).map_or(false, &holds));
    Value::Bool(ok)
}

fn number(op: Operator, v: &Value) -> Result<f64> {
    to_number(v).ok_or_else(|| EvalError::NotANumber {
        op: op.name().to_string(),
        value: v.to_string(),
    })
}

fn numbers(op: Operator, values: &[Value]) -> Result<Vec<f64>> {
    values.iter().map(|v| number(op, v)).collect()
}

fn integer(op: Operator, v: &Value) -> Result<i64> {
    let f = number(op, v)?;
    if f.fract() != 0.0 {
        return Err(EvalError::invalid(op.name(), format!("expected an integer, got {v}")));
    }
    Ok(f as i64)
}

fn finish(op: Operator, f: f64) -> Result<Value> {
    number_value(f).ok_or_else(|| EvalError::NonFiniteNumber(op.name().to_string()))
}

/// Character-based substring. A negative start counts from the end; a
/// negative length stops that many characters before the end.
fn substr(s: &str, start: i64, length: Option<i64>) -> String {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let start = if start < 0 { len.saturating_add(start).max(0) } else { start.min(len) };
    let end = match length {
        None => len,
        Some(l) if l < 0 => len.saturating_add(l).max(start),
        Some(l) => start.saturating_add(l).min(len),
    };
    chars[start as usize..end as usize].iter().collect()
}
