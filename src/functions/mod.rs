use serde_json::Value;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;
use crate::errors::Result;

/// A user-registered operator. Arguments arrive already evaluated, so custom
/// operators cannot change control flow.
pub trait Function: Send + Sync {
    fn name(&self) -> &'static str;
    fn arity(&self) -> RangeInclusive<usize>;
    fn call(&self, args: &[Value]) -> Result<Value>;
}

/// Thread-safe registry of custom operators. Cloning is cheap; registering
/// on a shared clone copies the map first.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<&'static str, Arc<dyn Function>>>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    pub fn register<F: Function + 'static>(&mut self, f: F) {
        let map = Arc::make_mut(&mut self.inner);
        map.insert(f.name(), Arc::new(f));
    }

    /// Register a closure under `name`.
    pub fn register_fn<F>(&mut self, name: &'static str, arity: RangeInclusive<usize>, f: F)
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(FnOperator { name, arity, f });
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.inner.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

struct FnOperator<F> {
    name: &'static str,
    arity: RangeInclusive<usize>,
    f: F,
}

impl<F> Function for FnOperator<F>
where
    F: Fn(&[Value]) -> Result<Value> + Send + Sync,
{
    fn name(&self) -> &'static str { self.name }
    fn arity(&self) -> RangeInclusive<usize> { self.arity.clone() }
    fn call(&self, args: &[Value]) -> Result<Value> {
        (self.f)(args)
    }
}
