//! Checker registry: fully-qualified callable name -> checker function
//!
//! An explicit value rather than process-wide state: the plugin builds one
//! during initialization, passes it by reference into dispatch, and never
//! mutates it afterwards. `CheckerFn` is a plain `fn` pointer, so the built
//! registry is `Send + Sync` and lookups during concurrent per-file analysis
//! need no locking.

use crate::check::FunctionContext;
use crate::types::Type;
use indexmap::IndexMap;

/// A checker refines the return type of one call expression; diagnostics are
/// a side effect through the context, never a panic or an early abort
pub type CheckerFn = for<'a> fn(&mut FunctionContext<'a>) -> Type;

/// Registered checkers, in registration order
#[derive(Debug, Clone, Default)]
pub struct Registry {
    checkers: IndexMap<String, CheckerFn>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `name` and every alias with `checker`; the last registration
    /// for a name wins. Returns the checker unchanged so registrations
    /// compose:
    ///
    /// ```
    /// # use quantcheck::registry::Registry;
    /// # use quantcheck::check::check_additive;
    /// let mut registry = Registry::new();
    /// let same = registry.register("builtins.int.__add__", &["builtins.int.__radd__"], check_additive);
    /// registry.register("builtins.float.__add__", &[], same);
    /// ```
    pub fn register(&mut self, name: &str, aliases: &[&str], checker: CheckerFn) -> CheckerFn {
        self.checkers.insert(name.to_string(), checker);
        for alias in aliases {
            self.checkers.insert(alias.to_string(), checker);
        }
        tracing::debug!(%name, aliases = aliases.len(), "registered checker");
        checker
    }

    /// Look up the checker for a fully-qualified name
    pub fn lookup(&self, name: &str) -> Option<CheckerFn> {
        self.checkers.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    /// Registered names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.checkers.keys().map(|k| k.as_str())
    }
}
