//! The open checker registry.
//!
//! Facts may reference checkers by name (`Expected::Named`); the evaluator
//! resolves those names here during validation, before anything executes.
//! Collaborators register new checkers without modifying the matching core.

use std::collections::HashMap;
use std::rc::Rc;

use crate::checker::Checker;
use crate::value::Value;

type Factory = Rc<dyn Fn(&[Value]) -> Result<Checker, String>>;

/// Name → checker-factory mapping.
///
/// A factory receives the declaration's argument values and either builds
/// a [`Checker`] or reports why the declaration is structurally invalid
/// (the evaluator surfaces that as a `MalformedDeclaration`).
///
/// # Example
///
/// ```rust
/// use factual::{CheckerRegistry, Checker, Value};
///
/// let mut registry = CheckerRegistry::default();
/// registry.register("empty", |args| {
///     if !args.is_empty() {
///         return Err("empty takes no arguments".to_string());
///     }
///     Ok(Checker::new("empty", |v| matches!(v, Value::List(items) if items.is_empty())))
/// });
///
/// let checker = registry.resolve("empty", &[]).unwrap();
/// assert!(checker.matches(&Value::List(vec![])));
/// ```
#[derive(Clone)]
pub struct CheckerRegistry {
    factories: HashMap<String, Factory>,
}

impl CheckerRegistry {
    /// An empty registry with no checkers at all.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// The built-in checkers: `truthy`, `anything`, `exactly`,
    /// `in-any-order`, and `pattern`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();

        registry.register("truthy", |args| {
            expect_no_args("truthy", args)?;
            Ok(Checker::truthy())
        });

        registry.register("anything", |args| {
            expect_no_args("anything", args)?;
            Ok(Checker::anything())
        });

        registry.register("exactly", |args| match args {
            [v] => Ok(Checker::exactly(v.clone())),
            _ => Err(format!("'exactly' takes one argument, got {}", args.len())),
        });

        registry.register("in-any-order", |args| match args {
            [Value::List(items)] => Ok(Checker::in_any_order(items.clone())),
            [other] => Err(format!("'in-any-order' takes a list, got {}", other)),
            _ => Err(format!(
                "'in-any-order' takes one argument, got {}",
                args.len()
            )),
        });

        registry.register("pattern", |args| match args {
            [Value::Str(p)] => Ok(Checker::pattern(p.clone())),
            [other] => Err(format!("'pattern' takes a string, got {}", other)),
            _ => Err(format!("'pattern' takes one argument, got {}", args.len())),
        });

        registry
    }

    /// Register (or replace) a checker factory under a name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&[Value]) -> Result<Checker, String> + 'static,
    ) {
        self.factories.insert(name.into(), Rc::new(factory));
    }

    /// Build the named checker from declaration arguments.
    pub fn resolve(&self, name: &str, args: &[Value]) -> Result<Checker, String> {
        match self.factories.get(name) {
            Some(factory) => factory(args),
            None => Err(format!("unknown checker '{}'", name)),
        }
    }
}

impl Default for CheckerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn expect_no_args(name: &str, args: &[Value]) -> Result<(), String> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(format!("'{}' takes no arguments, got {}", name, args.len()))
    }
}
