//! Fact declaration builder.
//!
//! This is the data-first entry point of the library: a [`Fact`] is built
//! programmatically from assertion pairs and provided clauses, then
//! evaluated as a whole against a [`MockContext`].
//!
//! - `fact()` - Entry point for declaring a fact
//! - `Fact` - Holds assertions, provided clauses, and an optional checker
//!   registry; evaluation consumes it

use crate::checker::Expected;
use crate::fact::evaluator::{self, FactScope};
use crate::mock::{MockContext, ProvidedClause, ValueSpec};
use crate::registry::CheckerRegistry;
use crate::report::FactResult;
use crate::value::Value;

pub(crate) type Body = Box<dyn FnOnce(&FactScope) -> anyhow::Result<Value>>;

/// One (actual-expression, expected-spec) pair. Assertions run top to
/// bottom, sharing the fact's mock scope.
pub(crate) struct Assertion {
    pub(crate) body: Body,
    pub(crate) expected: Expected,
}

/// Declare a fact.
///
/// This is the entry point for the builder API.
///
/// # Example
///
/// ```rust
/// use factual::{args, fact, MockContext, Value};
///
/// let ctx = MockContext::new();
/// ctx.placeholder("g");
///
/// let result = fact("g doubles its argument")
///     .provided("g", args![2], 4)
///     .asserts(|s| s.call("g", &[Value::Int(2)]), 4)
///     .evaluate(&ctx);
///
/// assert!(result.passed());
/// ```
pub fn fact(name: impl Into<String>) -> Fact {
    Fact::new(name)
}

/// An expected-interaction unit: one or more assertions plus zero or more
/// provided clauses, evaluated once and then discarded.
pub struct Fact {
    pub(crate) name: String,
    pub(crate) assertions: Vec<Assertion>,
    pub(crate) clauses: Vec<ProvidedClause>,
    pub(crate) registry: Option<CheckerRegistry>,
}

impl Fact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assertions: Vec::new(),
            clauses: Vec::new(),
            registry: None,
        }
    }

    // =========================================================================
    // Builder methods (chainable)
    // =========================================================================

    /// Add an assertion: evaluate `body` and judge its result against
    /// `expected`.
    ///
    /// The body receives a [`FactScope`] for reaching collaborators and
    /// fact-scoped metavariables. Assertion failures are recorded and do
    /// not stop later assertions in the same fact.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// fact("stays odd")
    ///     .asserts(|s| s.call("add2", &[Value::Int(3)]), odd_predicate)
    /// ```
    pub fn asserts(
        mut self,
        body: impl FnOnce(&FactScope) -> anyhow::Result<Value> + 'static,
        expected: impl Into<Expected>,
    ) -> Self {
        self.assertions.push(Assertion {
            body: Box::new(body),
            expected: expected.into(),
        });
        self
    }

    /// Add a provided clause: while this fact executes, a call to
    /// `function` whose arguments are accepted by `matchers` (arity must
    /// match) returns `returns`.
    ///
    /// Clauses for one function are tried in declaration order; the first
    /// match wins. Every clause must be triggered at least once or the
    /// verification pass reports it.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// fact("sums both lookups")
    ///     .provided("g", args![2], 4)
    ///     .provided("g", args![3], 7)
    ///     .asserts(|s| s.call("g_adder", &[Value::Int(2), Value::Int(3)]), 11)
    /// ```
    pub fn provided(
        mut self,
        function: impl Into<String>,
        matchers: Vec<Expected>,
        returns: impl Into<ValueSpec>,
    ) -> Self {
        self.clauses.push(ProvidedClause {
            function: function.into(),
            matchers,
            returns: returns.into(),
        });
        self
    }

    /// Resolve named checkers against a custom registry instead of the
    /// built-in one.
    pub fn with_registry(mut self, registry: CheckerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Evaluate the fact against a context, without panicking.
    ///
    /// Consumes the fact (a fact is evaluated once); all stub bindings and
    /// call records are discarded when this returns, whatever the outcome.
    pub fn evaluate(self, ctx: &MockContext) -> FactResult {
        evaluator::evaluate(self, ctx)
    }

    /// Evaluate and panic with a formatted failure list unless everything
    /// passed.
    ///
    /// # Panics
    ///
    /// Panics if any assertion failed, any expectation went unsatisfied,
    /// or a fatal error aborted the fact.
    pub fn check(self, ctx: &MockContext) {
        let result = self.evaluate(ctx);
        if !result.passed() {
            let mut message = format!("fact failed: {}\n", result.name);
            for failure in result.failures() {
                message.push_str("\n  ");
                message.push_str(&failure);
            }
            panic!("{}\n", message);
        }
    }
}
