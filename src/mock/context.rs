//! The mock context: an explicit, passed-through execution scope holding
//! the current function-identifier → binding mapping.
//!
//! There is deliberately no global mutable table. A context is
//! single-threaded (`Rc`/`RefCell`); a host runner that evaluates facts in
//! parallel gives each worker its own context, so two facts mocking the
//! same identifier can never observe each other's bindings.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::FatalError;
use crate::mock::clause::CompiledClause;
use crate::mock::guard::StubGuard;
use crate::value::{FuncRef, Value};

/// One binding on an identifier's stack. Stubs shadow whatever sits below
/// them; the base is a real implementation or a mock-only placeholder.
enum Frame {
    Real(FuncRef),
    Placeholder,
    Stub(Rc<StubSession>),
}

#[derive(Default)]
struct Bindings {
    stacks: HashMap<String, Vec<Frame>>,
    /// Active stub sessions, innermost fact last. An undefined-function
    /// call poisons the innermost session so its fact aborts.
    sessions: Vec<Rc<StubSession>>,
}

/// The function bindings for one execution context.
///
/// Real collaborator implementations are registered up front; facts install
/// stub frames on top of them for the duration of one evaluation and the
/// stack is restored when the fact ends, on every exit path.
///
/// # Example
///
/// ```rust
/// use factual::{MockContext, Value};
///
/// let ctx = MockContext::new();
/// ctx.register("double", |args| match args {
///     [Value::Int(n)] => Ok(Value::Int(n * 2)),
///     _ => anyhow::bail!("double expects one integer"),
/// });
/// assert_eq!(ctx.call("double", &[Value::Int(4)]).unwrap(), Value::Int(8));
/// ```
#[derive(Clone, Default)]
pub struct MockContext {
    inner: Rc<RefCell<Bindings>>,
}

impl MockContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a real implementation under a function identifier. A later
    /// registration for the same identifier shadows the earlier one.
    pub fn register(
        &self,
        name: impl Into<String>,
        f: impl Fn(&[Value]) -> anyhow::Result<Value> + 'static,
    ) {
        let name = name.into();
        let func = FuncRef::new(name.clone(), f);
        self.inner
            .borrow_mut()
            .stacks
            .entry(name)
            .or_default()
            .push(Frame::Real(func));
    }

    /// Declare a mock-only placeholder: an intentionally unimplemented
    /// function that must be shadowed by a provided clause to be callable.
    /// Calling it outside any stub scope is a fatal
    /// [`UndefinedFunctionCalled`](FatalError::UndefinedFunctionCalled).
    pub fn placeholder(&self, name: impl Into<String>) {
        self.inner
            .borrow_mut()
            .stacks
            .entry(name.into())
            .or_default()
            .push(Frame::Placeholder);
    }

    /// Route a call through the current binding for `function`.
    ///
    /// Fact bodies reach collaborators through this method (usually via
    /// [`FactScope::call`](crate::FactScope::call)), which is what lets an
    /// installed stub intercept them.
    pub fn call(&self, function: &str, args: &[Value]) -> anyhow::Result<Value> {
        // Decide on the action under the borrow, then release it before
        // invoking user code: a real implementation may re-enter call().
        enum Action {
            Invoke(FuncRef),
            Dispatch(Rc<StubSession>),
            Undefined(Option<Rc<StubSession>>),
        }

        let action = {
            let inner = self.inner.borrow();
            match inner.stacks.get(function).and_then(|stack| stack.last()) {
                Some(Frame::Real(f)) => Action::Invoke(f.clone()),
                Some(Frame::Stub(session)) => Action::Dispatch(session.clone()),
                Some(Frame::Placeholder) | None => {
                    Action::Undefined(inner.sessions.last().cloned())
                }
            }
        };

        match action {
            Action::Invoke(f) => f.invoke(args),
            Action::Dispatch(session) => session
                .dispatch(function, args)
                .map_err(anyhow::Error::new),
            Action::Undefined(session) => {
                let err = FatalError::UndefinedFunctionCalled {
                    function: function.to_string(),
                };
                if let Some(session) = session {
                    session.poison(err.clone());
                }
                Err(anyhow::Error::new(err))
            }
        }
    }

    /// Push one stub frame per mocked identifier, on top of any prior
    /// binding. The returned guard pops exactly those frames when dropped,
    /// so nested installs restore in strict LIFO order.
    pub(crate) fn install(&self, session: Rc<StubSession>) -> StubGuard {
        let mut functions: Vec<String> = Vec::new();
        for clause in &session.clauses {
            if !functions.contains(&clause.function) {
                functions.push(clause.function.clone());
            }
        }

        let mut inner = self.inner.borrow_mut();
        for function in &functions {
            inner
                .stacks
                .entry(function.clone())
                .or_default()
                .push(Frame::Stub(session.clone()));
        }
        inner.sessions.push(session);

        StubGuard::new(self.clone(), functions)
    }

    /// Restore the immediately-prior bindings for the given identifiers.
    /// Only the guard calls this.
    pub(crate) fn uninstall(&self, functions: &[String]) {
        let mut inner = self.inner.borrow_mut();
        for function in functions.iter().rev() {
            let emptied = match inner.stacks.get_mut(function) {
                Some(stack) => {
                    stack.pop();
                    stack.is_empty()
                }
                None => false,
            };
            if emptied {
                inner.stacks.remove(function);
            }
        }
        inner.sessions.pop();
    }
}

/// The stub state for one fact evaluation: every compiled clause plus the
/// fault cell that records the first fatal call error.
pub(crate) struct StubSession {
    pub(crate) clauses: Vec<CompiledClause>,
    fault: RefCell<Option<FatalError>>,
}

impl StubSession {
    pub(crate) fn new(clauses: Vec<CompiledClause>) -> Self {
        Self {
            clauses,
            fault: RefCell::new(None),
        }
    }

    /// First-match-in-declaration-order clause selection. A call matching
    /// no clause is an UnexpectedCall: it poisons the session and every
    /// later call through it returns the same error, so the fact aborts
    /// even if the body swallowed the original.
    fn dispatch(&self, function: &str, args: &[Value]) -> Result<Value, FatalError> {
        if let Some(err) = self.fault.borrow().clone() {
            return Err(err);
        }

        for clause in self.clauses.iter().filter(|c| c.function == function) {
            if clause.accepts(args) {
                clause.triggers.set(clause.triggers.get() + 1);
                // Configured literal, never re-evaluated.
                return Ok(clause.returns.clone());
            }
        }

        let err = FatalError::UnexpectedCall {
            function: function.to_string(),
            args: args.iter().map(Value::to_string).collect(),
        };
        self.poison(err.clone());
        Err(err)
    }

    /// Record a fatal error; the first one wins.
    pub(crate) fn poison(&self, err: FatalError) {
        let mut fault = self.fault.borrow_mut();
        if fault.is_none() {
            *fault = Some(err);
        }
    }

    pub(crate) fn fault(&self) -> Option<FatalError> {
        self.fault.borrow().clone()
    }
}
