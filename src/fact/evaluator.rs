//! Single-fact evaluation.
//!
//! One evaluation moves strictly through: validate declarations, bind
//! metavariables, install mocks, execute assertion bodies, check results,
//! verify expectations, restore mocks, report. Restoration rides on a
//! drop guard, so it happens on every exit path; fatal errors skip the
//! remaining body execution and verification but still restore and still
//! produce a report.

use std::rc::Rc;

use crate::checker::{matches, Expected};
use crate::error::FatalError;
use crate::fact::builder::{Assertion, Body, Fact};
use crate::metavar::MetavarBinder;
use crate::mock::{CompiledClause, MockContext, ProvidedClause, StubSession, ValueSpec};
use crate::registry::CheckerRegistry;
use crate::report::{AssertionOutcome, ErrorDescriptor, ExpectationOutcome, FactResult};
use crate::value::Value;
use crate::verify::verify;

/// What an assertion body sees while it runs: the fact's mock scope and
/// its metavariable binder.
pub struct FactScope {
    ctx: MockContext,
    metavars: Rc<MetavarBinder>,
}

impl FactScope {
    /// Call a collaborator through the current bindings. Installed stubs
    /// intercept the call; otherwise the real implementation runs.
    pub fn call(&self, function: &str, args: &[Value]) -> anyhow::Result<Value> {
        self.ctx.call(function, args)
    }

    /// The placeholder bound for `name` in this evaluation; the same name
    /// always yields the same placeholder, including the ones provided
    /// clauses were resolved against.
    pub fn metavar(&self, name: &str) -> Value {
        self.metavars.bind(name)
    }

    /// The underlying context, for evaluating nested facts in this fact's
    /// scope.
    pub fn context(&self) -> &MockContext {
        &self.ctx
    }
}

pub(crate) fn evaluate(fact: Fact, ctx: &MockContext) -> FactResult {
    let Fact {
        name,
        assertions,
        clauses,
        registry,
    } = fact;
    let registry = registry.unwrap_or_default();
    let binder = Rc::new(MetavarBinder::new());

    // Validate and resolve everything declarative up front. A malformed
    // declaration means the fact never executes.
    let compiled = match compile_clauses(&clauses, &registry, &binder) {
        Ok(compiled) => compiled,
        Err(err) => return never_executed(name, err),
    };
    let mut pending: Vec<(Body, Expected)> = Vec::with_capacity(assertions.len());
    for Assertion { body, expected } in assertions {
        match resolve_expected(&expected, &registry, &binder) {
            Ok(resolved) => pending.push((body, resolved)),
            Err(err) => return never_executed(name, err),
        }
    }

    let session = Rc::new(StubSession::new(compiled));
    let mut outcomes = Vec::new();
    let mut fatal: Option<FatalError> = None;

    let (expectations, unsatisfied) = {
        let _guard = ctx.install(session.clone());
        let scope = FactScope {
            ctx: ctx.clone(),
            metavars: binder,
        };

        for (body, expected) in pending {
            match body(&scope) {
                Ok(actual) => {
                    // A fatal call error aborts the fact even when the
                    // body swallowed it.
                    if let Some(err) = session.fault() {
                        fatal = Some(err);
                        break;
                    }
                    let passed = matches(&actual, &expected);
                    outcomes.push(AssertionOutcome {
                        passed,
                        expected: expected.describe(),
                        actual,
                        checker: expected.checker_description(),
                    });
                }
                Err(err) => {
                    fatal = Some(session.fault().unwrap_or_else(|| classify(err)));
                    break;
                }
            }
        }

        let expectations = expectation_outcomes(&session);
        let unsatisfied = if fatal.is_none() {
            verify(&session.clauses)
        } else {
            Vec::new()
        };
        (expectations, unsatisfied)
        // Guard drops here: bindings restored before the report leaves.
    };

    FactResult {
        name,
        assertions: outcomes,
        expectations,
        unsatisfied,
        fatal: fatal.as_ref().map(ErrorDescriptor::from),
    }
}

/// Resolve symbolic matcher forms: named checkers against the registry,
/// metavariables against the fact's binder. Everything else passes
/// through.
fn resolve_expected(
    expected: &Expected,
    registry: &CheckerRegistry,
    binder: &MetavarBinder,
) -> Result<Expected, FatalError> {
    match expected {
        Expected::Named { name, args } => registry
            .resolve(name, args)
            .map(Expected::Check)
            .map_err(|reason| FatalError::MalformedDeclaration { reason }),
        Expected::Metavar(name) => bind_metavar(name, binder).map(Expected::Value),
        other => Ok(other.clone()),
    }
}

fn bind_metavar(name: &str, binder: &MetavarBinder) -> Result<Value, FatalError> {
    if name.is_empty() {
        return Err(FatalError::MalformedDeclaration {
            reason: "metavariable name is empty".to_string(),
        });
    }
    Ok(binder.bind(name))
}

fn compile_clauses(
    clauses: &[ProvidedClause],
    registry: &CheckerRegistry,
    binder: &MetavarBinder,
) -> Result<Vec<CompiledClause>, FatalError> {
    let mut compiled = Vec::with_capacity(clauses.len());
    for clause in clauses {
        if clause.function.is_empty() {
            return Err(FatalError::MalformedDeclaration {
                reason: "provided clause has an empty function identifier".to_string(),
            });
        }
        let mut matchers = Vec::with_capacity(clause.matchers.len());
        for matcher in &clause.matchers {
            matchers.push(resolve_expected(matcher, registry, binder)?);
        }
        let returns = match &clause.returns {
            ValueSpec::Value(v) => v.clone(),
            ValueSpec::Metavar(name) => bind_metavar(name, binder)?,
        };
        compiled.push(CompiledClause::new(
            clause.function.clone(),
            matchers,
            returns,
        ));
    }
    Ok(compiled)
}

fn classify(err: anyhow::Error) -> FatalError {
    match err.downcast::<FatalError>() {
        Ok(fatal) => fatal,
        Err(other) => FatalError::BodyFailed {
            message: format!("{:#}", other),
        },
    }
}

fn expectation_outcomes(session: &StubSession) -> Vec<ExpectationOutcome> {
    session
        .clauses
        .iter()
        .map(|clause| {
            let calls = clause.triggers.get();
            ExpectationOutcome {
                function: clause.function.clone(),
                triggered: calls > 0,
                calls,
                matchers: clause.matcher_descriptions(),
            }
        })
        .collect()
}

fn never_executed(name: String, err: FatalError) -> FactResult {
    FactResult {
        name,
        assertions: Vec::new(),
        expectations: Vec::new(),
        unsatisfied: Vec::new(),
        fatal: Some(ErrorDescriptor::from(&err)),
    }
}
