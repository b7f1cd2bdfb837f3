//! # factual
//!
//! A fact-based assertion and mocking library for expressing executable
//! specifications.
//!
//! A *fact* bundles assertions about a unit's results with *provided
//! clauses* describing how its collaborators should be called. Evaluating
//! the fact installs call-recording stubs for the clauses, runs the
//! assertion bodies, matches each result against its expected spec, and
//! verifies that every declared clause was exercised. Stub bindings are
//! restored on every exit path, so facts never leak mocks into each other.
//!
//! ## Quick Start
//!
//! ```rust
//! use factual::{args, fact, MockContext, Value};
//!
//! let ctx = MockContext::new();
//! ctx.placeholder("g");
//!
//! let lookups = ctx.clone();
//! ctx.register("g_adder", move |args| match args {
//!     [a, b] => {
//!         let x = lookups.call("g", std::slice::from_ref(a))?;
//!         let y = lookups.call("g", std::slice::from_ref(b))?;
//!         match (x, y) {
//!             (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x + y)),
//!             _ => anyhow::bail!("g returned non-integers"),
//!         }
//!     }
//!     _ => anyhow::bail!("g_adder expects two arguments"),
//! });
//!
//! fact("g_adder sums both lookups")
//!     .provided("g", args![2], 4)
//!     .provided("g", args![3], 7)
//!     .asserts(|s| s.call("g_adder", &[Value::Int(2), Value::Int(3)]), 11)
//!     .check(&ctx);
//! ```
//!
//! ## Non-panicking evaluation
//!
//! ```rust
//! use factual::{fact, Checker, MockContext, Value};
//!
//! let ctx = MockContext::new();
//! ctx.register("find", |_| Ok(Value::from("hit")));
//!
//! let result = fact("find returns something")
//!     .asserts(|s| s.call("find", &[]), Checker::truthy())
//!     .evaluate(&ctx);
//!
//! assert!(result.passed());
//! assert!(result.failures().is_empty());
//! ```
//!
//! ## Matchers
//!
//! The right-hand side of an assertion or argument position accepts
//! literals, named checkers, bare function predicates, wildcards, and
//! identity matchers:
//!
//! ```rust
//! use factual::{matches, anything, Checker, Expected, Value};
//!
//! assert!(matches(&Value::Int(4), &Expected::from(4)));
//! assert!(matches(&Value::Nil, &anything()));
//! assert!(Checker::in_any_order(vec![Value::from(1), Value::from(2)])
//!     .matches(&Value::from(vec![Value::from(2), Value::from(1)])));
//! ```
//!
//! ## Concurrency
//!
//! A [`MockContext`] is a single-threaded execution scope. A runner that
//! evaluates facts in parallel creates one context per worker; there is no
//! shared mutable table for concurrent facts to corrupt.

pub mod checker;
pub mod error;
pub mod fact;
pub mod metavar;
pub mod mock;
pub mod registry;
pub mod report;
pub mod value;
pub mod verify;

// Matching core
pub use checker::{anything, exactly, matches, metavar, named, Checker, Expected};

// Facts
pub use fact::{fact, Fact, FactScope};

// Mock substitution
pub use mock::{MockContext, ProvidedClause, ValueSpec};

// Metavariables
pub use metavar::MetavarBinder;

// Checker registry
pub use registry::CheckerRegistry;

// Reports and errors
pub use error::FatalError;
pub use report::{AssertionOutcome, ErrorDescriptor, ExpectationOutcome, FactResult};
pub use verify::UnsatisfiedExpectation;

// Values
pub use value::{FuncRef, Metavar, Value};
