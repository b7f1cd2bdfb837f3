//! Facts: the declaration builder and single-fact evaluation.
//!
//! A fact bundles assertions with provided clauses and is evaluated as a
//! whole: metavariables bound, mocks installed, bodies executed, results
//! matched, expectations verified, bindings restored.
//!
//! # Example
//!
//! ```rust,ignore
//! use factual::{args, fact, MockContext, Value};
//!
//! let ctx = MockContext::new();
//! ctx.placeholder("g");
//!
//! let result = fact("sums both lookups")
//!     .provided("g", args![2], 4)
//!     .provided("g", args![3], 7)
//!     .asserts(|s| s.call("g_adder", &[Value::Int(2), Value::Int(3)]), 11)
//!     .evaluate(&ctx);
//! ```

mod builder;
mod evaluator;

pub use builder::{fact, Fact};
pub use evaluator::FactScope;
