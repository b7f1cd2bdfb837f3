//! Scoped function substitution: the mock registry, stub frames, and the
//! guard that restores prior bindings on every exit path.

mod clause;
mod context;
mod guard;

pub use clause::{ProvidedClause, ValueSpec};
pub use context::MockContext;

pub(crate) use clause::CompiledClause;
pub(crate) use context::StubSession;
