//! Scoped restoration of stub bindings.

use crate::mock::context::MockContext;

/// Pops the stub frames its install pushed, when dropped.
///
/// Restoration rides on `Drop`, so it runs on every exit path out of a
/// fact evaluation, normal completion, fatal abort, or panic unwind, and
/// nested guards pop in strict LIFO order matching structural nesting.
pub(crate) struct StubGuard {
    ctx: MockContext,
    functions: Vec<String>,
}

impl StubGuard {
    pub(crate) fn new(ctx: MockContext, functions: Vec<String>) -> Self {
        Self { ctx, functions }
    }
}

impl Drop for StubGuard {
    fn drop(&mut self) {
        self.ctx.uninstall(&self.functions);
    }
}
