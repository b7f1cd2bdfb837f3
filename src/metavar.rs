//! Fact-scoped metavariable binding.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::value::{Metavar, Value};

// Process-wide id source so placeholders from different evaluations can
// never compare equal.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Produces opaque placeholder values, memoized per name.
///
/// One binder lives for one fact evaluation: repeated mentions of the same
/// symbolic name resolve to the identical placeholder, so expectation
/// clauses and the fact body can reference "the same" unspecified input
/// without the author assigning it explicitly. A fresh binder (a fresh
/// evaluation) produces placeholders unequal to every earlier one.
///
/// # Example
///
/// ```rust
/// use factual::MetavarBinder;
///
/// let binder = MetavarBinder::new();
/// assert_eq!(binder.bind("..input.."), binder.bind("..input.."));
/// assert_ne!(binder.bind("..input.."), binder.bind("..other.."));
/// ```
#[derive(Debug, Default)]
pub struct MetavarBinder {
    bound: RefCell<HashMap<String, Metavar>>,
}

impl MetavarBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a name to its placeholder, creating it on first mention.
    pub fn bind(&self, name: &str) -> Value {
        let mut bound = self.bound.borrow_mut();
        let metavar = bound
            .entry(name.to_string())
            .or_insert_with(|| Metavar::new(name, NEXT_ID.fetch_add(1, Ordering::Relaxed)))
            .clone();
        Value::Metavar(metavar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_placeholder() {
        let binder = MetavarBinder::new();
        let a = binder.bind("..x..");
        let b = binder.bind("..x..");
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_names_differ() {
        let binder = MetavarBinder::new();
        assert_ne!(binder.bind("..x.."), binder.bind("..y.."));
    }

    #[test]
    fn test_fresh_binder_fresh_identity() {
        let first = MetavarBinder::new().bind("..x..");
        let second = MetavarBinder::new().bind("..x..");
        // Same name, different evaluations: never equal.
        assert_ne!(first, second);
    }

    #[test]
    fn test_placeholder_unequal_to_data() {
        let binder = MetavarBinder::new();
        let m = binder.bind("..x..");
        assert_ne!(m, Value::Int(0));
        assert_ne!(m, Value::Str("..x..".to_string()));
        assert_ne!(m, Value::Nil);
    }
}
