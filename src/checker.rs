//! Value matching: checkers, expected specs, and the single `matches`
//! algorithm shared by assertion checking and argument matching.
//!
//! An [`Expected`] describes the right-hand side of an assertion or one
//! argument position of a provided clause. [`matches`] judges an actual
//! value against it. The same algorithm backs both call sites, so a
//! checker behaves identically whether it guards a fact's result or a
//! mocked call's argument.

use std::fmt;
use std::rc::Rc;

use glob::Pattern;
use regex::Regex;

use crate::value::{FuncRef, Value};

/// A named, reusable predicate over values.
///
/// Checkers are stateless and can be shared across facts. New checkers can
/// be added through [`CheckerRegistry`](crate::CheckerRegistry) without
/// touching the matching core.
///
/// # Example
///
/// ```rust
/// use factual::{Checker, Value};
///
/// let positive = Checker::new("positive?", |v| matches!(v, Value::Int(n) if *n > 0));
/// assert!(positive.matches(&Value::Int(3)));
/// assert!(!positive.matches(&Value::Int(-3)));
/// ```
#[derive(Clone)]
pub struct Checker {
    name: String,
    test: Rc<dyn Fn(&Value) -> bool>,
}

impl Checker {
    /// Create a checker from a name and a predicate.
    pub fn new(name: impl Into<String>, test: impl Fn(&Value) -> bool + 'static) -> Self {
        Self {
            name: name.into(),
            test: Rc::new(test),
        }
    }

    /// The name used in descriptions and failure reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the predicate against an actual value.
    pub fn matches(&self, actual: &Value) -> bool {
        (self.test)(actual)
    }

    /// Matches any value other than `false` and `nil`.
    pub fn truthy() -> Self {
        Checker::new("truthy", Value::is_truthy)
    }

    /// Matches every value.
    pub fn anything() -> Self {
        Checker::new("anything", |_| true)
    }

    /// Matches only a value equal to `expected` under identity semantics:
    /// reference identity for functions, strict equality otherwise.
    ///
    /// This exists because two function values can be behaviorally
    /// indistinguishable yet must be treated as distinct.
    pub fn exactly(expected: Value) -> Self {
        let name = format!("exactly {}", expected);
        Checker::new(name, move |actual| *actual == expected)
    }

    /// Order-insensitive collection match with multiset semantics:
    /// element multiplicities must agree, not just the set of distinct
    /// elements.
    ///
    /// # Example
    ///
    /// ```rust
    /// use factual::{Checker, Value};
    ///
    /// let c = Checker::in_any_order(vec![Value::from(1), Value::from(2), Value::from(3)]);
    /// assert!(c.matches(&Value::from(vec![Value::from(3), Value::from(1), Value::from(2)])));
    /// // Duplicate counts must agree as well.
    /// assert!(!c.matches(&Value::from(vec![
    ///     Value::from(3), Value::from(3), Value::from(1), Value::from(2),
    /// ])));
    /// ```
    pub fn in_any_order(expected: Vec<Value>) -> Self {
        let name = format!("in-any-order {}", Value::List(expected.clone()));
        Checker::new(name, move |actual| match actual {
            Value::List(items) => multiset_eq(items, &expected),
            _ => false,
        })
    }

    /// Matches string values against a pattern, trying glob first, then
    /// regex, then exact string comparison.
    ///
    /// # Example
    ///
    /// ```rust
    /// use factual::{Checker, Value};
    ///
    /// let c = Checker::pattern("*.txt");
    /// assert!(c.matches(&Value::from("notes.txt")));
    /// assert!(!c.matches(&Value::from("notes.rs")));
    /// ```
    pub fn pattern(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let name = format!("pattern \"{}\"", pattern);
        Checker::new(name, move |actual| {
            let s = match actual {
                Value::Str(s) => s,
                _ => return false,
            };

            // Try glob pattern first
            if let Ok(g) = Pattern::new(&pattern) {
                if g.matches(s) {
                    return true;
                }
            }

            // Try regex
            if let Ok(re) = Regex::new(&pattern) {
                if re.is_match(s) {
                    return true;
                }
            }

            // Exact match fallback
            s == &pattern
        })
    }

    /// Wrap a function value as a checker: the function is invoked with the
    /// actual value and any truthy result counts as a match. An erroring
    /// predicate does not match.
    pub fn predicate(f: FuncRef) -> Self {
        let name = f.name().to_string();
        Checker::new(name, move |actual| {
            match f.invoke(std::slice::from_ref(actual)) {
                Ok(v) => v.is_truthy(),
                Err(_) => false,
            }
        })
    }
}

impl fmt::Debug for Checker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checker({})", self.name)
    }
}

/// Multiset equality: same length and identical element multiplicities.
fn multiset_eq(actual: &[Value], expected: &[Value]) -> bool {
    if actual.len() != expected.len() {
        return false;
    }
    let mut used = vec![false; expected.len()];
    'outer: for item in actual {
        for (i, candidate) in expected.iter().enumerate() {
            if !used[i] && item == candidate {
                used[i] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

/// The declared expectation an actual value is judged against.
///
/// Assertions and provided-clause argument positions both use this type.
/// `Named` and `Metavar` forms are symbolic: the evaluator resolves them
/// (against the checker registry and the fact's metavariable binder) before
/// anything executes, so [`matches`] only ever sees resolved forms.
#[derive(Debug, Clone)]
pub enum Expected {
    /// A literal value, compared structurally. A function literal is
    /// treated as a single-argument predicate with truthy-result
    /// semantics instead.
    Value(Value),
    /// A checker object.
    Check(Checker),
    /// A checker referenced by registry name, resolved during validation.
    Named { name: String, args: Vec<Value> },
    /// A fact-scoped metavariable, resolved when metavariables are bound.
    Metavar(String),
    /// The wildcard: matches every argument.
    Anything,
    /// Identity comparison; see [`Checker::exactly`].
    Exactly(Value),
}

impl Expected {
    /// Human-readable rendering of what was expected.
    pub fn describe(&self) -> String {
        match self {
            Expected::Value(Value::Func(f)) => f.name().to_string(),
            Expected::Value(v) => v.to_string(),
            Expected::Check(c) => c.name().to_string(),
            Expected::Named { name, args } => {
                if args.is_empty() {
                    name.clone()
                } else {
                    format!(
                        "{} {}",
                        name,
                        args.iter().map(Value::to_string).collect::<Vec<_>>().join(" ")
                    )
                }
            }
            Expected::Metavar(name) => name.clone(),
            Expected::Anything => "anything".to_string(),
            Expected::Exactly(v) => format!("exactly {}", v),
        }
    }

    /// The checker description surfaced in assertion outcomes: the checker
    /// or predicate name where one is involved, "equals" for plain
    /// literals.
    pub fn checker_description(&self) -> String {
        match self {
            Expected::Value(Value::Func(f)) => f.name().to_string(),
            Expected::Value(_) => "equals".to_string(),
            Expected::Check(c) => c.name().to_string(),
            Expected::Named { name, .. } => name.clone(),
            Expected::Metavar(_) => "equals".to_string(),
            Expected::Anything => "anything".to_string(),
            Expected::Exactly(_) => "exactly".to_string(),
        }
    }
}

/// Judge an actual value against an expected spec.
///
/// This single algorithm serves both call sites: fact-result assertion
/// checking and provided-clause argument matching.
///
/// # Example
///
/// ```rust
/// use factual::{matches, Expected, Value};
///
/// assert!(matches(&Value::Int(4), &Expected::from(4)));
/// assert!(matches(&Value::Int(4), &Expected::Anything));
/// assert!(!matches(&Value::Int(4), &Expected::from(5)));
/// ```
pub fn matches(actual: &Value, expected: &Expected) -> bool {
    match expected {
        // A bare function literal acts as a predicate.
        Expected::Value(Value::Func(f)) => match f.invoke(std::slice::from_ref(actual)) {
            Ok(v) => v.is_truthy(),
            Err(_) => false,
        },
        Expected::Value(v) => actual == v,
        Expected::Check(c) => c.matches(actual),
        Expected::Anything => true,
        // Value equality already treats functions as identities.
        Expected::Exactly(v) => actual == v,
        // Unresolved symbolic forms never match; the evaluator resolves
        // them before execution.
        Expected::Named { .. } | Expected::Metavar(_) => false,
    }
}

/// The wildcard matcher.
pub fn anything() -> Expected {
    Expected::Anything
}

/// Identity match; accepts only the exact same value (by reference for
/// functions).
pub fn exactly(v: impl Into<Value>) -> Expected {
    Expected::Exactly(v.into())
}

/// Reference a fact-scoped metavariable by name.
pub fn metavar(name: impl Into<String>) -> Expected {
    Expected::Metavar(name.into())
}

/// Reference a registered checker by name; resolved against the fact's
/// checker registry before execution.
pub fn named(name: impl Into<String>, args: Vec<Value>) -> Expected {
    Expected::Named {
        name: name.into(),
        args,
    }
}

impl From<Value> for Expected {
    fn from(v: Value) -> Self {
        Expected::Value(v)
    }
}

impl From<Checker> for Expected {
    fn from(c: Checker) -> Self {
        Expected::Check(c)
    }
}

impl From<FuncRef> for Expected {
    fn from(f: FuncRef) -> Self {
        Expected::Value(Value::Func(f))
    }
}

impl From<bool> for Expected {
    fn from(b: bool) -> Self {
        Expected::Value(Value::from(b))
    }
}

impl From<i32> for Expected {
    fn from(i: i32) -> Self {
        Expected::Value(Value::from(i))
    }
}

impl From<i64> for Expected {
    fn from(i: i64) -> Self {
        Expected::Value(Value::from(i))
    }
}

impl From<f64> for Expected {
    fn from(x: f64) -> Self {
        Expected::Value(Value::from(x))
    }
}

impl From<&str> for Expected {
    fn from(s: &str) -> Self {
        Expected::Value(Value::from(s))
    }
}

impl From<String> for Expected {
    fn from(s: String) -> Self {
        Expected::Value(Value::from(s))
    }
}

impl From<Vec<Value>> for Expected {
    fn from(items: Vec<Value>) -> Self {
        Expected::Value(Value::List(items))
    }
}

/// Build a matcher list for a provided clause.
///
/// Accepts anything convertible into [`Expected`]: literals, checkers,
/// function predicates, or other matchers.
///
/// # Example
///
/// ```rust,ignore
/// use factual::{anything, args, Checker};
///
/// let matchers = args![2, anything(), Checker::truthy()];
/// ```
#[macro_export]
macro_rules! args {
    ($($m:expr),* $(,)?) => {
        vec![$($crate::Expected::from($m)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn odd() -> FuncRef {
        FuncRef::new("odd?", |args| match args {
            [Value::Int(n)] => Ok(Value::Bool(n % 2 != 0)),
            _ => Ok(Value::Bool(false)),
        })
    }

    #[test]
    fn test_literal_equality() {
        assert!(matches(&Value::Int(4), &Expected::from(4)));
        assert!(!matches(&Value::Int(4), &Expected::from(5)));
        assert!(matches(&Value::from("a"), &Expected::from("a")));
        assert!(matches(&Value::Nil, &Expected::Value(Value::Nil)));
    }

    #[test]
    fn test_function_literal_is_a_predicate() {
        let expected = Expected::from(odd());
        assert!(matches(&Value::Int(3), &expected));
        assert!(!matches(&Value::Int(4), &expected));
    }

    #[test]
    fn test_predicate_truthiness_rule() {
        // Any non-false, non-nil result counts as a match.
        let yes = FuncRef::new("yes", |_| Ok(Value::Int(0)));
        assert!(matches(&Value::Nil, &Expected::from(yes)));

        let no = FuncRef::new("no", |_| Ok(Value::Nil));
        assert!(!matches(&Value::Int(1), &Expected::from(no)));
    }

    #[test]
    fn test_erroring_predicate_does_not_match() {
        let broken = FuncRef::new("broken", |_| anyhow::bail!("boom"));
        assert!(!matches(&Value::Int(1), &Expected::from(broken)));
    }

    #[test]
    fn test_truthy_checker() {
        let truthy = Checker::truthy();
        assert!(truthy.matches(&Value::Int(0)));
        assert!(truthy.matches(&Value::Str(String::new())));
        assert!(!truthy.matches(&Value::Bool(false)));
        assert!(!truthy.matches(&Value::Nil));
    }

    #[test]
    fn test_exactly_is_reference_identity_for_functions() {
        let f = odd();
        let same_behavior = odd();

        let expected = exactly(f.clone());
        assert!(matches(&Value::Func(f), &expected));
        assert!(!matches(&Value::Func(same_behavior), &expected));
    }

    #[test]
    fn test_exactly_plain_value() {
        assert!(matches(&Value::Int(3), &exactly(3)));
        assert!(!matches(&Value::Int(4), &exactly(3)));
    }

    #[test]
    fn test_in_any_order_accepts_permutation() {
        let c = Checker::in_any_order(vec![Value::from(3), Value::from(1), Value::from(2)]);
        assert!(c.matches(&Value::from(vec![
            Value::from(1),
            Value::from(2),
            Value::from(3),
        ])));
    }

    #[test]
    fn test_in_any_order_rejects_duplicate_count_mismatch() {
        let c = Checker::in_any_order(vec![Value::from(1), Value::from(2), Value::from(3)]);
        assert!(!c.matches(&Value::from(vec![
            Value::from(3),
            Value::from(3),
            Value::from(1),
            Value::from(2),
        ])));

        // Same distinct elements, different multiplicities, same length.
        let c = Checker::in_any_order(vec![Value::from(1), Value::from(1), Value::from(2)]);
        assert!(!c.matches(&Value::from(vec![
            Value::from(1),
            Value::from(2),
            Value::from(2),
        ])));
    }

    #[test]
    fn test_in_any_order_rejects_non_list() {
        let c = Checker::in_any_order(vec![Value::from(1)]);
        assert!(!c.matches(&Value::Int(1)));
    }

    #[test]
    fn test_pattern_glob() {
        let c = Checker::pattern("*.env");
        assert!(c.matches(&Value::from(".env")));
        assert!(c.matches(&Value::from("test.env")));
        assert!(!c.matches(&Value::from("test.txt")));
    }

    #[test]
    fn test_pattern_regex() {
        let c = Checker::pattern(r"^npm (install|i)$");
        assert!(c.matches(&Value::from("npm install")));
        assert!(c.matches(&Value::from("npm i")));
        assert!(!c.matches(&Value::from("npm run")));
    }

    #[test]
    fn test_pattern_non_string() {
        let c = Checker::pattern("42");
        assert!(!c.matches(&Value::Int(42)));
    }

    #[test]
    fn test_anything_matches_everything() {
        assert!(matches(&Value::Nil, &anything()));
        assert!(matches(&Value::Bool(false), &anything()));
        assert!(matches(&Value::Func(odd()), &anything()));
    }

    #[test]
    fn test_unresolved_forms_never_match() {
        let named = Expected::Named {
            name: "truthy".to_string(),
            args: vec![],
        };
        assert!(!matches(&Value::Int(1), &named));
        assert!(!matches(&Value::Int(1), &Expected::Metavar("..x..".to_string())));
    }

    #[test]
    fn test_describe() {
        assert_eq!(Expected::from(11).describe(), "11");
        assert_eq!(Expected::from(odd()).describe(), "odd?");
        assert_eq!(anything().describe(), "anything");
        assert_eq!(
            Checker::in_any_order(vec![Value::from(1), Value::from(2)]).name(),
            "in-any-order [1, 2]"
        );
    }

    #[test]
    fn test_checker_description() {
        assert_eq!(Expected::from(11).checker_description(), "equals");
        assert_eq!(Expected::from(odd()).checker_description(), "odd?");
        assert_eq!(
            Expected::from(Checker::truthy()).checker_description(),
            "truthy"
        );
    }

    /// Generator for data values (no functions or metavariables, whose
    /// equality is identity-based by design; no floats, which carry the
    /// usual NaN caveat).
    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Nil),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            "[a-zA-Z0-9 _.-]{0,20}".prop_map(Value::Str),
        ];
        leaf.prop_recursive(3, 16, 5, |inner| {
            prop::collection::vec(inner, 0..5).prop_map(Value::List)
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// For all literal values v, matches(v, v) holds.
        #[test]
        fn literal_match_is_reflexive(v in arb_value()) {
            prop_assert!(matches(&v, &Expected::Value(v.clone())));
        }

        /// A list always satisfies in-any-order over any permutation of
        /// itself (here: its reverse).
        #[test]
        fn in_any_order_accepts_reversal(items in prop::collection::vec(any::<i64>(), 0..8)) {
            let forward: Vec<Value> = items.iter().copied().map(Value::Int).collect();
            let mut reversed = forward.clone();
            reversed.reverse();
            let c = Checker::in_any_order(reversed);
            prop_assert!(c.matches(&Value::List(forward)));
        }
    }
}
