//! The dynamic value domain that facts match over.
//!
//! Assertions and argument matchers compare [`Value`]s. Data variants use
//! structural equality; function values compare by reference identity, and
//! metavariables compare by their binding id only.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Serialize, Serializer};

/// A dynamically-typed value.
///
/// # Example
///
/// ```rust
/// use factual::Value;
///
/// let v = Value::from(vec![Value::from(1), Value::from(2)]);
/// assert_eq!(v.to_string(), "[1, 2]");
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// The null/absent sentinel.
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// A function value. Equality is reference identity, never behavior.
    Func(FuncRef),
    /// An opaque placeholder bound for one fact evaluation.
    Metavar(Metavar),
}

impl Value {
    /// Every value other than `Bool(false)` and `Nil` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Convert a `serde_json::Value` into a [`Value`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use factual::Value;
    /// use serde_json::json;
    ///
    /// let v = Value::from_json(json!({"count": 3}));
    /// assert_eq!(v.to_string(), "{count: 3}");
    /// ```
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Render as a `serde_json::Value` for structured reports.
    ///
    /// Functions and metavariables have no data representation and render
    /// as opaque descriptor strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Nil => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Func(f) => serde_json::Value::String(format!("#<fn {}>", f.name())),
            Value::Metavar(m) => serde_json::Value::String(m.name().to_string()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Func(a), Value::Func(b)) => a.same(b),
            (Value::Metavar(a), Value::Metavar(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Func(func) => write!(f, "#<fn {}>", func.name()),
            Value::Metavar(m) => write!(f, "{}", m.name()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<FuncRef> for Value {
    fn from(f: FuncRef) -> Self {
        Value::Func(f)
    }
}

/// A named function value.
///
/// Two `FuncRef`s are equal only when they share the same underlying
/// closure. Behavioral equality of functions is undefined and never used.
///
/// # Example
///
/// ```rust
/// use factual::{FuncRef, Value};
///
/// let double = FuncRef::new("double", |args| {
///     match args {
///         [Value::Int(n)] => Ok(Value::Int(n * 2)),
///         _ => anyhow::bail!("double expects one integer"),
///     }
/// });
/// assert_eq!(double.invoke(&[Value::Int(3)]).unwrap(), Value::Int(6));
/// ```
#[derive(Clone)]
pub struct FuncRef {
    name: Rc<str>,
    f: Rc<dyn Fn(&[Value]) -> anyhow::Result<Value>>,
}

impl FuncRef {
    /// Create a function value from a name and a closure.
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(&[Value]) -> anyhow::Result<Value> + 'static,
    ) -> Self {
        Self {
            name: Rc::from(name.into()),
            f: Rc::new(f),
        }
    }

    /// The display name used in diagnostics and checker descriptions.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the underlying closure.
    pub fn invoke(&self, args: &[Value]) -> anyhow::Result<Value> {
        (self.f)(args)
    }

    /// Reference identity: true iff both refer to the same closure.
    pub fn same(&self, other: &FuncRef) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

impl PartialEq for FuncRef {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for FuncRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<fn {}>", self.name)
    }
}

/// An opaque placeholder value, unique per (name, fact evaluation) pair.
///
/// Metavariables carry no payload beyond identity: one is equal to itself
/// (and its clones) and unequal to every other value.
#[derive(Debug, Clone)]
pub struct Metavar {
    name: Rc<str>,
    id: u64,
}

impl Metavar {
    pub(crate) fn new(name: &str, id: u64) -> Self {
        Self {
            name: Rc::from(name),
            id,
        }
    }

    /// The symbolic name this placeholder was bound under.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Metavar {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
