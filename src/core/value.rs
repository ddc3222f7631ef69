//! ST-001: Dynamically-typed value model.
//!
//! Every piece of structural data flowing through the evaluator (template
//! nodes, evaluated properties, function arguments, outputs) is a [`Value`].
//! Typed access goes through [`FromValue`], which fails with
//! [`ErrorKind::WrongType`](super::error::ErrorKind::WrongType) on a tag mismatch.

use super::error::{Result, StackError};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// String-keyed map of values. Keys are unique; order is kept only so
/// printed output is deterministic.
pub type Dict = IndexMap<String, Value>;

/// A template or runtime value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Dict(Dict),
    /// Opaque value exposed by a live resource.
    Handle(Handle),
}

/// Type-erased, shared handle to a resource's exposed value.
#[derive(Clone)]
pub struct Handle {
    inner: Rc<dyn Any>,
    type_name: &'static str,
}

impl Handle {
    pub fn new<T: Any>(value: Rc<T>) -> Self {
        Self {
            inner: value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Concrete type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recover the typed pointer, or `None` if `T` is not the wrapped type.
    pub fn downcast<T: Any>(&self) -> Option<Rc<T>> {
        Rc::clone(&self.inner).downcast::<T>().ok()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>", self.type_name)
    }
}

impl Value {
    /// Wrap a shared resource value as an opaque handle.
    pub fn handle<T: Any>(value: Rc<T>) -> Self {
        Self::Handle(Handle::new(value))
    }

    /// Name of the dynamic tag, used in type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Dict(_) => "dictionary",
            Self::Handle(_) => "handle",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Type-checked extraction.
    pub fn extract<T: FromValue>(self) -> Result<T> {
        T::from_value(self, "value")
    }
}

/// Conversion out of a [`Value`] with a tag check.
pub trait FromValue: Sized {
    /// Human-readable name of the expected type.
    const EXPECTED: &'static str;

    /// Convert, or fail with `WrongType` describing `what`.
    fn from_value(value: Value, what: &str) -> Result<Self>;
}

fn mismatch<T: FromValue>(value: &Value, what: &str) -> StackError {
    StackError::wrong_type(what, T::EXPECTED, value.type_name())
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any value";

    fn from_value(value: Value, _what: &str) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_value(value: Value, what: &str) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch::<Self>(&other, what)),
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "number";

    fn from_value(value: Value, what: &str) -> Result<Self> {
        match value {
            Value::Number(n) => Ok(n),
            other => Err(mismatch::<Self>(&other, what)),
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "integral number";

    fn from_value(value: Value, what: &str) -> Result<Self> {
        match value {
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Ok(n as i64),
            other => Err(mismatch::<Self>(&other, what)),
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: Value, what: &str) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(mismatch::<Self>(&other, what)),
        }
    }
}

impl FromValue for Vec<Value> {
    const EXPECTED: &'static str = "list";

    fn from_value(value: Value, what: &str) -> Result<Self> {
        match value {
            Value::List(items) => Ok(items),
            other => Err(mismatch::<Self>(&other, what)),
        }
    }
}

impl FromValue for Dict {
    const EXPECTED: &'static str = "dictionary";

    fn from_value(value: Value, what: &str) -> Result<Self> {
        match value {
            Value::Dict(d) => Ok(d),
            other => Err(mismatch::<Self>(&other, what)),
        }
    }
}

impl<T: Any> FromValue for Rc<T> {
    const EXPECTED: &'static str = "resource handle";

    fn from_value(value: Value, what: &str) -> Result<Self> {
        match value {
            Value::Handle(ref h) => h.downcast::<T>().ok_or_else(|| {
                StackError::wrong_type(
                    what,
                    std::any::type_name::<T>(),
                    h.type_name(),
                )
            }),
            other => Err(mismatch::<Self>(&other, what)),
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Self::Dict(d)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match json {
            J::Null => Self::Null,
            J::Bool(b) => Self::Bool(b),
            J::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            J::String(s) => Self::String(s),
            J::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            J::Object(map) => Self::Dict(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect()),
        }
    }
}

impl TryFrom<serde_yaml_ng::Value> for Value {
    type Error = StackError;

    fn try_from(yaml: serde_yaml_ng::Value) -> Result<Self> {
        use serde_yaml_ng::Value as Y;
        Ok(match yaml {
            Y::Null => Self::Null,
            Y::Bool(b) => Self::Bool(b),
            Y::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Y::String(s) => Self::String(s),
            Y::Sequence(items) => Self::List(
                items
                    .into_iter()
                    .map(Self::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Y::Mapping(map) => {
                let mut dict = Dict::new();
                for (k, v) in map {
                    let key = match k {
                        Y::String(s) => s,
                        other => {
                            return Err(StackError::parse(format!(
                                "mapping keys must be strings, got {:?}",
                                other
                            )))
                        }
                    };
                    dict.insert(key, Self::try_from(v)?);
                }
                Self::Dict(dict)
            }
            Y::Tagged(tagged) => Self::try_from(tagged.value)?,
        })
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Dict(d) => {
                let mut map = serializer.serialize_map(Some(d.len()))?;
                for (k, v) in d {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Self::Handle(h) => serializer.serialize_str(&format!("<handle:{}>", h.type_name())),
        }
    }
}
