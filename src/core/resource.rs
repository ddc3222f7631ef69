//! ST-003: Resource capability contract.
//!
//! A resource type is anything implementing [`Resource`]. The stack creates
//! instances through a registered [`Constructor`], hands them their evaluated
//! [`Properties`], calls `create()` once, and reads `get()` whenever another
//! resource or an output references it.

use super::error::{Result, StackError};
use super::value::{Dict, FromValue, Value};

/// Zero-argument factory producing an unconstructed resource.
pub type Constructor = Box<dyn Fn() -> Box<dyn Resource>>;

/// Capability interface every resource type implements.
pub trait Resource {
    /// Store the fully evaluated properties. Called exactly once, before `create`.
    fn set_properties(&mut self, properties: Properties);

    /// Perform the side-effecting construction. Called at most once.
    fn create(&mut self) -> Result<()>;

    /// Value exposed to `Ref`. Only meaningful after `create` succeeded.
    fn get(&self) -> Value;

    /// Teardown hook, run once in reverse creation order.
    fn destroy(&mut self) {}
}

/// Evaluated property map with typed accessors.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    values: Dict,
}

impl Properties {
    pub fn new(values: Dict) -> Self {
        Self { values }
    }

    /// Fetch a property that must be present and of type `T`.
    pub fn require<T: FromValue>(&self, key: &str) -> Result<T> {
        match self.values.get(key) {
            Some(v) => T::from_value(v.clone(), &format!("property '{}'", key)),
            None => Err(StackError::missing_required(key)),
        }
    }

    /// Fetch a property that may be absent (or null). Present values must
    /// still be of type `T`.
    pub fn optional<T: FromValue>(&self, key: &str) -> Result<Option<T>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => T::from_value(v.clone(), &format!("property '{}'", key)).map(Some),
        }
    }

    /// Borrow the raw map.
    pub fn as_dict(&self) -> &Dict {
        &self.values
    }
}
