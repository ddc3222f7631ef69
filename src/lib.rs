//! Stackform — a declarative resource-stack evaluator.
//!
//! Templates declare named resources and outputs. Resources are created
//! lazily, exactly once, in dependency order; `Ref` and `Fn::*` expressions
//! are resolved against caller-registered inputs, types and functions.

pub mod cli;
pub mod core;
pub mod functions;
pub mod resources;

pub use crate::core::error::{ErrorKind, Result, StackError};
pub use crate::core::resource::{Properties, Resource};
pub use crate::core::stack::Stack;
pub use crate::core::template::Template;
pub use crate::core::value::{Dict, FromValue, Handle, Value};
