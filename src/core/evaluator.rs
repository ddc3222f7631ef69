//! ST-005: Expression evaluation over template nodes.
//!
//! Literals pass through, lists and dictionaries are evaluated element-wise,
//! and two single-key forms are intrinsic:
//!
//! - `{"Ref": "<name>"}`: an input value, or the exposed value of a resource
//! - `{"Fn::<Name>": <arg>}`: a registered function applied to the evaluated arg

use super::error::{ErrorKind, Result, StackError};
use super::stack::Resolver;
use super::value::{Dict, Value};

pub const REF_KEY: &str = "Ref";
pub const FN_PREFIX: &str = "Fn::";

impl Resolver<'_> {
    /// Turn a template node into a value, resolving resources on demand.
    pub(crate) fn evaluate(&mut self, node: &Value) -> Result<Value> {
        match node {
            Value::List(items) => items
                .iter()
                .map(|item| self.evaluate(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            Value::Dict(dict) => {
                if let Some((key, arg)) = single_entry(dict) {
                    if key == REF_KEY {
                        return self.evaluate_ref(arg);
                    }
                    if let Some(function) = key.strip_prefix(FN_PREFIX) {
                        return self.evaluate_fn(function, arg);
                    }
                }
                let mut out = Dict::with_capacity(dict.len());
                for (key, value) in dict {
                    out.insert(key.clone(), self.evaluate(value)?);
                }
                Ok(Value::Dict(out))
            }
            literal => Ok(literal.clone()),
        }
    }

    fn evaluate_ref(&mut self, target: &Value) -> Result<Value> {
        let name = target.as_str().ok_or_else(|| {
            StackError::new(
                ErrorKind::TypeMismatch,
                format!("'Ref' target must be a string, got {}", target.type_name()),
            )
        })?;
        if let Some(input) = self.stack.inputs.get(name) {
            return Ok(input.clone());
        }
        Ok(self.resolve(name)?.get())
    }

    fn evaluate_fn(&mut self, function: &str, arg: &Value) -> Result<Value> {
        if !self.stack.functions.contains_key(function) {
            return Err(StackError::new(
                ErrorKind::UnknownFunction,
                format!("unknown function '{}{}'", FN_PREFIX, function),
            ));
        }
        let arg = self.evaluate(arg)?;
        let f = &self.stack.functions[function];
        f(arg)
    }
}

fn single_entry(dict: &Dict) -> Option<(&String, &Value)> {
    if dict.len() == 1 {
        dict.first()
    } else {
        None
    }
}
