//! ST-013: `Fn::Join` and `Fn::Select`.

use super::bad_argument;
use crate::core::error::Result;
use crate::core::value::Value;

/// `[separator, [items...]]` → items joined by separator.
/// Items may be strings, numbers or booleans.
pub fn join(arg: Value) -> Result<Value> {
    let (separator, items) = pair(arg, "Join")?;
    let separator = separator
        .as_str()
        .ok_or_else(|| bad_argument("Join", "separator must be a string"))?
        .to_string();
    let parts = items
        .iter()
        .map(scalar_text)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| bad_argument("Join", "items must be strings, numbers or booleans"))?;
    Ok(Value::from(parts.join(&separator)))
}

/// `[index, [items...]]` → the item at `index`.
pub fn select(arg: Value) -> Result<Value> {
    let (index, items) = pair(arg, "Select")?;
    let index = match index {
        Value::Number(n) if n >= 0.0 && n.fract() == 0.0 => n as usize,
        other => {
            return Err(bad_argument(
                "Select",
                format!("index must be a non-negative integer, got {}", other.type_name()),
            ))
        }
    };
    let len = items.len();
    items.into_iter().nth(index).ok_or_else(|| {
        bad_argument("Select", format!("index {} out of range for {} items", index, len))
    })
}

fn pair(arg: Value, function: &str) -> Result<(Value, Vec<Value>)> {
    match arg {
        Value::List(mut args) if args.len() == 2 => match args.pop() {
            Some(Value::List(items)) => Ok((args.remove(0), items)),
            _ => Err(bad_argument(function, "second argument must be a list")),
        },
        _ => Err(bad_argument(function, "expected a two-element list")),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
