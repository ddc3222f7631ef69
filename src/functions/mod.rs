//! Built-in intrinsic functions, callable as `Fn::<Name>`.

pub mod encode;
pub mod text;

use crate::core::error::{ErrorKind, StackError};
use crate::core::stack::Stack;

/// Register every built-in function on `stack`.
pub fn register_builtins(stack: &mut Stack) {
    stack.register_function("Join", text::join);
    stack.register_function("Select", text::select);
    stack.register_function("Hash", encode::hash);
    stack.register_function("Base64", encode::base64);
}

pub(crate) fn bad_argument(function: &str, message: impl std::fmt::Display) -> StackError {
    StackError::new(
        ErrorKind::FunctionFailed,
        format!("Fn::{}: {}", function, message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_functions_registered() {
        let mut stack = Stack::new();
        register_builtins(&mut stack);
        for f in ["Join", "Select", "Hash", "Base64"] {
            assert!(stack.has_function(f), "{} not registered", f);
        }
    }
}
