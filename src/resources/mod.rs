//! Built-in resource types, registered under the `Local::` namespace.
//!
//! Each type stores its evaluated properties, performs one local side effect
//! in `create()`, and exposes a plain value to `Ref`:
//! 1. `Local::Value`: exposes its `Value` property unchanged
//! 2. `Local::File` / `Local::Directory`: write to the local filesystem
//! 3. `Local::Command`: run a bash script and expose its stdout

pub mod command;
pub mod file;
pub mod value;

use crate::core::stack::Stack;

pub const VALUE_TYPE: &str = "Local::Value";
pub const FILE_TYPE: &str = "Local::File";
pub const DIRECTORY_TYPE: &str = "Local::Directory";
pub const COMMAND_TYPE: &str = "Local::Command";

/// Register every built-in resource type on `stack`.
pub fn register_builtins(stack: &mut Stack) {
    stack.register_type(VALUE_TYPE, || Box::<value::ValueResource>::default());
    stack.register_type(FILE_TYPE, || Box::<file::FileResource>::default());
    stack.register_type(DIRECTORY_TYPE, || Box::<file::DirectoryResource>::default());
    stack.register_type(COMMAND_TYPE, || Box::<command::CommandResource>::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_types_registered() {
        let mut stack = Stack::new();
        register_builtins(&mut stack);
        for t in [VALUE_TYPE, FILE_TYPE, DIRECTORY_TYPE, COMMAND_TYPE] {
            assert!(stack.has_type(t), "{} not registered", t);
        }
    }
}
