//! ST-002: Structured build errors.
//!
//! Every failure raised while resolving resources or evaluating expressions
//! is a [`StackError`]: a kind, a message, and the name of the resource whose
//! resolution was in progress when it surfaced.

use std::fmt;

/// Result alias used throughout the evaluator.
pub type Result<T> = std::result::Result<T, StackError>;

/// Failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ParseError,
    MissingType,
    UnknownType,
    UnknownResource,
    CyclicDependency,
    UnknownFunction,
    MissingRequired,
    WrongType,
    TypeMismatch,
    /// A resource's own side effect failed (I/O, subprocess, ...).
    CreateFailed,
    /// A function rejected its argument.
    FunctionFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ParseError => "parse-error",
            Self::MissingType => "missing-type",
            Self::UnknownType => "unknown-type",
            Self::UnknownResource => "unknown-resource",
            Self::CyclicDependency => "cyclic-dependency",
            Self::UnknownFunction => "unknown-function",
            Self::MissingRequired => "missing-required",
            Self::WrongType => "wrong-type",
            Self::TypeMismatch => "type-mismatch",
            Self::CreateFailed => "create-failed",
            Self::FunctionFailed => "function-failed",
        };
        write!(f, "{}", name)
    }
}

/// A build failure with optional resource context.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("[{kind}] {}{message}{}", context_prefix(.resource), trail_suffix(.trail))]
pub struct StackError {
    pub kind: ErrorKind,
    pub message: String,
    /// Innermost resource being built when the error was raised.
    pub resource: Option<String>,
    /// Enclosing resources, innermost first.
    pub trail: Vec<String>,
}

fn context_prefix(resource: &Option<String>) -> String {
    match resource {
        Some(name) => format!("resource '{}': ", name),
        None => String::new(),
    }
}

fn trail_suffix(trail: &[String]) -> String {
    if trail.is_empty() {
        String::new()
    } else {
        format!(" (while building {})", trail.join(" <- "))
    }
}

impl StackError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            resource: None,
            trail: Vec::new(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError, message)
    }

    pub fn wrong_type(what: &str, expected: &str, found: &str) -> Self {
        Self::new(
            ErrorKind::WrongType,
            format!("{} must be {}, got {}", what, expected, found),
        )
    }

    pub fn missing_required(key: &str) -> Self {
        Self::new(
            ErrorKind::MissingRequired,
            format!("missing required property '{}'", key),
        )
    }

    /// Attach resource context. The first name attached wins; later
    /// (outer) names are recorded in the trail.
    pub fn with_resource(mut self, name: &str) -> Self {
        match self.resource {
            None => self.resource = Some(name.to_string()),
            Some(ref inner) if inner == name => {}
            Some(_) => self.trail.push(name.to_string()),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_st002_display_plain() {
        let err = StackError::new(ErrorKind::UnknownFunction, "unknown function 'Nope'");
        assert_eq!(err.to_string(), "[unknown-function] unknown function 'Nope'");
    }

    #[test]
    fn test_st002_innermost_resource_kept() {
        let err = StackError::missing_required("i")
            .with_resource("Inner")
            .with_resource("Middle")
            .with_resource("Outer");
        assert_eq!(err.resource.as_deref(), Some("Inner"));
        assert_eq!(err.trail, vec!["Middle", "Outer"]);
        assert_eq!(
            err.to_string(),
            "[missing-required] resource 'Inner': missing required property 'i' \
             (while building Middle <- Outer)"
        );
    }

    #[test]
    fn test_st002_same_name_not_duplicated() {
        let err = StackError::parse("x").with_resource("A").with_resource("A");
        assert_eq!(err.resource.as_deref(), Some("A"));
        assert!(err.trail.is_empty());
    }

    #[test]
    fn test_st002_wrong_type_message() {
        let err = StackError::wrong_type("property 'i'", "number", "string");
        assert_eq!(err.kind, ErrorKind::WrongType);
        assert!(err.message.contains("must be number, got string"));
    }
}
