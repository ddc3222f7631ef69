//! ST-004: Template shape — `Resources` and `Outputs` sections.
//!
//! A template is consumed as an already-parsed [`Value`] tree. Only the two
//! top-level sections are checked here; resource declarations are inspected
//! lazily, when the stack resolves them.

use super::error::{ErrorKind, Result, StackError};
use super::value::{Dict, Value};
use indexmap::IndexMap;

pub const RESOURCES_KEY: &str = "Resources";
pub const OUTPUTS_KEY: &str = "Outputs";
pub const TYPE_KEY: &str = "Type";
pub const PROPERTIES_KEY: &str = "Properties";
pub const DEPENDS_ON_KEY: &str = "DependsOn";

/// A parsed stack template.
#[derive(Debug, Clone, Default)]
pub struct Template {
    /// Resource declarations by name, in document order.
    pub resources: IndexMap<String, Value>,
    /// Output expressions by name, in document order.
    pub outputs: IndexMap<String, Value>,
}

impl Template {
    /// Split a parsed document into its sections.
    pub fn from_value(root: Value) -> Result<Self> {
        let mut root = match root {
            Value::Dict(d) => d,
            other => {
                return Err(StackError::new(
                    ErrorKind::TypeMismatch,
                    format!("template root must be a dictionary, got {}", other.type_name()),
                ))
            }
        };
        Ok(Self {
            resources: take_section(&mut root, RESOURCES_KEY)?,
            outputs: take_section(&mut root, OUTPUTS_KEY)?,
        })
    }

    /// View of the declaration for `name`, if declared.
    pub fn resource(&self, name: &str) -> Option<ResourceDecl<'_>> {
        self.resources
            .get_key_value(name)
            .map(|(name, node)| ResourceDecl { name, node })
    }
}

fn take_section(root: &mut Dict, key: &str) -> Result<IndexMap<String, Value>> {
    match root.shift_remove(key) {
        None => Ok(IndexMap::new()),
        Some(Value::Dict(d)) => Ok(d),
        Some(other) => Err(StackError::new(
            ErrorKind::TypeMismatch,
            format!("'{}' must be a dictionary, got {}", key, other.type_name()),
        )),
    }
}

/// Borrowed view over a single `Resources` entry.
#[derive(Debug, Clone, Copy)]
pub struct ResourceDecl<'a> {
    pub name: &'a str,
    pub node: &'a Value,
}

impl<'a> ResourceDecl<'a> {
    fn field(&self, key: &str) -> Option<&'a Value> {
        self.node.as_dict().and_then(|d| d.get(key))
    }

    /// The `Type` string selecting the constructor.
    pub fn type_name(&self) -> Result<&'a str> {
        match self.field(TYPE_KEY) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(StackError::new(
                ErrorKind::MissingType,
                format!("'Type' must be a string, got {}", other.type_name()),
            )),
            None => Err(StackError::new(
                ErrorKind::MissingType,
                "resource has no 'Type'",
            )),
        }
    }

    /// Unevaluated `Properties` node; absent means an empty dictionary.
    pub fn properties(&self) -> Value {
        self.field(PROPERTIES_KEY)
            .cloned()
            .unwrap_or_else(|| Value::Dict(Dict::new()))
    }

    /// Borrowed `Properties` node, if declared.
    pub fn properties_node(&self) -> Option<&'a Value> {
        self.field(PROPERTIES_KEY)
    }

    /// Names listed under `DependsOn` (a string or a list of strings).
    pub fn depends_on(&self) -> Result<Vec<&'a str>> {
        match self.field(DEPENDS_ON_KEY) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(vec![s.as_str()]),
            Some(Value::List(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().ok_or_else(|| {
                        StackError::new(
                            ErrorKind::TypeMismatch,
                            format!("'DependsOn' entries must be strings, got {}", item.type_name()),
                        )
                    })
                })
                .collect(),
            Some(other) => Err(StackError::new(
                ErrorKind::TypeMismatch,
                format!(
                    "'DependsOn' must be a string or list, got {}",
                    other.type_name()
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(json: &str) -> Result<Template> {
        let v: serde_json::Value = serde_json::from_str(json).unwrap();
        Template::from_value(Value::from(v))
    }

    #[test]
    fn test_st004_empty_template() {
        let t = template("{}").unwrap();
        assert!(t.resources.is_empty());
        assert!(t.outputs.is_empty());
    }

    #[test]
    fn test_st004_sections_split() {
        let t = template(
            r#"{"Resources": {"B": {"Type": "X"}, "A": {"Type": "Y"}}, "Outputs": {"o": 1}}"#,
        )
        .unwrap();
        let names: Vec<_> = t.resources.keys().cloned().collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(t.outputs.len(), 1);
    }

    #[test]
    fn test_st004_root_not_dict() {
        let err = template("[1, 2]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_st004_resources_not_dict() {
        let err = template(r#"{"Resources": [1]}"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert!(err.message.contains("Resources"));
        let err = template(r#"{"Outputs": "nope"}"#).unwrap_err();
        assert!(err.message.contains("Outputs"));
    }

    #[test]
    fn test_st004_decl_type_and_properties() {
        let t = template(r#"{"Resources": {"A": {"Type": "Foo"}, "B": {"Type": 3}, "C": {}}}"#)
            .unwrap();
        let a = t.resource("A").unwrap();
        assert_eq!(a.type_name().unwrap(), "Foo");
        assert!(matches!(a.properties(), Value::Dict(d) if d.is_empty()));
        assert_eq!(
            t.resource("B").unwrap().type_name().unwrap_err().kind,
            ErrorKind::MissingType
        );
        assert_eq!(
            t.resource("C").unwrap().type_name().unwrap_err().kind,
            ErrorKind::MissingType
        );
        assert!(t.resource("D").is_none());
    }

    #[test]
    fn test_st004_depends_on_forms() {
        let t = template(
            r#"{"Resources": {
                "A": {"Type": "T", "DependsOn": "B"},
                "B": {"Type": "T", "DependsOn": ["C", "D"]},
                "C": {"Type": "T", "DependsOn": [1]},
                "D": {"Type": "T"}
            }}"#,
        )
        .unwrap();
        assert_eq!(t.resource("A").unwrap().depends_on().unwrap(), vec!["B"]);
        assert_eq!(t.resource("B").unwrap().depends_on().unwrap(), vec!["C", "D"]);
        assert!(t.resource("C").unwrap().depends_on().is_err());
        assert!(t.resource("D").unwrap().depends_on().unwrap().is_empty());
    }
}
