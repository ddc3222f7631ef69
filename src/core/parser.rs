//! ST-009: Template/input loading and static validation.
//!
//! Parses JSON or YAML templates into a [`Template`], loads input files
//! (JSON, YAML or TOML), and validates a template against a stack's
//! registries without constructing anything:
//! - Resource names must be alphanumeric
//! - Every resource needs a string `Type` that is registered
//! - `Properties` must be a dictionary
//! - `DependsOn` and `Ref` targets must exist (as resources or inputs)
//! - `Fn::*` names must be registered
//! - No dependency cycles

use super::error::{ErrorKind, Result, StackError};
use super::evaluator::{FN_PREFIX, REF_KEY};
use super::graph;
use super::stack::Stack;
use super::template::Template;
use super::value::{Dict, Value};
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;

static LOGICAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("static regex"));

/// Validation finding.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a JSON template.
pub fn parse_template_json(json: &str) -> Result<Template> {
    let tree: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| StackError::parse(format!("JSON parse error: {}", e)))?;
    Template::from_value(Value::from(tree))
}

/// Parse a YAML template.
pub fn parse_template_yaml(yaml: &str) -> Result<Template> {
    let tree: serde_yaml_ng::Value = serde_yaml_ng::from_str(yaml)
        .map_err(|e| StackError::parse(format!("YAML parse error: {}", e)))?;
    Template::from_value(Value::try_from(tree)?)
}

/// Parse a template file. `.yaml`/`.yml` are YAML, anything else JSON.
pub fn parse_template_file(path: &Path) -> Result<Template> {
    let content = read(path)?;
    match extension(path).as_str() {
        "yaml" | "yml" => parse_template_yaml(&content),
        _ => parse_template_json(&content),
    }
}

/// Load a name → value map of inputs from JSON, YAML or TOML.
pub fn parse_inputs_file(path: &Path) -> Result<Dict> {
    let content = read(path)?;
    let root = match extension(path).as_str() {
        "yaml" | "yml" => {
            let tree: serde_yaml_ng::Value = serde_yaml_ng::from_str(&content)
                .map_err(|e| StackError::parse(format!("YAML parse error: {}", e)))?;
            Value::try_from(tree)?
        }
        "toml" => {
            let table: toml::Table = content
                .parse()
                .map_err(|e| StackError::parse(format!("TOML parse error: {}", e)))?;
            from_toml(toml::Value::Table(table))
        }
        _ => {
            let tree: serde_json::Value = serde_json::from_str(&content)
                .map_err(|e| StackError::parse(format!("JSON parse error: {}", e)))?;
            Value::from(tree)
        }
    };
    match root {
        Value::Dict(d) => Ok(d),
        other => Err(StackError::new(
            ErrorKind::TypeMismatch,
            format!("inputs must be a dictionary, got {}", other.type_name()),
        )),
    }
}

/// Parse a `name=value` input. The value is read as JSON when it parses,
/// otherwise taken as a plain string.
pub fn parse_input_assignment(assignment: &str) -> Result<(String, Value)> {
    let (name, raw) = assignment.split_once('=').ok_or_else(|| {
        StackError::parse(format!("input '{}' must look like name=value", assignment))
    })?;
    let value = serde_json::from_str::<serde_json::Value>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw));
    Ok((name.trim().to_string(), value))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| StackError::parse(format!("failed to read {}: {}", path.display(), e)))
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i as f64),
        toml::Value::Float(f) => Value::Number(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::List(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => {
            Value::Dict(table.into_iter().map(|(k, v)| (k, from_toml(v))).collect())
        }
    }
}

/// Validate a template against the stack's registries. Returns every
/// finding (empty = valid).
pub fn validate_template(template: &Template, stack: &Stack) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let inputs = stack.input_names();
    let is_input = |name: &str| inputs.iter().any(|i| i == name);
    let known = |name: &str| is_input(name) || template.resources.contains_key(name);

    for (id, node) in &template.resources {
        if !LOGICAL_ID.is_match(id) {
            errors.push(err(format!(
                "resource '{}' has a non-alphanumeric name",
                id
            )));
        }

        if node.as_dict().is_none() {
            errors.push(err(format!(
                "resource '{}' must be a dictionary, got {}",
                id,
                node.type_name()
            )));
            continue;
        }

        let Some(decl) = template.resource(id) else {
            continue;
        };

        match decl.type_name() {
            Ok(t) if !stack.has_type(t) => {
                errors.push(err(format!("resource '{}' has unknown type '{}'", id, t)));
            }
            Ok(_) => {}
            Err(e) => errors.push(err(format!("resource '{}': {}", id, e.message))),
        }

        match decl.depends_on() {
            Ok(deps) => {
                for dep in deps {
                    if dep == id {
                        errors.push(err(format!("resource '{}' depends on itself", id)));
                    } else if !template.resources.contains_key(dep) {
                        errors.push(err(format!(
                            "resource '{}' depends on unknown resource '{}'",
                            id, dep
                        )));
                    }
                }
            }
            Err(e) => errors.push(err(format!("resource '{}': {}", id, e.message))),
        }

        if let Some(props) = decl.properties_node() {
            if props.as_dict().is_none() {
                errors.push(err(format!(
                    "resource '{}' has non-dictionary Properties ({})",
                    id,
                    props.type_name()
                )));
            }
            check_expression(&format!("resource '{}'", id), props, &known, stack, &mut errors);
        }
    }

    for (name, expr) in &template.outputs {
        check_expression(&format!("output '{}'", name), expr, &known, stack, &mut errors);
    }

    if let Err(e) = graph::creation_order(template, &is_input) {
        errors.push(err(e.message));
    }

    errors
}

fn check_expression(
    site: &str,
    node: &Value,
    known: &dyn Fn(&str) -> bool,
    stack: &Stack,
    errors: &mut Vec<ValidationError>,
) {
    match node {
        Value::List(items) => {
            for item in items {
                check_expression(site, item, known, stack, errors);
            }
        }
        Value::Dict(dict) => {
            if let (1, Some((key, arg))) = (dict.len(), dict.first()) {
                if key == REF_KEY {
                    match arg.as_str() {
                        Some(target) if !known(target) => errors.push(err(format!(
                            "{} references unknown resource or input '{}'",
                            site, target
                        ))),
                        Some(_) => {}
                        None => errors.push(err(format!(
                            "{} has a non-string Ref ({})",
                            site,
                            arg.type_name()
                        ))),
                    }
                    return;
                }
                if let Some(function) = key.strip_prefix(FN_PREFIX) {
                    if !stack.has_function(function) {
                        errors.push(err(format!(
                            "{} calls unknown function '{}'",
                            site, key
                        )));
                    }
                }
            }
            for value in dict.values() {
                check_expression(site, value, known, stack, errors);
            }
        }
        _ => {}
    }
}

fn err(message: String) -> ValidationError {
    ValidationError { message }
}
