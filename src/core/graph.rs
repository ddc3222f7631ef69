//! ST-008: Static dependency graph.
//!
//! Walks a template without constructing anything. Edges come from
//! `DependsOn` and from every `Ref` inside `Properties` whose target is not an
//! input. [`creation_order`] replays the same depth-first, document-ordered
//! walk that `Stack::build` performs, so its result is the order a
//! successful build will create resources in.

use super::error::{ErrorKind, Result, StackError};
use super::evaluator::REF_KEY;
use super::template::Template;
use super::value::Value;
use rustc_hash::FxHashMap;

/// Every `Ref` target in `node`, in evaluation order.
pub fn references(node: &Value) -> Vec<&str> {
    let mut out = Vec::new();
    collect_refs(node, &mut out);
    out
}

fn collect_refs<'a>(node: &'a Value, out: &mut Vec<&'a str>) {
    match node {
        Value::List(items) => {
            for item in items {
                collect_refs(item, out);
            }
        }
        Value::Dict(dict) => {
            if dict.len() == 1 {
                if let Some(Value::String(target)) = dict.get(REF_KEY) {
                    out.push(target);
                    return;
                }
            }
            for value in dict.values() {
                collect_refs(value, out);
            }
        }
        _ => {}
    }
}

/// Direct dependencies of `name`: `DependsOn` first, then property refs.
/// Inputs and undeclared targets are skipped.
pub fn dependencies<'a>(
    template: &'a Template,
    name: &str,
    is_input: &dyn Fn(&str) -> bool,
) -> Vec<&'a str> {
    let Some(decl) = template.resource(name) else {
        return Vec::new();
    };

    let mut deps: Vec<&'a str> = decl.depends_on().unwrap_or_default();
    if let Some(props) = decl.properties_node() {
        deps.extend(references(props).into_iter().filter(|r| !is_input(r)));
    }
    deps.retain(|d| template.resources.contains_key(*d));
    deps
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Active,
    Done,
}

/// Predicted creation order for a full build.
///
/// Fails with `CyclicDependency`, naming the cycle path, if any resource
/// transitively depends on itself.
pub fn creation_order(template: &Template, is_input: &dyn Fn(&str) -> bool) -> Result<Vec<String>> {
    let mut marks: FxHashMap<&str, Mark> = FxHashMap::default();
    let mut path: Vec<&str> = Vec::new();
    let mut order = Vec::with_capacity(template.resources.len());

    for name in template.resources.keys() {
        visit(template, name, is_input, &mut marks, &mut path, &mut order)?;
    }
    Ok(order)
}

fn visit<'a>(
    template: &'a Template,
    name: &'a str,
    is_input: &dyn Fn(&str) -> bool,
    marks: &mut FxHashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
    order: &mut Vec<String>,
) -> Result<()> {
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Active) => {
            let start = path.iter().position(|p| *p == name).unwrap_or(0);
            let mut cycle: Vec<&str> = path[start..].to_vec();
            cycle.push(name);
            return Err(StackError::new(
                ErrorKind::CyclicDependency,
                format!("dependency cycle: {}", cycle.join(" -> ")),
            )
            .with_resource(name));
        }
        None => {}
    }

    marks.insert(name, Mark::Active);
    path.push(name);
    for dep in dependencies(template, name, is_input) {
        visit(template, dep, is_input, marks, path, order)?;
    }
    path.pop();
    marks.insert(name, Mark::Done);
    order.push(name.to_string());
    Ok(())
}
