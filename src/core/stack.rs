//! ST-006: Stack orchestrator — registries, lazy resolution, outputs, teardown.
//!
//! `build` walks `Resources` in document order and resolves every entry.
//! Resolution is depth-first and memoized: evaluating a resource's
//! `Properties` may `Ref` other resources, which are created first. A name
//! that is referenced again while its own resolution is still in progress is
//! a cycle. Teardown runs in the exact reverse of creation order.

use super::error::{ErrorKind, Result, StackError};
use super::eventlog::{StackEvent, TimestampedEvent};
use super::resource::{Constructor, Properties, Resource};
use super::template::{ResourceDecl, Template};
use super::value::{FromValue, Value};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::time::Instant;
use tracing::{debug, warn};

/// A caller-supplied intrinsic, invoked as `Fn::<name>`.
pub type Function = Box<dyn Fn(Value) -> Result<Value>>;

/// Owns every registry and every resource it creates.
pub struct Stack {
    types: FxHashMap<String, Constructor>,
    pub(crate) inputs: FxHashMap<String, Value>,
    pub(crate) functions: FxHashMap<String, Function>,
    resources: FxHashMap<String, Box<dyn Resource>>,
    in_progress: FxHashSet<String>,
    creation_order: Vec<String>,
    outputs: IndexMap<String, Value>,
    events: Vec<TimestampedEvent>,
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl Stack {
    /// An empty stack with nothing registered.
    pub fn new() -> Self {
        Self {
            types: FxHashMap::default(),
            inputs: FxHashMap::default(),
            functions: FxHashMap::default(),
            resources: FxHashMap::default(),
            in_progress: FxHashSet::default(),
            creation_order: Vec::new(),
            outputs: IndexMap::new(),
            events: Vec::new(),
        }
    }

    /// A stack with the built-in `Local::*` resource types and functions.
    pub fn with_builtins() -> Self {
        let mut stack = Self::new();
        crate::resources::register_builtins(&mut stack);
        crate::functions::register_builtins(&mut stack);
        stack
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    /// Register a resource type under `type_name`.
    pub fn register_type<F>(&mut self, type_name: impl Into<String>, ctor: F)
    where
        F: Fn() -> Box<dyn Resource> + 'static,
    {
        self.types.insert(type_name.into(), Box::new(ctor) as Constructor);
    }

    /// Register a named input, visible to `Ref` ahead of resources.
    pub fn register_input(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.inputs.insert(name.into(), value.into());
    }

    /// Register a function, callable from templates as `Fn::<name>`.
    pub fn register_function<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Value) -> Result<Value> + 'static,
    {
        self.functions.insert(name.into(), Box::new(f) as Function);
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered input names, sorted.
    pub fn input_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inputs.keys().cloned().collect();
        names.sort();
        names
    }

    // ------------------------------------------------------------------
    // Build
    // ------------------------------------------------------------------

    /// Parse a JSON template and build it.
    pub fn build_json(&mut self, json: &str) -> Result<()> {
        let template = super::parser::parse_template_json(json)?;
        self.build(&template)
    }

    /// Parse a YAML template and build it.
    pub fn build_yaml(&mut self, yaml: &str) -> Result<()> {
        let template = super::parser::parse_template_yaml(yaml)?;
        self.build(&template)
    }

    /// Build every declared resource, then evaluate every output.
    ///
    /// The first error aborts the build. Resources created before it stay
    /// tracked and are torn down by [`Stack::destroy`] or on drop.
    pub fn build(&mut self, template: &Template) -> Result<()> {
        self.in_progress.clear();
        self.record(StackEvent::BuildStarted {
            resources: template.resources.len(),
            outputs: template.outputs.len(),
        });

        let result = Resolver {
            stack: self,
            template,
        }
        .run();

        match result {
            Ok(()) => {
                debug!(
                    resources = self.creation_order.len(),
                    outputs = self.outputs.len(),
                    "build complete"
                );
                self.record(StackEvent::BuildCompleted {
                    resources_created: self.creation_order.len(),
                    outputs: self.outputs.len(),
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "build failed");
                self.record(StackEvent::BuildFailed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    /// Typed output lookup. Absent or mismatched outputs yield `None`.
    pub fn output<T: FromValue>(&self, name: &str) -> Option<T> {
        let value = self.outputs.get(name)?.clone();
        T::from_value(value, name).ok()
    }

    /// All evaluated outputs, in template order.
    pub fn outputs(&self) -> &IndexMap<String, Value> {
        &self.outputs
    }

    /// Names of created resources, in creation order.
    pub fn creation_order(&self) -> &[String] {
        &self.creation_order
    }

    pub fn is_created(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Journal of build and teardown events.
    pub fn events(&self) -> &[TimestampedEvent] {
        &self.events
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Destroy every resource, last-created first. Idempotent.
    pub fn destroy(&mut self) {
        while let Some(name) = self.creation_order.pop() {
            if let Some(mut resource) = self.resources.remove(&name) {
                debug!(resource = %name, "destroying resource");
                resource.destroy();
                self.record(StackEvent::ResourceDestroyed { resource: name });
            }
        }
    }

    fn record(&mut self, event: StackEvent) {
        self.events.push(TimestampedEvent::now(event));
    }
}

impl Drop for Stack {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// One build pass: the stack being mutated plus the template driving it.
pub(crate) struct Resolver<'a> {
    pub(crate) stack: &'a mut Stack,
    pub(crate) template: &'a Template,
}

impl Resolver<'_> {
    fn run(&mut self) -> Result<()> {
        let template = self.template;

        for name in template.resources.keys() {
            self.resolve(name)?;
        }

        for (name, expr) in &template.outputs {
            let value = self.evaluate(expr)?;
            self.stack.outputs.insert(name.clone(), value);
            self.stack.record(StackEvent::OutputEvaluated {
                output: name.clone(),
            });
        }
        Ok(())
    }

    /// Resolve `name` to its live instance, creating it (and its
    /// dependencies) on first use.
    pub(crate) fn resolve(&mut self, name: &str) -> Result<&dyn Resource> {
        if self.stack.resources.contains_key(name) {
            return Ok(self.stack.resources[name].as_ref());
        }

        let template = self.template;
        let decl = template.resource(name).ok_or_else(|| {
            StackError::new(
                ErrorKind::UnknownResource,
                format!("unknown resource '{}'", name),
            )
            .with_resource(name)
        })?;

        if self.stack.in_progress.contains(name) {
            return Err(StackError::new(
                ErrorKind::CyclicDependency,
                format!("cyclic dependency: '{}' requires itself", name),
            )
            .with_resource(name));
        }

        self.stack.in_progress.insert(name.to_string());
        let started = Instant::now();

        let (resource_type, resource) = match self.construct(decl) {
            Ok(built) => built,
            Err(e) => {
                let e = e.with_resource(name);
                warn!(resource = name, error = %e, "resource failed");
                self.stack.record(StackEvent::ResourceFailed {
                    resource: name.to_string(),
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        let duration = started.elapsed().as_secs_f64();
        debug!(resource = name, resource_type, duration, "resource created");

        self.stack.in_progress.remove(name);
        self.stack.resources.insert(name.to_string(), resource);
        self.stack.creation_order.push(name.to_string());
        self.stack.record(StackEvent::ResourceCreated {
            resource: name.to_string(),
            resource_type: resource_type.to_string(),
            duration_seconds: duration,
        });

        Ok(self.stack.resources[name].as_ref())
    }

    fn construct<'t>(&mut self, decl: ResourceDecl<'t>) -> Result<(&'t str, Box<dyn Resource>)> {
        let resource_type = decl.type_name()?;

        for dependency in decl.depends_on()? {
            self.resolve(dependency)?;
        }

        let properties = match self.evaluate(&decl.properties())? {
            Value::Dict(d) => d,
            other => {
                return Err(StackError::new(
                    ErrorKind::TypeMismatch,
                    format!("'Properties' must be a dictionary, got {}", other.type_name()),
                ))
            }
        };

        let ctor = self.stack.types.get(resource_type).ok_or_else(|| {
            StackError::new(
                ErrorKind::UnknownType,
                format!("unknown resource type '{}'", resource_type),
            )
        })?;

        let mut resource = ctor();
        resource.set_properties(Properties::new(properties));
        resource.create()?;
        Ok((resource_type, resource))
    }
}
