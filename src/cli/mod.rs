//! ST-015: CLI subcommands — init, validate, plan, build.

use crate::core::{eventlog, graph, parser, stack::Stack, template::Template};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter template
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Check a template against the built-in types and functions
    Validate {
        #[command(flatten)]
        source: TemplateArgs,
    },

    /// Show the order resources would be created in
    Plan {
        #[command(flatten)]
        source: TemplateArgs,
    },

    /// Build the stack and print its outputs as JSON
    Build {
        #[command(flatten)]
        source: TemplateArgs,

        /// Append build events to this JSONL file
        #[arg(long)]
        events: Option<PathBuf>,
    },
}

/// Template location and input values shared by every subcommand.
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Path to the template (JSON, or YAML by extension)
    #[arg(short, long, default_value = "stack.yaml")]
    pub file: PathBuf,

    /// Inputs file (JSON, YAML or TOML)
    #[arg(short, long)]
    pub inputs: Option<PathBuf>,

    /// Extra input as name=value (value parsed as JSON when possible)
    #[arg(long = "input", value_name = "NAME=VALUE")]
    pub input: Vec<String>,
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { source } => cmd_validate(&source),
        Commands::Plan { source } => cmd_plan(&source),
        Commands::Build { source, events } => cmd_build(&source, events.as_deref()),
    }
}

const STARTER_TEMPLATE: &str = r#"# Stack template
Resources:
  Greeting:
    Type: Local::Value
    Properties:
      Value:
        Fn::Join: [" ", ["hello", { Ref: Name }]]

Outputs:
  greeting:
    Ref: Greeting
  fingerprint:
    Fn::Hash: { Ref: Greeting }
"#;

fn cmd_init(path: &Path) -> Result<(), String> {
    let template_path = path.join("stack.yaml");
    if template_path.exists() {
        return Err(format!("{} already exists", template_path.display()));
    }
    std::fs::create_dir_all(path).map_err(|e| format!("cannot create {}: {}", path.display(), e))?;
    std::fs::write(&template_path, STARTER_TEMPLATE)
        .map_err(|e| format!("cannot write {}: {}", template_path.display(), e))?;

    println!("Created {}", template_path.display());
    println!("  Try: stackform build -f {} --input Name=world", template_path.display());
    Ok(())
}

/// Load the template and a stack with built-ins plus the given inputs.
fn load(source: &TemplateArgs) -> Result<(Template, Stack), String> {
    let template = parser::parse_template_file(&source.file).map_err(|e| e.to_string())?;
    let mut stack = Stack::with_builtins();

    if let Some(ref path) = source.inputs {
        let inputs = parser::parse_inputs_file(path).map_err(|e| e.to_string())?;
        for (name, value) in inputs {
            stack.register_input(name, value);
        }
    }
    for assignment in &source.input {
        let (name, value) = parser::parse_input_assignment(assignment).map_err(|e| e.to_string())?;
        stack.register_input(name, value);
    }
    Ok((template, stack))
}

fn cmd_validate(source: &TemplateArgs) -> Result<(), String> {
    let (template, stack) = load(source)?;
    let errors = parser::validate_template(&template, &stack);

    if errors.is_empty() {
        println!(
            "OK: {} ({} resources, {} outputs)",
            source.file.display(),
            template.resources.len(),
            template.outputs.len()
        );
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(format!("{} validation error(s)", errors.len()))
    }
}

fn cmd_plan(source: &TemplateArgs) -> Result<(), String> {
    let (template, stack) = load(source)?;
    let inputs = stack.input_names();
    let is_input = |name: &str| inputs.iter().any(|i| i == name);
    let order = graph::creation_order(&template, &is_input).map_err(|e| e.to_string())?;

    println!("Planning: {} ({} resources)", source.file.display(), order.len());
    println!();
    for (i, name) in order.iter().enumerate() {
        let resource_type = template
            .resource(name)
            .and_then(|decl| decl.type_name().ok())
            .unwrap_or("?");
        println!("  {:>3}. + {} [{}]", i + 1, name, resource_type);
    }
    println!();
    println!("Plan: {} to create.", order.len());
    Ok(())
}

fn cmd_build(source: &TemplateArgs, events: Option<&Path>) -> Result<(), String> {
    let (template, mut stack) = load(source)?;
    let result = stack.build(&template);
    stack.destroy();

    if let Some(path) = events {
        eventlog::append_events(path, stack.events())?;
    }
    result.map_err(|e| e.to_string())?;

    let json = serde_json::to_string_pretty(stack.outputs())
        .map_err(|e| format!("JSON serialize error: {}", e))?;
    println!("{}", json);
    Ok(())
}
