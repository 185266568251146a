use clap::{Parser, Subcommand};
use kumitate::prelude::*;
use serde::de::DeserializeOwned;
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use tracing::Level;

/// Workflow graph compiler for node-based generation servers
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the server's node type schema (object info) JSON
    #[arg(short, long, global = true)]
    schema: Option<String>,

    /// Log every structural rewrite to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an editor layout document into canonical JSON
    Import {
        /// Path to the layout workflow JSON file
        workflow_path: String,
    },
    /// Inject modifiers, substitute placeholders, apply overrides and resolve bypasses
    Prepare {
        /// Path to the workflow JSON file (layout or canonical)
        workflow_path: String,
        /// JSON object mapping placeholder keys to values
        #[arg(long)]
        values: Option<String>,
        /// JSON object mapping node ids to input overrides
        #[arg(long)]
        overrides: Option<String>,
        /// Modifier to chain after the model source, as `name:strength`
        #[arg(long = "lora", value_parser = parse_modifier)]
        modifiers: Vec<ModifierSelection>,
    },
    /// List candidate inputs for every semantic field of a category
    Fields {
        /// Path to the workflow JSON file (layout or canonical)
        workflow_path: String,
        /// Workflow category: t2i, i2i, t2v or i2v
        #[arg(short, long, default_value = "t2i")]
        category: WorkflowCategory,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let schema = match &cli.schema {
        Some(path) => NodeSchema::from_json(&read_file(path)).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load schema '{}': {}", path, e))
        }),
        None => {
            eprintln!("No schema provided. Widget values of layout documents will not be mapped.");
            NodeSchema::new()
        }
    };
    let compiler = Compiler::new(Arc::new(schema));

    match cli.command {
        Command::Import { workflow_path } => run_import(&compiler, &workflow_path),
        Command::Prepare {
            workflow_path,
            values,
            overrides,
            modifiers,
        } => {
            let request = SubmissionRequest {
                values: values.map(|p| read_json(&p)).unwrap_or_default(),
                overrides: overrides.map(|p| read_json(&p)).unwrap_or_default(),
                modifiers,
                ..SubmissionRequest::default()
            };
            run_prepare(&compiler, &workflow_path, &request);
        }
        Command::Fields {
            workflow_path,
            category,
        } => run_fields(&compiler, &workflow_path, category),
    }
}

fn run_import(compiler: &Compiler, workflow_path: &str) {
    let start = Instant::now();
    let compiled = compiler
        .import_layout(&read_file(workflow_path))
        .unwrap_or_else(|e| exit_with_error(&format!("Import failed: {}", e)));
    print_compiled(&compiled);
    eprintln!("Imported in {:?}", start.elapsed());
}

fn run_prepare(compiler: &Compiler, workflow_path: &str, request: &SubmissionRequest) {
    let start = Instant::now();
    let compiled = compiler
        .prepare(&read_file(workflow_path), request)
        .unwrap_or_else(|e| exit_with_error(&format!("Preparation failed: {}", e)));
    print_compiled(&compiled);
    eprintln!("Prepared in {:?}", start.elapsed());
}

fn run_fields(compiler: &Compiler, workflow_path: &str, category: WorkflowCategory) {
    let mapping = compiler
        .analyze_fields(&read_file(workflow_path), category)
        .unwrap_or_else(|e| exit_with_error(&format!("Field analysis failed: {}", e)));

    println!("--- Fields ({:?}) ---", category);
    for (key, slot) in &mapping.fields {
        let marker = if slot.required { "*" } else { " " };
        if slot.candidates.is_empty() {
            println!("{} {:<16} (no candidates)", marker, key);
            continue;
        }
        for (index, candidate) in slot.candidates.iter().enumerate() {
            let selected = if slot.selected == Some(index) { "->" } else { "  " };
            println!(
                "{} {:<16} {} node {} [{}] {}.{} = {}",
                marker,
                key,
                selected,
                candidate.node_id,
                candidate.class_type,
                candidate.node_title,
                candidate.input_key,
                candidate.current_value
            );
        }
    }

    let missing = mapping.missing_required();
    if !missing.is_empty() {
        eprintln!("\nMissing required fields: {:?}", missing);
    }
}

fn print_compiled(compiled: &Compiled) {
    println!("{}", compiled.content);
    for warning in &compiled.warnings {
        eprintln!("Warning: {}", warning);
    }
}

fn parse_modifier(raw: &str) -> std::result::Result<ModifierSelection, String> {
    let (name, strength) = match raw.rsplit_once(':') {
        Some((name, strength)) => (
            name,
            strength
                .parse::<f64>()
                .map_err(|e| format!("invalid strength '{}': {}", strength, e))?,
        ),
        None => (raw, 1.0),
    };
    Ok(ModifierSelection::new(name, strength))
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read file '{}': {}", path, e)))
}

fn read_json<T: DeserializeOwned>(path: &str) -> T {
    serde_json::from_str(&read_file(path))
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse '{}': {}", path, e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
