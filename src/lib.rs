//! # Kumitate - Workflow Graph Compiler
//!
//! **Kumitate** prepares node-graph workflows for submission to a generation server.
//! It ingests a workflow as authored by a visual graph editor (the *layout* format) or
//! as the server's own id-keyed node map (the *canonical* format), converts it into a
//! single canonical model, and runs a set of rewriting passes over it.
//!
//! ## Core Workflow
//!
//! 1.  **Load the schema**: Parse the server's node type schema into a `NodeSchema`
//!     and keep it in a `SchemaCache`, which swaps snapshots wholesale when the
//!     server schema changes.
//! 2.  **Build a compiler**: `Compiler::builder(schema)` accepts overrides for every
//!     class-type name and limit the passes rely on.
//! 3.  **Import or analyze**: `import_layout` turns an editor document into canonical
//!     JSON; `analyze_fields` finds which node inputs realize semantic fields such as
//!     the positive prompt or the image size.
//! 4.  **Prepare**: `prepare` injects modifier chains, substitutes `{{field}}`
//!     placeholders, applies per-node overrides and finally removes bypassed nodes,
//!     rewiring their consumers to the right upstream producers.
//!
//! Only malformed input text is fatal. Everything else degrades gracefully and is
//! reported as a warning next to the result.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kumitate::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let schema = NodeSchema::from_json(&std::fs::read_to_string("object_info.json")?)?;
//!     let compiler = Compiler::builder(Arc::new(schema)).build();
//!
//!     // Editor document -> canonical JSON
//!     let layout = std::fs::read_to_string("workflow.json")?;
//!     let imported = compiler.import_layout(&layout)?;
//!     for warning in &imported.warnings {
//!         eprintln!("warning: {}", warning);
//!     }
//!
//!     // Which inputs hold the prompt?
//!     let mapping = compiler.analyze_fields(&imported.content, WorkflowCategory::TextToImage)?;
//!     if let Some(prompt) = mapping.selected(FieldKey::PositivePrompt) {
//!         println!("prompt lives on node {} ({})", prompt.node_id, prompt.input_key);
//!     }
//!
//!     // Fill in and submit
//!     let mut request = SubmissionRequest::default();
//!     request.modifiers.push(ModifierSelection::new("detail.safetensors", 0.8));
//!     let compiled = compiler.prepare(&imported.content, &request)?;
//!     println!("{}", compiled.content);
//!     Ok(())
//! }
//! ```

pub mod bypass;
pub mod compat;
pub mod compiler;
pub mod error;
pub mod graph;
pub mod inject;
pub mod layout;
pub mod mapping;
pub mod prelude;
pub mod schema;
pub mod substitute;
