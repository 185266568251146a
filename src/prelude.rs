//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the kumitate
//! crate, so callers can get going without importing each item individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use kumitate::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let cache = SchemaCache::new(NodeSchema::from_json(&std::fs::read_to_string("object_info.json")?)?);
//! let compiler = Compiler::new(cache.snapshot());
//!
//! let workflow = std::fs::read_to_string("workflow_api.json")?;
//! let compiled = compiler.prepare(&workflow, &SubmissionRequest::default())?;
//! println!("{}", compiled.content);
//! # Ok(())
//! # }
//! ```

// Compiler entry points
pub use crate::compiler::{
    Compiled, Compiler, CompilerBuilder, CompilerOptions, Parsed, SubmissionRequest,
    WorkflowFormat,
};

// Canonical model
pub use crate::graph::{Consumer, Group, InputValue, Node, NodeMode, NodeOutput, Note, Workflow};

// Schema
pub use crate::schema::{ClassSchema, InputDefinition, NodeSchema, SchemaCache};

// Passes
pub use crate::bypass::{BypassResolver, infer_type_from_name};
pub use crate::compat::is_compatible;
pub use crate::inject::{
    ChainInjector, ModifierSelection, NoisePath, NoisePathConvention, StartStepConvention,
};
pub use crate::layout::{LayoutDocument, LayoutImporter};
pub use crate::mapping::{
    FieldCandidate, FieldKey, FieldMapping, FieldMappingAnalyzer, FieldSlot, WorkflowCategory,
};
pub use crate::substitute::{AttributeOverrides, apply_overrides, substitute_placeholders};

// Error types
pub use crate::error::{CompileError, ResolutionWarning};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
