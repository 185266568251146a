use crate::bypass::BypassResolver;
use crate::error::{CompileError, ResolutionWarning};
use crate::graph::Workflow;
use crate::inject::{ChainInjector, ModifierSelection, NoisePath, NoisePathConvention};
use crate::layout::{LayoutDocument, LayoutImporter, is_layout_value};
use crate::mapping::{FieldMapping, FieldMappingAnalyzer, WorkflowCategory};
use crate::schema::NodeSchema;
use crate::substitute::{AttributeOverrides, apply_overrides, substitute_placeholders};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

mod options;

pub use options::CompilerOptions;

/// Input shape of a workflow document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowFormat {
    Layout,
    Canonical,
}

impl WorkflowFormat {
    pub fn detect(value: &Value) -> Option<Self> {
        if is_layout_value(value) {
            Some(WorkflowFormat::Layout)
        } else if Workflow::is_canonical_value(value) {
            Some(WorkflowFormat::Canonical)
        } else {
            None
        }
    }
}

/// A workflow parsed from either format, with the warnings raised along the way.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub format: WorkflowFormat,
    pub workflow: Workflow,
    pub warnings: Vec<ResolutionWarning>,
}

/// Canonical JSON text handed back to the caller, with accumulated warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub content: String,
    pub warnings: Vec<String>,
}

/// Everything the caller wants applied to a workflow before it is submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmissionRequest {
    /// Placeholder key -> value.
    pub values: IndexMap<String, Value>,
    pub overrides: AttributeOverrides,
    /// Modifier chain inserted after the model source.
    pub modifiers: Vec<ModifierSelection>,
    /// Chains appended to the high-/low-noise paths of dual-path graphs.
    pub high_noise_modifiers: Vec<ModifierSelection>,
    pub low_noise_modifiers: Vec<ModifierSelection>,
}

/// The workflow graph compiler.
///
/// Holds an immutable schema snapshot and its options; every method is a pure
/// function of its arguments, so one compiler can serve concurrent calls.
pub struct Compiler {
    schema: Arc<NodeSchema>,
    options: CompilerOptions,
}

pub struct CompilerBuilder {
    schema: Arc<NodeSchema>,
    options: CompilerOptions,
}

impl CompilerBuilder {
    pub fn new(schema: Arc<NodeSchema>) -> Self {
        Self {
            schema,
            options: CompilerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    /// Treats `class_type` as an additional pass-through reroute node.
    pub fn with_reroute_type(mut self, class_type: &str) -> Self {
        self.options.reroute_types.push(class_type.to_string());
        self
    }

    pub fn with_note_type(mut self, class_type: &str) -> Self {
        self.options.note_types.push(class_type.to_string());
        self
    }

    pub fn with_seed_alias(mut self, input: &str) -> Self {
        self.options.seed_aliases.push(input.to_string());
        self
    }

    /// Replaces the model source priority list.
    pub fn with_model_source_types(mut self, class_types: &[&str]) -> Self {
        self.options.model_source_types = options::strings(class_types);
        self
    }

    /// Uses a different modifier class and its input names for injected chains.
    pub fn with_modifier_type(
        mut self,
        class_type: &str,
        name_input: &str,
        strength_input: &str,
        model_input: &str,
    ) -> Self {
        self.options.modifier_type = class_type.to_string();
        self.options.modifier_name_input = name_input.to_string();
        self.options.modifier_strength_input = strength_input.to_string();
        self.options.modifier_model_input = model_input.to_string();
        self
    }

    pub fn with_noise_path_convention(mut self, convention: Arc<dyn NoisePathConvention>) -> Self {
        self.options.noise_path_convention = convention;
        self
    }

    pub fn with_max_bypass_depth(mut self, depth: usize) -> Self {
        self.options.max_bypass_depth = depth;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            schema: self.schema,
            options: self.options,
        }
    }
}

impl Compiler {
    pub fn builder(schema: Arc<NodeSchema>) -> CompilerBuilder {
        CompilerBuilder::new(schema)
    }

    /// A compiler with default options.
    pub fn new(schema: Arc<NodeSchema>) -> Self {
        CompilerBuilder::new(schema).build()
    }

    pub fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Parses a workflow in either format into the canonical model.
    pub fn parse(&self, text: &str) -> Result<Parsed, CompileError> {
        let value: Value = serde_json::from_str(text).map_err(|e| CompileError::parse(e, text))?;
        match WorkflowFormat::detect(&value) {
            Some(WorkflowFormat::Layout) => {
                let document: LayoutDocument =
                    serde_json::from_value(value).map_err(|e| CompileError::parse(e, text))?;
                let imported = LayoutImporter::new(&self.schema, &self.options).import(&document);
                Ok(Parsed {
                    format: WorkflowFormat::Layout,
                    workflow: imported.workflow,
                    warnings: imported.warnings,
                })
            }
            Some(WorkflowFormat::Canonical) => Ok(Parsed {
                format: WorkflowFormat::Canonical,
                workflow: Workflow::from_canonical_value(&value)?,
                warnings: Vec::new(),
            }),
            None => Err(CompileError::UnrecognizedFormat {
                original: text.to_string(),
            }),
        }
    }

    /// Converts a layout document to pretty-printed canonical JSON.
    pub fn import_layout(&self, text: &str) -> Result<Compiled, CompileError> {
        let value: Value = serde_json::from_str(text).map_err(|e| CompileError::parse(e, text))?;
        if !is_layout_value(&value) {
            return Err(CompileError::UnrecognizedFormat {
                original: text.to_string(),
            });
        }
        let document: LayoutDocument =
            serde_json::from_value(value).map_err(|e| CompileError::parse(e, text))?;
        let imported = LayoutImporter::new(&self.schema, &self.options).import(&document);
        Ok(Compiled {
            content: imported.workflow.to_canonical_json()?,
            warnings: render_warnings(&imported.warnings),
        })
    }

    /// Finds the candidate inputs for every field of `category`.
    pub fn analyze_fields(
        &self,
        text: &str,
        category: WorkflowCategory,
    ) -> Result<FieldMapping, CompileError> {
        let parsed = self.parse(text)?;
        Ok(self.analyze_workflow(&parsed.workflow, category))
    }

    pub fn analyze_workflow(&self, workflow: &Workflow, category: WorkflowCategory) -> FieldMapping {
        FieldMappingAnalyzer::new(&self.schema, self.options.max_trace_depth).analyze(workflow, category)
    }

    /// Injects a fresh modifier chain after the model source. No-op when the graph
    /// has no model source or nothing consumes it.
    pub fn inject_chain(&self, workflow: &mut Workflow, chain: &[ModifierSelection]) -> bool {
        ChainInjector::new(&self.options).inject(workflow, chain)
    }

    /// Extends the mandatory modifier chain on one path of a dual-path graph.
    pub fn extend_chain(
        &self,
        workflow: &mut Workflow,
        path: NoisePath,
        chain: &[ModifierSelection],
    ) -> bool {
        ChainInjector::new(&self.options).extend(workflow, path, chain)
    }

    pub fn resolve_bypass(&self, workflow: &mut Workflow) -> Vec<ResolutionWarning> {
        BypassResolver::new(self.options.max_bypass_depth).resolve(workflow)
    }

    /// Runs the submission pipeline: chain injection, placeholder substitution,
    /// attribute overrides and finally bypass resolution.
    pub fn prepare(&self, text: &str, request: &SubmissionRequest) -> Result<Compiled, CompileError> {
        let Parsed {
            mut workflow,
            mut warnings,
            ..
        } = self.parse(text)?;

        self.inject_chain(&mut workflow, &request.modifiers);
        self.extend_chain(&mut workflow, NoisePath::High, &request.high_noise_modifiers);
        self.extend_chain(&mut workflow, NoisePath::Low, &request.low_noise_modifiers);

        let substituted = substitute_placeholders(&mut workflow, &request.values);
        let overridden = apply_overrides(&mut workflow, &request.overrides);
        warnings.extend(self.resolve_bypass(&mut workflow));

        tracing::debug!(
            nodes = workflow.len(),
            substituted,
            overridden,
            warnings = warnings.len(),
            "prepared workflow for submission"
        );
        Ok(Compiled {
            content: workflow.to_canonical_json()?,
            warnings: render_warnings(&warnings),
        })
    }
}

fn render_warnings(warnings: &[ResolutionWarning]) -> Vec<String> {
    warnings.iter().map(ToString::to_string).collect()
}
