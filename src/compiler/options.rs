use crate::inject::{NoisePathConvention, StartStepConvention};
use std::sync::Arc;

/// Tunable class-type names and limits used across the compiler passes.
///
/// The defaults follow the stock node set of the generation server; custom node packs
/// are supported by overriding the relevant names through [`super::CompilerBuilder`].
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Pass-through nodes that carry no structure of their own.
    pub reroute_types: Vec<String>,
    /// Free-text nodes extracted into the notes list.
    pub note_types: Vec<String>,
    /// Seed inputs that the frontend follows with a regenerate-mode widget.
    pub seed_aliases: Vec<String>,
    /// Values the regenerate-mode widget can hold.
    pub control_tokens: Vec<String>,
    /// Schema input name of the regenerate-mode widget, never mapped to a value.
    pub control_widget_name: String,
    /// Model source class types, highest priority first.
    pub model_source_types: Vec<String>,
    /// Class type of injected modifier nodes.
    pub modifier_type: String,
    pub modifier_name_input: String,
    pub modifier_strength_input: String,
    pub modifier_model_input: String,
    /// Prefix identifying model-sampling nodes on dual-path graphs.
    pub model_sampling_prefix: String,
    /// Decides which sampler path (high or low noise) a model-sampling node feeds.
    pub noise_path_convention: Arc<dyn NoisePathConvention>,
    /// Hop limit when following chains of bypassed nodes.
    pub max_bypass_depth: usize,
    /// Hop limit when tracing conditioning edges away from a prompt encoder, and when
    /// tracing a model-sampling node's model input back to its modifier.
    pub max_trace_depth: usize,
    /// Lowest numeric id considered when allocating ids for injected nodes.
    pub injected_id_floor: u64,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            reroute_types: strings(&["Reroute"]),
            note_types: strings(&["Note", "MarkdownNote"]),
            seed_aliases: strings(&["seed", "noise_seed"]),
            control_tokens: strings(&["fixed", "increment", "decrement", "randomize"]),
            control_widget_name: "control_after_generate".to_string(),
            model_source_types: strings(&["CheckpointLoaderSimple", "UNETLoader"]),
            modifier_type: "LoraLoaderModelOnly".to_string(),
            modifier_name_input: "lora_name".to_string(),
            modifier_strength_input: "strength_model".to_string(),
            modifier_model_input: "model".to_string(),
            model_sampling_prefix: "ModelSampling".to_string(),
            noise_path_convention: Arc::new(StartStepConvention::default()),
            max_bypass_depth: 10,
            max_trace_depth: 8,
            injected_id_floor: 100,
        }
    }
}

impl CompilerOptions {
    pub fn is_reroute(&self, class_type: &str) -> bool {
        self.reroute_types.iter().any(|t| t == class_type)
    }

    pub fn is_note(&self, class_type: &str) -> bool {
        self.note_types.iter().any(|t| t == class_type)
    }

    pub fn is_seed(&self, input: &str) -> bool {
        self.seed_aliases.iter().any(|s| s == input)
    }

    pub fn is_control_token(&self, token: &str) -> bool {
        self.control_tokens.iter().any(|t| t == token)
    }

    pub fn is_model_sampling(&self, class_type: &str) -> bool {
        class_type.starts_with(&self.model_sampling_prefix)
    }
}

pub(crate) fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
