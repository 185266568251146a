//! Insertion of model-modifier chains between a model source and its consumers.
//!
//! Both entry points are optional enrichment: when the graph lacks the structure they
//! need they return `false` and leave the workflow untouched.

use crate::compiler::CompilerOptions;
use crate::graph::{Consumer, InputValue, Node, Workflow};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

mod convention;

pub use convention::*;

/// One modifier (e.g. a LoRA) the caller wants applied to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierSelection {
    pub name: String,
    pub strength: f64,
}

impl ModifierSelection {
    pub fn new(name: &str, strength: f64) -> Self {
        Self {
            name: name.to_string(),
            strength,
        }
    }
}

pub struct ChainInjector<'a> {
    options: &'a CompilerOptions,
}

impl<'a> ChainInjector<'a> {
    pub fn new(options: &'a CompilerOptions) -> Self {
        Self { options }
    }

    /// Builds a modifier node whose model input is output `source_output` of `source_id`.
    /// The modified model is always its output 0.
    pub fn create_modifier_node(
        &self,
        id: &str,
        selection: &ModifierSelection,
        source_id: &str,
        source_output: usize,
    ) -> Node {
        let options = self.options;
        Node::new(id, options.modifier_type.as_str())
            .with_title(&format!("Modifier: {}", selection.name))
            .with_literal(&options.modifier_name_input, selection.name.as_str())
            .with_literal(&options.modifier_strength_input, selection.strength)
            .with_connection(&options.modifier_model_input, source_id, source_output)
            .with_output("MODEL", "MODEL")
    }

    /// Inserts `chain` after the graph's model source and points every consumer of the
    /// source's primary output at the last inserted node.
    pub fn inject(&self, workflow: &mut Workflow, chain: &[ModifierSelection]) -> bool {
        if chain.is_empty() {
            return false;
        }
        let Some(source_id) = self.find_model_source(workflow) else {
            tracing::debug!("no model source node, skipping chain injection");
            return false;
        };
        let consumers: Vec<Consumer> = workflow
            .consumers(&source_id)
            .into_iter()
            .filter(|c| c.output_index == 0)
            .collect();
        if consumers.is_empty() {
            tracing::debug!(source = %source_id, "model source has no consumers, skipping chain injection");
            return false;
        }

        let last = self.append_chain(workflow, chain, &source_id, 0);
        for consumer in consumers {
            if let Some(node) = workflow.node_mut(&consumer.node_id) {
                node.inputs
                    .insert(consumer.input, InputValue::connection(last.as_str(), 0));
            }
        }
        true
    }

    /// Appends `chain` after the existing mandatory modifier on the given sampler path
    /// of a dual-path graph. Whatever consumed the modifier (the model-sampling node or
    /// a patch node between the two) is rewired to the new tail.
    pub fn extend(&self, workflow: &mut Workflow, path: NoisePath, chain: &[ModifierSelection]) -> bool {
        if chain.is_empty() {
            return false;
        }
        let Some(anchor) = self.find_sampling_node(workflow, path) else {
            tracing::debug!(?path, "no model-sampling pattern for path, skipping chain extension");
            return false;
        };

        let last = self.append_chain(workflow, chain, &anchor.modifier_id, anchor.modifier_output);
        let model_input = self.options.modifier_model_input.clone();
        if let Some(node) = workflow.node_mut(&anchor.consumer_id) {
            node.inputs
                .insert(model_input, InputValue::connection(last.as_str(), 0));
        }
        true
    }

    /// Creates one modifier node per entry, each fed by the previous one, and returns
    /// the id of the last.
    fn append_chain(
        &self,
        workflow: &mut Workflow,
        chain: &[ModifierSelection],
        source_id: &str,
        source_output: usize,
    ) -> String {
        let mut next_id = workflow
            .max_numeric_id()
            .unwrap_or(0)
            .max(self.options.injected_id_floor)
            + 1;
        let mut previous = (source_id.to_string(), source_output);

        for selection in chain {
            let id = next_id.to_string();
            next_id += 1;
            let node = self.create_modifier_node(&id, selection, &previous.0, previous.1);
            tracing::debug!(node = %id, modifier = %selection.name, source = %previous.0, "inserted modifier node");
            workflow.insert(node);
            previous = (id, 0);
        }
        previous.0
    }

    fn find_model_source(&self, workflow: &Workflow) -> Option<String> {
        self.options
            .model_source_types
            .iter()
            .find_map(|class_type| workflow.find_by_class(class_type))
            .map(|n| n.id.clone())
    }

    /// Finds the model-sampling node on `path` whose model input traces back to a
    /// modifier.
    fn find_sampling_node(&self, workflow: &Workflow, path: NoisePath) -> Option<ChainAnchor> {
        let convention = self.options.noise_path_convention.as_ref();
        workflow
            .nodes
            .values()
            .filter(|n| self.options.is_model_sampling(&n.class_type))
            .filter(|sampling| {
                workflow
                    .consumers(&sampling.id)
                    .iter()
                    .filter_map(|c| workflow.node(&c.node_id))
                    .any(|sampler| convention.classify(sampler) == Some(path))
            })
            .find_map(|sampling| self.trace_modifier(workflow, &sampling.id))
    }

    /// Follows model connections upstream from `sampling_id` until a modifier node is
    /// reached. Gives up on cycles, missing nodes and after `max_trace_depth` hops.
    fn trace_modifier(&self, workflow: &Workflow, sampling_id: &str) -> Option<ChainAnchor> {
        let model_input = self.options.modifier_model_input.as_str();
        let mut visited: AHashSet<&str> = AHashSet::new();
        let mut consumer = workflow.node(sampling_id)?;

        for _ in 0..self.options.max_trace_depth {
            if !visited.insert(consumer.id.as_str()) {
                tracing::debug!(node = %consumer.id, "model chain cycle, skipping");
                return None;
            }
            let (upstream, output) = consumer.connection(model_input)?;
            let feeder = workflow.node(upstream)?;
            if feeder.class_type == self.options.modifier_type {
                return Some(ChainAnchor {
                    consumer_id: consumer.id.clone(),
                    modifier_id: feeder.id.clone(),
                    modifier_output: output,
                });
            }
            consumer = feeder;
        }
        None
    }
}

/// Where an extension chain is spliced in: after `modifier_id`, feeding `consumer_id`.
struct ChainAnchor {
    consumer_id: String,
    modifier_id: String,
    modifier_output: usize,
}
