//! Discovery of which node inputs realize the semantic fields of a workflow category.

use crate::bypass::infer_type_from_name;
use crate::graph::{Node, Workflow};
use crate::schema::NodeSchema;
use ahash::AHashSet;
use indexmap::IndexMap;
use itertools::Itertools;
use std::collections::VecDeque;

mod candidate;
mod field;

pub use candidate::*;
pub use field::*;

const CONDITIONING: &str = "CONDITIONING";
const IMAGE: &str = "IMAGE";

/// Which prompt fields an encoder feeds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Polarity {
    positive: bool,
    negative: bool,
}

impl Polarity {
    fn is_known(self) -> bool {
        self.positive || self.negative
    }

    fn from_title(title: &str) -> Self {
        let title = title.to_ascii_lowercase();
        Self {
            positive: title.contains("positive"),
            negative: title.contains("negative"),
        }
    }
}

pub struct FieldMappingAnalyzer<'a> {
    schema: &'a NodeSchema,
    max_trace_depth: usize,
}

impl<'a> FieldMappingAnalyzer<'a> {
    pub fn new(schema: &'a NodeSchema, max_trace_depth: usize) -> Self {
        Self {
            schema,
            max_trace_depth,
        }
    }

    pub fn analyze(&self, workflow: &Workflow, category: WorkflowCategory) -> FieldMapping {
        let mut optional = category.optional_fields().to_vec();
        if has_single_conditioning_guider(workflow) {
            optional.retain(|k| !matches!(k, FieldKey::Cfg | FieldKey::NegativePrompt));
        }

        let (positive, negative) = self.prompt_candidates(workflow);

        let fields: IndexMap<FieldKey, FieldSlot> = category
            .required_fields()
            .iter()
            .map(|k| (*k, true))
            .chain(optional.into_iter().map(|k| (k, false)))
            .map(|(key, required)| {
                let candidates = match key {
                    FieldKey::PositivePrompt => positive.clone(),
                    FieldKey::NegativePrompt => negative.clone(),
                    other => self.direct_candidates(workflow, other),
                };
                (key, FieldSlot::new(required, candidates))
            })
            .collect();

        tracing::debug!(
            ?category,
            fields = fields.len(),
            found = fields.values().filter(|s| !s.candidates.is_empty()).count(),
            "analyzed field mapping"
        );
        FieldMapping { category, fields }
    }

    /// Name-matched literal inputs, with the custom-loader fallback for image fields.
    fn direct_candidates(&self, workflow: &Workflow, key: FieldKey) -> Vec<FieldCandidate> {
        let found = workflow
            .nodes
            .values()
            .flat_map(|node| {
                key.aliases()
                    .iter()
                    .filter(move |alias| node.literal(alias).is_some())
                    .map(move |alias| candidate(node, alias))
            })
            .collect_vec();
        if !found.is_empty() || key != FieldKey::Image {
            return found;
        }

        workflow
            .nodes
            .values()
            .filter(|node| node.produces(IMAGE, self.schema))
            .filter_map(|node| {
                self.schema
                    .inputs(&node.class_type)?
                    .iter()
                    .find(|d| d.is_enumerated() && node.literal(&d.name).is_some())
                    .map(|d| candidate(node, &d.name))
            })
            .collect()
    }

    /// Prompt encoders split by the polarity of the conditioning they feed.
    fn prompt_candidates(&self, workflow: &Workflow) -> (Vec<FieldCandidate>, Vec<FieldCandidate>) {
        let mut positive = Vec::new();
        let mut negative = Vec::new();

        for (node, input) in self.prompt_encoders(workflow) {
            let mut polarity = self.trace_polarity(workflow, &node.id);
            if !polarity.is_known() {
                polarity = Polarity::from_title(node.display_title());
            }
            if !polarity.is_known() {
                polarity = Polarity {
                    positive: true,
                    negative: true,
                };
            }
            let found = candidate(node, &input);
            if polarity.positive {
                positive.push(found.clone());
            }
            if polarity.negative {
                negative.push(found);
            }
        }
        (positive, negative)
    }

    /// Nodes carrying prompt text, by input name first, then by schema shape so that
    /// renamed or localized encoder inputs are still found.
    fn prompt_encoders<'w>(&self, workflow: &'w Workflow) -> Vec<(&'w Node, String)> {
        let by_name = workflow
            .nodes
            .values()
            .filter_map(|node| {
                PROMPT_ALIASES
                    .iter()
                    .find(|alias| node.literal(alias).is_some())
                    .map(|alias| (node, alias.to_string()))
            })
            .collect_vec();
        if !by_name.is_empty() {
            return by_name;
        }

        workflow
            .nodes
            .values()
            .filter(|node| node.produces(CONDITIONING, self.schema))
            .filter_map(|node| {
                self.schema
                    .inputs(&node.class_type)?
                    .iter()
                    .find(|d| d.is_string() && node.literal(&d.name).is_some())
                    .map(|d| (node, d.name.clone()))
            })
            .collect()
    }

    /// Follows conditioning edges downstream of an encoder until they land on a
    /// `positive`, `negative` or `conditioning` input.
    fn trace_polarity(&self, workflow: &Workflow, encoder_id: &str) -> Polarity {
        let mut polarity = Polarity::default();
        let mut visited: AHashSet<String> = AHashSet::new();
        visited.insert(encoder_id.to_string());
        let mut queue = VecDeque::from([(encoder_id.to_string(), 0usize)]);

        while let Some((current, depth)) = queue.pop_front() {
            for consumer in workflow.consumers(&current) {
                match consumer.input.to_ascii_lowercase().as_str() {
                    "positive" | "conditioning" => polarity.positive = true,
                    "negative" => polarity.negative = true,
                    other => {
                        if depth + 1 >= self.max_trace_depth {
                            continue;
                        }
                        let Some(next) = workflow.node(&consumer.node_id) else {
                            continue;
                        };
                        let relays = next.produces(CONDITIONING, self.schema)
                            || (next.resolved_outputs(self.schema).is_empty()
                                && infer_type_from_name(other) == Some(CONDITIONING));
                        if relays && visited.insert(next.id.clone()) {
                            queue.push_back((next.id.clone(), depth + 1));
                        }
                    }
                }
            }
        }
        polarity
    }
}

fn candidate(node: &Node, input: &str) -> FieldCandidate {
    FieldCandidate {
        node_id: node.id.clone(),
        node_title: node.display_title().to_string(),
        class_type: node.class_type.clone(),
        input_key: input.to_string(),
        current_value: node.literal(input).cloned().unwrap_or_default(),
    }
}

/// A guider fed by a single `conditioning` input takes no separate negative prompt or CFG.
fn has_single_conditioning_guider(workflow: &Workflow) -> bool {
    workflow.nodes.values().any(|n| {
        n.class_type.ends_with("Guider")
            && n.inputs.contains_key("conditioning")
            && !n.inputs.contains_key("negative")
    })
}
