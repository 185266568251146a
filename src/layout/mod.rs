//! Conversion from the editor's layout format into the canonical [`Workflow`].

use crate::compiler::CompilerOptions;
use crate::error::ResolutionWarning;
use crate::graph::{Group, InputValue, Node, NodeMode, NodeOutput, Note, Workflow};
use crate::schema::NodeSchema;
use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use serde_json::Value;

pub mod edge;
pub mod raw;

pub use edge::Edge;
pub use raw::*;

/// The result of importing a layout document.
#[derive(Debug, Clone)]
pub struct Imported {
    pub workflow: Workflow,
    pub warnings: Vec<ResolutionWarning>,
}

/// Converts layout documents using a schema snapshot to name widget values.
pub struct LayoutImporter<'a> {
    schema: &'a NodeSchema,
    options: &'a CompilerOptions,
}

impl<'a> LayoutImporter<'a> {
    pub fn new(schema: &'a NodeSchema, options: &'a CompilerOptions) -> Self {
        Self { schema, options }
    }

    pub fn import(&self, document: &LayoutDocument) -> Imported {
        let links: AHashMap<i64, Edge> = document
            .links
            .iter()
            .filter_map(Edge::from_value)
            .map(|edge| (edge.link_id, edge))
            .collect();
        let by_id: AHashMap<&str, &LayoutNode> =
            document.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut workflow = Workflow::new();
        let mut warnings = Vec::new();
        let mut anchors: Vec<(String, [f64; 2])> = Vec::new();

        for layout_node in &document.nodes {
            if self.options.is_reroute(&layout_node.class_type) {
                continue;
            }
            if self.options.is_note(&layout_node.class_type) {
                workflow.notes.push(self.extract_note(layout_node));
                continue;
            }

            let mut inputs = IndexMap::new();
            self.map_widgets(layout_node, &mut inputs, &mut warnings);
            self.map_connections(layout_node, &links, &by_id, &mut inputs);

            let node = Node {
                id: layout_node.id.clone(),
                class_type: layout_node.class_type.clone(),
                title: layout_node.title.clone(),
                mode: NodeMode::from_code(layout_node.mode),
                inputs,
                outputs: layout_node
                    .outputs
                    .iter()
                    .map(|o| NodeOutput {
                        name: o.name.clone(),
                        output_type: o.output_type.clone().unwrap_or_else(|| "*".to_string()),
                    })
                    .collect(),
            };
            anchors.push((node.id.clone(), layout_node.pos));
            workflow.insert(node);
        }

        workflow.groups = compute_groups(&document.groups, &anchors);
        tracing::debug!(
            nodes = workflow.len(),
            groups = workflow.groups.len(),
            notes = workflow.notes.len(),
            warnings = warnings.len(),
            "imported layout document"
        );
        Imported { workflow, warnings }
    }

    fn extract_note(&self, node: &LayoutNode) -> Note {
        let content = match &node.widgets_values {
            Some(Value::Array(values)) => values.first().map(widget_text),
            _ => None,
        };
        Note {
            id: node.id.clone(),
            title: node.title.clone().unwrap_or_else(|| node.class_type.clone()),
            content: content.unwrap_or_default(),
        }
    }

    /// Assigns widget values to input names by walking the schema's widget inputs in
    /// lockstep with the flat value array.
    fn map_widgets(
        &self,
        node: &LayoutNode,
        inputs: &mut IndexMap<String, InputValue>,
        warnings: &mut Vec<ResolutionWarning>,
    ) {
        let Some(values) = &node.widgets_values else {
            return;
        };
        let has_values = match values {
            Value::Array(items) => !items.is_empty(),
            Value::Object(items) => !items.is_empty(),
            _ => false,
        };

        let Some(definitions) = self.schema.inputs(&node.class_type) else {
            if has_values {
                let warning = ResolutionWarning::UnmappedWidgets {
                    node_id: node.id.clone(),
                    class_type: node.class_type.clone(),
                };
                tracing::warn!("{warning}");
                warnings.push(warning);
            }
            return;
        };

        let widgets = definitions
            .iter()
            .filter(|d| d.is_widget() && d.name != self.options.control_widget_name);

        match values {
            Value::Array(items) => {
                let mut remaining = items.iter().peekable();
                for definition in widgets {
                    let Some(value) = remaining.next() else {
                        break;
                    };
                    inputs.insert(definition.name.clone(), InputValue::Literal(value.clone()));

                    let seeded =
                        definition.control_after_generate || self.options.is_seed(&definition.name);
                    if seeded
                        && remaining
                            .peek()
                            .and_then(|v| v.as_str())
                            .is_some_and(|token| self.options.is_control_token(token))
                    {
                        let token = remaining.next();
                        tracing::trace!(node = %node.id, ?token, "discarded control-mode widget");
                    }
                }
            }
            Value::Object(keyed) => {
                for definition in widgets {
                    if let Some(value) = keyed.get(&definition.name) {
                        inputs.insert(definition.name.clone(), InputValue::Literal(value.clone()));
                    }
                }
            }
            _ => {}
        }
    }

    /// Resolves socket references through the link table. Connections override literals.
    fn map_connections(
        &self,
        node: &LayoutNode,
        links: &AHashMap<i64, Edge>,
        by_id: &AHashMap<&str, &LayoutNode>,
        inputs: &mut IndexMap<String, InputValue>,
    ) {
        for input in &node.inputs {
            let source = input
                .link
                .filter(|link| *link >= 0)
                .and_then(|link| links.get(&link))
                .filter(|edge| edge.target_node == node.id && edge.target_slot < node.inputs.len())
                .and_then(|edge| self.resolve_source(edge, links, by_id));

            match source {
                Some((node_id, output_index)) => {
                    inputs.insert(
                        input.name.clone(),
                        InputValue::Connection {
                            node_id,
                            output_index,
                        },
                    );
                }
                None if input.widget.is_none() && !inputs.contains_key(&input.name) => {
                    inputs.insert(
                        input.name.clone(),
                        InputValue::UnconnectedSlot {
                            declared_type: input.input_type.clone().unwrap_or_else(|| "*".to_string()),
                        },
                    );
                }
                None => {}
            }
        }
    }

    /// Finds the real producer behind an edge, walking through reroute nodes.
    ///
    /// Edges from missing or note nodes, or naming an output slot the producer does not
    /// have, resolve to `None` and are dropped.
    fn resolve_source(
        &self,
        edge: &Edge,
        links: &AHashMap<i64, Edge>,
        by_id: &AHashMap<&str, &LayoutNode>,
    ) -> Option<(String, usize)> {
        let mut current = edge;
        let mut visited: AHashSet<&str> = AHashSet::new();
        loop {
            let source = by_id.get(current.source_node.as_str())?;
            if self.options.is_note(&source.class_type) {
                return None;
            }
            if !self.options.is_reroute(&source.class_type) {
                if !source.outputs.is_empty() && current.source_slot >= source.outputs.len() {
                    return None;
                }
                return Some((source.id.clone(), current.source_slot));
            }
            if !visited.insert(source.id.as_str()) {
                tracing::debug!(reroute = %source.id, "reroute cycle, dropping connection");
                return None;
            }
            let upstream = source.inputs.first()?.link.filter(|l| *l >= 0)?;
            current = links
                .get(&upstream)
                .filter(|edge| edge.target_node == source.id)?;
        }
    }
}

/// Assigns nodes to groups by containment of their anchor point (bounds inclusive).
fn compute_groups(groups: &[LayoutGroup], anchors: &[(String, [f64; 2])]) -> Vec<Group> {
    groups
        .iter()
        .enumerate()
        .filter_map(|(index, group)| {
            let [gx, gy, gw, gh] = group.rect()?;
            let members: Vec<String> = anchors
                .iter()
                .filter(|(_, [x, y])| gx <= *x && *x <= gx + gw && gy <= *y && *y <= gy + gh)
                .map(|(id, _)| id.clone())
                .collect();
            if members.is_empty() {
                return None;
            }
            Some(Group {
                id: group.id.unwrap_or(index as u64 + 1),
                title: group.title.clone(),
                member_node_ids: members,
            })
        })
        .collect()
}

fn widget_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
