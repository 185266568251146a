use super::{InputValue, Node};
use crate::compat::is_compatible;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A visual group of nodes. Membership is derived from node positions at import time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub title: String,
    #[serde(rename = "nodes")]
    pub member_node_ids: Vec<String>,
}

/// Free text attached to a workflow. Never executable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// One downstream use of a node's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consumer {
    pub node_id: String,
    pub input: String,
    pub output_index: usize,
}

/// The canonical, id-keyed graph every transformation operates on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workflow {
    pub nodes: IndexMap<String, Node>,
    pub groups: Vec<Group>,
    pub notes: Vec<Note>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.insert(node);
        self
    }

    /// Inserts a node, replacing any node with the same id.
    pub fn insert(&mut self, node: Node) -> Option<Node> {
        self.nodes.insert(node.id.clone(), node)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Node> {
        self.nodes.shift_remove(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node (in graph order) of the given class type.
    pub fn find_by_class(&self, class_type: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.class_type == class_type)
    }

    pub fn max_numeric_id(&self) -> Option<u64> {
        self.nodes.values().filter_map(Node::numeric_id).max()
    }

    /// Every input in the graph that is connected to an output of `node_id`.
    pub fn consumers(&self, node_id: &str) -> Vec<Consumer> {
        self.nodes
            .values()
            .flat_map(|node| {
                node.inputs.iter().filter_map(move |(input, value)| {
                    value
                        .as_connection()
                        .filter(|(source, _)| *source == node_id)
                        .map(|(_, output_index)| Consumer {
                            node_id: node.id.clone(),
                            input: input.clone(),
                            output_index,
                        })
                })
            })
            .collect()
    }

    /// Unconnected slots that would accept an output of `producer_type`.
    pub fn connection_targets(&self, producer_type: Option<&str>) -> Vec<(String, String)> {
        self.nodes
            .values()
            .flat_map(|node| {
                node.inputs.iter().filter_map(move |(input, value)| match value {
                    InputValue::UnconnectedSlot { declared_type }
                        if is_compatible(producer_type, Some(declared_type)) =>
                    {
                        Some((node.id.clone(), input.clone()))
                    }
                    _ => None,
                })
            })
            .collect()
    }

    /// `(node_id, input)` pairs whose connection points at a node missing from the graph.
    pub fn dangling_connections(&self) -> Vec<(String, String)> {
        self.nodes
            .values()
            .flat_map(|node| {
                node.inputs.iter().filter_map(move |(input, value)| {
                    value
                        .as_connection()
                        .filter(|(source, _)| !self.nodes.contains_key(*source))
                        .map(|_| (node.id.clone(), input.clone()))
                })
            })
            .collect()
    }

    /// Drops group members that no longer exist, and groups left empty by that.
    pub(crate) fn prune_groups(&mut self) {
        let nodes = &self.nodes;
        for group in &mut self.groups {
            group.member_node_ids.retain(|id| nodes.contains_key(id));
        }
        self.groups.retain(|g| !g.member_node_ids.is_empty());
    }
}
