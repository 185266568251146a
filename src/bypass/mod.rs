//! Removal of bypassed nodes, threading their upstream sources to their consumers.

use crate::error::ResolutionWarning;
use crate::graph::{InputValue, Workflow};
use ahash::AHashSet;

mod heuristic;

pub use heuristic::infer_type_from_name;

/// What to do with one input that pointed at a bypassed node.
enum Rewire {
    Connect(String, usize),
    Drop,
}

/// Rewires connections around bypassed nodes and removes them from the graph.
#[derive(Debug, Clone, Copy)]
pub struct BypassResolver {
    max_depth: usize,
}

impl Default for BypassResolver {
    fn default() -> Self {
        Self { max_depth: 10 }
    }
}

impl BypassResolver {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Resolves every bypassed node in place and returns the warnings produced.
    ///
    /// A graph without bypassed nodes is left untouched. Afterwards no connection in
    /// the graph points at a node that is not in it.
    pub fn resolve(&self, workflow: &mut Workflow) -> Vec<ResolutionWarning> {
        let bypassed: AHashSet<String> = workflow
            .nodes
            .values()
            .filter(|n| n.is_bypassed())
            .map(|n| n.id.clone())
            .collect();
        if bypassed.is_empty() {
            return Vec::new();
        }

        let mut warnings = Vec::new();
        let mut rewires: Vec<(String, String, Rewire)> = Vec::new();

        for node in workflow.nodes.values().filter(|n| !bypassed.contains(&n.id)) {
            for (input, value) in &node.inputs {
                let Some((source, _)) = value.as_connection() else {
                    continue;
                };
                if !bypassed.contains(source) {
                    continue;
                }
                let rewire = match self.trace(workflow, &bypassed, &node.id, input, source) {
                    Ok((upstream, output_index)) => Rewire::Connect(upstream, output_index),
                    Err(warning) => {
                        tracing::warn!("{warning}");
                        warnings.push(warning);
                        Rewire::Drop
                    }
                };
                rewires.push((node.id.clone(), input.clone(), rewire));
            }
        }

        for (node_id, input, rewire) in rewires {
            let Some(node) = workflow.node_mut(&node_id) else {
                continue;
            };
            match rewire {
                Rewire::Connect(upstream, output_index) => {
                    tracing::debug!(node = %node_id, %input, %upstream, output_index, "rewired around bypass");
                    node.inputs.insert(input, InputValue::connection(upstream, output_index));
                }
                Rewire::Drop => {
                    node.inputs.shift_remove(&input);
                }
            }
        }

        for id in &bypassed {
            workflow.remove(id);
            tracing::debug!(node = %id, "removed bypassed node");
        }

        // Connections that were already dangling in the input must not survive either.
        for (node_id, input) in workflow.dangling_connections() {
            let Some(node) = workflow.node_mut(&node_id) else {
                continue;
            };
            let Some(InputValue::Connection { node_id: source_id, .. }) = node.inputs.shift_remove(&input)
            else {
                continue;
            };
            let warning = ResolutionWarning::DanglingConnection {
                node_id,
                input,
                source_id,
            };
            tracing::warn!("{warning}");
            warnings.push(warning);
        }
        workflow.prune_groups();

        warnings
    }

    /// Walks upstream from a bypassed node until a non-bypassed producer of the
    /// type expected by `input` is found.
    fn trace(
        &self,
        workflow: &Workflow,
        bypassed: &AHashSet<String>,
        node_id: &str,
        input: &str,
        source: &str,
    ) -> Result<(String, usize), ResolutionWarning> {
        let expected = infer_type_from_name(input).ok_or_else(|| {
            ResolutionWarning::UninferableBypassType {
                node_id: node_id.to_string(),
                input: input.to_string(),
                bypassed_id: source.to_string(),
            }
        })?;

        let unresolved = |bypassed_id: &str| ResolutionWarning::UnresolvedBypassChain {
            node_id: node_id.to_string(),
            input: input.to_string(),
            bypassed_id: bypassed_id.to_string(),
            expected_type: expected.to_string(),
        };

        let mut current = source;
        for _ in 0..self.max_depth {
            let upstream = workflow.node(current).and_then(|bypassed_node| {
                bypassed_node.inputs.iter().find_map(|(name, value)| {
                    value
                        .as_connection()
                        .filter(|_| infer_type_from_name(name) == Some(expected))
                })
            });
            let Some((upstream, output_index)) = upstream else {
                return Err(unresolved(current));
            };

            if !bypassed.contains(upstream) {
                if !workflow.contains(upstream) {
                    return Err(unresolved(current));
                }
                return Ok((upstream.to_string(), output_index));
            }
            current = upstream;
        }

        Err(ResolutionWarning::BypassDepthExceeded {
            node_id: node_id.to_string(),
            input: input.to_string(),
            limit: self.max_depth,
        })
    }
}
