//! Reading and writing the canonical (server submission) JSON format.
//!
//! A canonical document is an object keyed by node id:
//!
//! ```json
//! {
//!   "3": {
//!     "inputs": { "seed": 42, "model": ["4", 0] },
//!     "class_type": "KSampler",
//!     "_meta": { "title": "Sampler" }
//!   }
//! }
//! ```
//!
//! Two-element arrays `[node_id, output_index]` are connections, everything else is a
//! literal. The keys `groups` and `notes` are reserved for the non-executable extras.

use super::{Group, InputValue, Node, NodeMode, Note, Workflow};
use crate::error::CompileError;
use indexmap::IndexMap;
use serde_json::{Map, Value};

const GROUPS_KEY: &str = "groups";
const NOTES_KEY: &str = "notes";

impl Workflow {
    /// Whether a parsed document looks like a canonical node map.
    pub fn is_canonical_value(value: &Value) -> bool {
        let Some(obj) = value.as_object() else {
            return false;
        };
        obj.iter()
            .filter(|(k, _)| !is_reserved(k))
            .all(|(_, node)| node.get("class_type").is_some_and(Value::is_string))
    }

    pub fn from_canonical_json(text: &str) -> Result<Self, CompileError> {
        let value: Value = serde_json::from_str(text).map_err(|e| CompileError::parse(e, text))?;
        Self::from_canonical_value(&value)
    }

    pub fn from_canonical_value(value: &Value) -> Result<Self, CompileError> {
        let obj = value.as_object().ok_or_else(|| CompileError::InvalidNode {
            node_id: "N/A".to_string(),
            message: "canonical workflow must be an object keyed by node id".to_string(),
        })?;

        let mut workflow = Workflow::new();
        for (id, entry) in obj {
            if is_reserved(id) {
                continue;
            }
            workflow.insert(parse_node(id, entry)?);
        }

        // Malformed extras degrade to nothing rather than failing the document.
        workflow.groups = obj
            .get(GROUPS_KEY)
            .and_then(|g| serde_json::from_value::<Vec<Group>>(g.clone()).ok())
            .unwrap_or_default();
        workflow.notes = obj
            .get(NOTES_KEY)
            .and_then(|n| serde_json::from_value::<Vec<Note>>(n.clone()).ok())
            .unwrap_or_default();

        Ok(workflow)
    }

    pub fn to_canonical_value(&self) -> Value {
        let mut root = Map::new();
        for (id, node) in &self.nodes {
            root.insert(id.clone(), render_node(node));
        }
        if !self.groups.is_empty() {
            root.insert(GROUPS_KEY.to_string(), serde_json::json!(self.groups));
        }
        if !self.notes.is_empty() {
            root.insert(NOTES_KEY.to_string(), serde_json::json!(self.notes));
        }
        Value::Object(root)
    }

    /// Pretty-printed canonical JSON.
    pub fn to_canonical_json(&self) -> Result<String, CompileError> {
        serde_json::to_string_pretty(&self.to_canonical_value())
            .map_err(|e| CompileError::Serialize(e.to_string()))
    }
}

fn is_reserved(key: &str) -> bool {
    key == GROUPS_KEY || key == NOTES_KEY
}

fn parse_node(id: &str, entry: &Value) -> Result<Node, CompileError> {
    let invalid = |message: &str| CompileError::InvalidNode {
        node_id: id.to_string(),
        message: message.to_string(),
    };

    let obj = entry
        .as_object()
        .ok_or_else(|| invalid("node entry must be an object"))?;
    let class_type = obj
        .get("class_type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing required 'class_type' field"))?;

    let inputs: IndexMap<String, InputValue> = obj
        .get("inputs")
        .and_then(Value::as_object)
        .map(|inputs| {
            inputs
                .iter()
                .map(|(name, value)| (name.clone(), parse_input(value)))
                .collect()
        })
        .unwrap_or_default();

    let mut node = Node::new(id, class_type);
    node.inputs = inputs;
    node.mode = obj.get("mode").map(NodeMode::from_value).unwrap_or_default();
    node.title = obj
        .get("_meta")
        .and_then(|m| m.get("title"))
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(node)
}

fn parse_input(value: &Value) -> InputValue {
    if let Some([source, index]) = value.as_array().map(Vec::as_slice) {
        let source = match source {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.is_u64() => Some(n.to_string()),
            _ => None,
        };
        if let (Some(node_id), Some(output_index)) = (source, index.as_u64()) {
            return InputValue::Connection {
                node_id,
                output_index: output_index as usize,
            };
        }
    }
    InputValue::Literal(value.clone())
}

fn render_node(node: &Node) -> Value {
    let mut inputs = Map::new();
    for (name, value) in &node.inputs {
        match value {
            InputValue::Literal(v) => {
                inputs.insert(name.clone(), v.clone());
            }
            InputValue::Connection {
                node_id,
                output_index,
            } => {
                inputs.insert(name.clone(), serde_json::json!([node_id, output_index]));
            }
            // The submission format has no representation for an empty socket.
            InputValue::UnconnectedSlot { .. } => {}
        }
    }

    let mut out = Map::new();
    out.insert("inputs".to_string(), Value::Object(inputs));
    out.insert("class_type".to_string(), Value::String(node.class_type.clone()));
    if node.mode != NodeMode::Active {
        out.insert("mode".to_string(), Value::from(node.mode.code()));
    }
    if let Some(title) = &node.title {
        out.insert("_meta".to_string(), serde_json::json!({ "title": title }));
    }
    Value::Object(out)
}
