use crate::schema::NodeSchema;
use indexmap::IndexMap;
use serde_json::Value;

/// Execution mode of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeMode {
    #[default]
    Active,
    /// Skipped entirely by the server, outputs unavailable.
    Muted,
    /// Logically skipped; its inputs are threaded through to its consumers.
    Bypassed,
}

impl NodeMode {
    /// Maps the layout editor's numeric mode flag. Unknown flags count as active.
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => NodeMode::Muted,
            4 => NodeMode::Bypassed,
            _ => NodeMode::Active,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            NodeMode::Active => 0,
            NodeMode::Muted => 2,
            NodeMode::Bypassed => 4,
        }
    }

    /// Accepts either the numeric flag or a textual name.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_i64().map(Self::from_code).unwrap_or_default(),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "muted" | "never" => NodeMode::Muted,
                "bypass" | "bypassed" => NodeMode::Bypassed,
                _ => NodeMode::Active,
            },
            _ => NodeMode::Active,
        }
    }
}

/// The value bound to a named node input.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    /// A value baked into the node.
    Literal(Value),
    /// Output `output_index` of node `node_id`.
    Connection { node_id: String, output_index: usize },
    /// A typed socket nothing feeds yet.
    UnconnectedSlot { declared_type: String },
}

impl InputValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        InputValue::Literal(value.into())
    }

    pub fn connection(node_id: impl Into<String>, output_index: usize) -> Self {
        InputValue::Connection {
            node_id: node_id.into(),
            output_index,
        }
    }

    pub fn as_connection(&self) -> Option<(&str, usize)> {
        match self {
            InputValue::Connection {
                node_id,
                output_index,
            } => Some((node_id, *output_index)),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            InputValue::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, InputValue::Connection { .. })
    }
}

/// One declared output port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOutput {
    pub name: String,
    pub output_type: String,
}

impl NodeOutput {
    pub fn new(name: &str, output_type: &str) -> Self {
        Self {
            name: name.to_string(),
            output_type: output_type.to_string(),
        }
    }
}

/// A node of the canonical graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub class_type: String,
    pub title: Option<String>,
    pub mode: NodeMode,
    pub inputs: IndexMap<String, InputValue>,
    /// Output order defines the indices referenced by `InputValue::Connection`.
    pub outputs: Vec<NodeOutput>,
}

impl Node {
    pub fn new(id: impl Into<String>, class_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class_type: class_type.into(),
            title: None,
            mode: NodeMode::Active,
            inputs: IndexMap::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_mode(mut self, mode: NodeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_input(mut self, name: &str, value: InputValue) -> Self {
        self.inputs.insert(name.to_string(), value);
        self
    }

    pub fn with_literal(self, name: &str, value: impl Into<Value>) -> Self {
        self.with_input(name, InputValue::literal(value))
    }

    pub fn with_connection(self, name: &str, node_id: &str, output_index: usize) -> Self {
        self.with_input(name, InputValue::connection(node_id, output_index))
    }

    pub fn with_output(mut self, name: &str, output_type: &str) -> Self {
        self.outputs.push(NodeOutput::new(name, output_type));
        self
    }

    /// Title for display, falling back to the class type.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.class_type)
    }

    pub fn literal(&self, input: &str) -> Option<&Value> {
        self.inputs.get(input).and_then(InputValue::as_literal)
    }

    pub fn connection(&self, input: &str) -> Option<(&str, usize)> {
        self.inputs.get(input).and_then(InputValue::as_connection)
    }

    pub fn is_bypassed(&self) -> bool {
        self.mode == NodeMode::Bypassed
    }

    pub fn numeric_id(&self) -> Option<u64> {
        self.id.parse().ok()
    }

    /// Outputs carried by the node itself, or the schema's declaration when it has none.
    pub fn resolved_outputs<'a>(&'a self, schema: &'a NodeSchema) -> &'a [NodeOutput] {
        if self.outputs.is_empty() {
            schema.outputs(&self.class_type)
        } else {
            &self.outputs
        }
    }

    pub fn produces(&self, output_type: &str, schema: &NodeSchema) -> bool {
        self.resolved_outputs(schema)
            .iter()
            .any(|o| o.output_type.eq_ignore_ascii_case(output_type))
    }
}
