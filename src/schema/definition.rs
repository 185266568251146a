use crate::error::CompileError;
use crate::graph::NodeOutput;
use ahash::AHashMap;
use serde_json::{Map, Value};

/// Declared types that the server renders as editable widgets rather than sockets.
pub const WIDGET_TYPES: &[&str] = &["INT", "FLOAT", "STRING", "BOOLEAN", "COMBO"];

/// One declared input of a node class, as reported by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDefinition {
    pub name: String,
    pub declared_type: String,
    /// The input has no widget form and can only be fed by a connection.
    pub connection_only: bool,
    /// A widget-typed input the server wants fed by a connection (`forceInput`).
    pub force_input: bool,
    /// Enumerated choices for combo inputs.
    pub choices: Option<Vec<String>>,
    /// The frontend appends a regenerate-mode widget right after this one.
    pub control_after_generate: bool,
}

impl InputDefinition {
    /// A widget input of a primitive type (`INT`, `FLOAT`, `STRING`, `BOOLEAN`).
    pub fn widget(name: &str, declared_type: &str) -> Self {
        Self {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            connection_only: false,
            force_input: false,
            choices: None,
            control_after_generate: false,
        }
    }

    /// A socket-only input such as `MODEL` or `CONDITIONING`.
    pub fn connection(name: &str, declared_type: &str) -> Self {
        Self {
            connection_only: true,
            ..Self::widget(name, declared_type)
        }
    }

    /// An enumerated-choice widget.
    pub fn choice(name: &str, choices: &[&str]) -> Self {
        Self {
            choices: Some(choices.iter().map(|c| c.to_string()).collect()),
            ..Self::widget(name, "COMBO")
        }
    }

    pub fn with_control_after_generate(mut self) -> Self {
        self.control_after_generate = true;
        self
    }

    pub fn with_force_input(mut self) -> Self {
        self.force_input = true;
        self
    }

    /// Whether this input occupies a slot in a node's flat widget-value array.
    pub fn is_widget(&self) -> bool {
        !self.connection_only && !self.force_input
    }

    pub fn is_string(&self) -> bool {
        self.declared_type.eq_ignore_ascii_case("STRING")
    }

    pub fn is_enumerated(&self) -> bool {
        self.choices.is_some()
    }

    /// Parses one `name: [TYPE, {options}]` entry of the server schema.
    fn from_schema_entry(name: &str, entry: &Value) -> Option<Self> {
        let declaration = entry.as_array()?;
        let options = declaration.get(1).and_then(Value::as_object);
        let flag = |key: &str| {
            options
                .and_then(|o| o.get(key))
                .and_then(Value::as_bool)
                .unwrap_or(false)
        };

        let (declared_type, choices) = match declaration.first()? {
            Value::Array(choices) => ("COMBO".to_string(), Some(string_list(choices))),
            Value::String(t) if t == "COMBO" => {
                let choices = options
                    .and_then(|o| o.get("options"))
                    .and_then(Value::as_array)
                    .map(|c| string_list(c))
                    .unwrap_or_default();
                (t.clone(), Some(choices))
            }
            Value::String(t) => (t.clone(), None),
            _ => return None,
        };

        let connection_only =
            choices.is_none() && !WIDGET_TYPES.iter().any(|w| w.eq_ignore_ascii_case(&declared_type));

        Some(Self {
            name: name.to_string(),
            declared_type,
            connection_only,
            force_input: flag("forceInput"),
            choices,
            control_after_generate: flag("control_after_generate"),
        })
    }
}

fn string_list(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

/// Declared inputs and outputs of a single node class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassSchema {
    pub inputs: Vec<InputDefinition>,
    pub outputs: Vec<NodeOutput>,
}

impl ClassSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, definition: InputDefinition) -> Self {
        self.inputs.push(definition);
        self
    }

    pub fn output(mut self, name: &str, output_type: &str) -> Self {
        self.outputs.push(NodeOutput::new(name, output_type));
        self
    }

    fn from_schema_entry(entry: &Map<String, Value>) -> Self {
        let input = entry.get("input").and_then(Value::as_object);
        let order = entry.get("input_order").and_then(Value::as_object);

        let mut inputs = Vec::new();
        for section in ["required", "optional"] {
            let Some(declared) = input.and_then(|i| i.get(section)).and_then(Value::as_object)
            else {
                continue;
            };
            let ordered: Vec<&str> = order
                .and_then(|o| o.get(section))
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).collect())
                .unwrap_or_else(|| declared.keys().map(String::as_str).collect());

            inputs.extend(ordered.into_iter().filter_map(|name| {
                declared
                    .get(name)
                    .and_then(|e| InputDefinition::from_schema_entry(name, e))
            }));
        }

        let types = entry.get("output").and_then(Value::as_array);
        let names = entry.get("output_name").and_then(Value::as_array);
        let outputs = types
            .map(|types| {
                types
                    .iter()
                    .enumerate()
                    .map(|(i, t)| {
                        let output_type = match t {
                            Value::String(s) => s.clone(),
                            // Combo outputs are declared as their choice list.
                            _ => "COMBO".to_string(),
                        };
                        let name = names
                            .and_then(|n| n.get(i))
                            .and_then(Value::as_str)
                            .unwrap_or(&output_type)
                            .to_string();
                        NodeOutput {
                            name,
                            output_type,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { inputs, outputs }
    }
}

/// Read-only lookup from class type to its declared inputs and outputs.
///
/// Built once from the server's object-info document and never mutated by any
/// transformation. A missing class type is never an error; callers degrade instead.
#[derive(Debug, Clone, Default)]
pub struct NodeSchema {
    classes: AHashMap<String, ClassSchema>,
}

impl NodeSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the server's object-info document.
    pub fn from_json(text: &str) -> Result<Self, CompileError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| CompileError::Schema(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, CompileError> {
        let classes = value
            .as_object()
            .ok_or_else(|| CompileError::Schema("schema document must be an object".to_string()))?
            .iter()
            .filter_map(|(class_type, entry)| {
                entry
                    .as_object()
                    .map(|e| (class_type.clone(), ClassSchema::from_schema_entry(e)))
            })
            .collect();
        Ok(Self { classes })
    }

    pub fn with_class(mut self, class_type: &str, schema: ClassSchema) -> Self {
        self.insert(class_type, schema);
        self
    }

    pub fn insert(&mut self, class_type: &str, schema: ClassSchema) {
        self.classes.insert(class_type.to_string(), schema);
    }

    pub fn class(&self, class_type: &str) -> Option<&ClassSchema> {
        self.classes.get(class_type)
    }

    pub fn contains(&self, class_type: &str) -> bool {
        self.classes.contains_key(class_type)
    }

    /// Ordered input definitions, or `None` when the class type is unknown.
    pub fn inputs(&self, class_type: &str) -> Option<&[InputDefinition]> {
        self.class(class_type).map(|c| c.inputs.as_slice())
    }

    pub fn input(&self, class_type: &str, name: &str) -> Option<&InputDefinition> {
        self.inputs(class_type)?.iter().find(|d| d.name == name)
    }

    /// Declared outputs, empty when the class type is unknown.
    pub fn outputs(&self, class_type: &str) -> &[NodeOutput] {
        self.class(class_type)
            .map(|c| c.outputs.as_slice())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
