use serde_json::Value;

/// One entry of the layout document's global link table.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub link_id: i64,
    pub source_node: String,
    pub source_slot: usize,
    pub target_node: String,
    pub target_slot: usize,
    pub link_type: Option<String>,
}

impl Edge {
    /// Reads a `[id, src, srcSlot, dst, dstSlot, type]` tuple or its keyed-object form.
    ///
    /// Tuples with fewer than six fields and entries with unusable ids yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(fields) if fields.len() >= 6 => Some(Self {
                link_id: fields[0].as_i64()?,
                source_node: node_key(&fields[1])?,
                source_slot: slot(&fields[2])?,
                target_node: node_key(&fields[3])?,
                target_slot: slot(&fields[4])?,
                link_type: fields[5].as_str().map(str::to_string),
            }),
            Value::Object(fields) => Some(Self {
                link_id: fields.get("id")?.as_i64()?,
                source_node: node_key(fields.get("origin_id")?)?,
                source_slot: slot(fields.get("origin_slot")?)?,
                target_node: node_key(fields.get("target_id")?)?,
                target_slot: slot(fields.get("target_slot")?)?,
                link_type: fields
                    .get("type")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            _ => None,
        }
    }
}

fn node_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn slot(value: &Value) -> Option<usize> {
    value.as_u64().map(|s| s as usize)
}
