//! Deserialization structs for the editor's layout format.
//!
//! These mirror the document the visual editor saves and are only used as the input
//! side of [`super::LayoutImporter`]. Every sub-structure is read leniently: a
//! missing or malformed piece degrades to an empty value instead of failing the
//! whole document.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// A complete layout document.
#[derive(Debug, Deserialize, Default)]
pub struct LayoutDocument {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub nodes: Vec<LayoutNode>,
    /// Global link table; entries are 6-tuples or keyed objects.
    #[serde(default, deserialize_with = "lenient_raw_seq")]
    pub links: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub groups: Vec<LayoutGroup>,
}

/// A positioned node of the layout document.
#[derive(Debug, Deserialize)]
pub struct LayoutNode {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "type")]
    pub class_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_point")]
    pub pos: [f64; 2],
    #[serde(default, deserialize_with = "lenient_point")]
    pub size: [f64; 2],
    #[serde(default, deserialize_with = "lenient_mode")]
    pub mode: i64,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub inputs: Vec<LayoutInput>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub outputs: Vec<LayoutOutput>,
    /// Flat widget array, or a keyed object for some custom nodes.
    #[serde(default)]
    pub widgets_values: Option<Value>,
}

/// A per-node input socket reference.
#[derive(Debug, Deserialize)]
pub struct LayoutInput {
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_type")]
    pub input_type: Option<String>,
    #[serde(default)]
    pub link: Option<i64>,
    /// Present when the socket is a converted widget.
    #[serde(default)]
    pub widget: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct LayoutOutput {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_type")]
    pub output_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LayoutGroup {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: String,
    /// `[x, y, width, height]`.
    #[serde(default, deserialize_with = "lenient_raw_seq")]
    pub bounding: Vec<Value>,
}

impl LayoutGroup {
    pub fn rect(&self) -> Option<[f64; 4]> {
        match self.bounding.as_slice() {
            [x, y, w, h, ..] => Some([x.as_f64()?, y.as_f64()?, w.as_f64()?, h.as_f64()?]),
            _ => None,
        }
    }
}

/// Whether a parsed document looks like a layout document.
pub fn is_layout_value(value: &Value) -> bool {
    value.get("nodes").is_some_and(Value::is_array)
}

fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_raw_seq<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    })
}

fn lenient_point<'de, D>(deserializer: D) -> Result<[f64; 2], D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    // Older editors saved points as {"0": x, "1": y}.
    let coord = |i: usize| {
        value
            .get(i)
            .or_else(|| value.get(i.to_string()))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };
    Ok([coord(0), coord(1)])
}

fn lenient_mode<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_i64().unwrap_or(0))
}

fn lenient_type<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid node id: {other}"))),
    }
}
