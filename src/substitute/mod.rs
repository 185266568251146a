//! Placeholder substitution and caller-supplied attribute overrides.
//!
//! Placeholders are `{{field_key}}` tokens inside literal string inputs. A literal that
//! is exactly one placeholder takes the substituted value with its own JSON type, so a
//! `"{{seed}}"` literal becomes the number `42`. A placeholder embedded in longer text
//! is replaced textually. Unknown placeholders are left as they are.

use crate::graph::{InputValue, Workflow};
use indexmap::IndexMap;
use serde_json::Value;

/// Per-node literal overrides: node id -> input name -> new value.
pub type AttributeOverrides = IndexMap<String, IndexMap<String, Value>>;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Replaces placeholders in every literal input. Returns the number of inputs changed.
pub fn substitute_placeholders(workflow: &mut Workflow, values: &IndexMap<String, Value>) -> usize {
    if values.is_empty() {
        return 0;
    }
    let mut changed = 0;
    for node in workflow.nodes.values_mut() {
        for (input, value) in node.inputs.iter_mut() {
            let InputValue::Literal(Value::String(text)) = value else {
                continue;
            };
            let replacement = match whole_placeholder(text).and_then(|key| values.get(key)) {
                Some(typed) => typed.clone(),
                None => match render_template(text, values) {
                    Some(rendered) => Value::String(rendered),
                    None => continue,
                },
            };
            tracing::trace!(node = %node.id, %input, "substituted placeholder");
            *value = InputValue::Literal(replacement);
            changed += 1;
        }
    }
    changed
}

/// Applies overrides to inputs that already exist on the node and hold a literal.
/// Unknown nodes and inputs, connections and empty slots are left alone.
pub fn apply_overrides(workflow: &mut Workflow, overrides: &AttributeOverrides) -> usize {
    let mut applied = 0;
    for (node_id, inputs) in overrides {
        let Some(node) = workflow.node_mut(node_id) else {
            tracing::debug!(node = %node_id, "override for unknown node ignored");
            continue;
        };
        for (input, new_value) in inputs {
            match node.inputs.get_mut(input) {
                Some(InputValue::Literal(current)) => {
                    *current = new_value.clone();
                    applied += 1;
                }
                _ => tracing::debug!(node = %node_id, %input, "override for non-literal input ignored"),
            }
        }
    }
    applied
}

/// The key of a literal consisting of exactly one placeholder.
fn whole_placeholder(text: &str) -> Option<&str> {
    let inner = text.trim().strip_prefix(OPEN)?.strip_suffix(CLOSE)?;
    (!inner.contains(OPEN) && !inner.contains(CLOSE)).then(|| inner.trim())
}

/// Textual replacement of every known placeholder; `None` when nothing changed.
fn render_template(text: &str, values: &IndexMap<String, Value>) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut replaced = false;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };
        let key = after_open[..end].trim();
        out.push_str(&rest[..start]);
        match values.get(key) {
            Some(value) => {
                out.push_str(&display_value(value));
                replaced = true;
            }
            None => out.push_str(&rest[start..start + OPEN.len() + end + CLOSE.len()]),
        }
        rest = &after_open[end + CLOSE.len()..];
    }
    out.push_str(rest);

    replaced.then_some(out)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
