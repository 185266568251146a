use super::{FieldKey, WorkflowCategory};
use crate::graph::{InputValue, Workflow};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// A hypothesis that `input_key` on `node_id` realizes a semantic field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCandidate {
    pub node_id: String,
    pub node_title: String,
    pub class_type: String,
    pub input_key: String,
    pub current_value: Value,
}

/// Candidates found for one field, plus which one is in use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSlot {
    pub required: bool,
    pub candidates: Vec<FieldCandidate>,
    pub selected: Option<usize>,
}

impl FieldSlot {
    pub(crate) fn new(required: bool, candidates: Vec<FieldCandidate>) -> Self {
        let selected = (!candidates.is_empty()).then_some(0);
        Self {
            required,
            candidates,
            selected,
        }
    }

    pub fn selected_candidate(&self) -> Option<&FieldCandidate> {
        self.selected.and_then(|i| self.candidates.get(i))
    }
}

/// Field analysis result for one workflow and category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMapping {
    pub category: WorkflowCategory,
    pub fields: IndexMap<FieldKey, FieldSlot>,
}

impl FieldMapping {
    pub fn get(&self, key: FieldKey) -> Option<&FieldSlot> {
        self.fields.get(&key)
    }

    pub fn candidates(&self, key: FieldKey) -> &[FieldCandidate] {
        self.get(key)
            .map(|slot| slot.candidates.as_slice())
            .unwrap_or_default()
    }

    pub fn selected(&self, key: FieldKey) -> Option<&FieldCandidate> {
        self.get(key).and_then(FieldSlot::selected_candidate)
    }

    /// Re-selects the candidate at `index`. Returns `false` when out of range.
    pub fn select(&mut self, key: FieldKey, index: usize) -> bool {
        match self.fields.get_mut(&key) {
            Some(slot) if index < slot.candidates.len() => {
                slot.selected = Some(index);
                true
            }
            _ => false,
        }
    }

    pub fn clear_selection(&mut self, key: FieldKey) {
        if let Some(slot) = self.fields.get_mut(&key) {
            slot.selected = None;
        }
    }

    /// Required fields with nothing selected.
    pub fn missing_required(&self) -> Vec<FieldKey> {
        self.fields
            .iter()
            .filter(|(_, slot)| slot.required && slot.selected.is_none())
            .map(|(key, _)| *key)
            .collect()
    }

    /// Writes each selected field's placeholder token into its input, turning the
    /// workflow into a template. Only literal inputs are touched. Returns the number of
    /// inputs rewritten.
    pub fn apply_placeholders(&self, workflow: &mut Workflow) -> usize {
        let mut applied = 0;
        for (key, slot) in &self.fields {
            let Some(candidate) = slot.selected_candidate() else {
                continue;
            };
            let Some(value) = workflow
                .node_mut(&candidate.node_id)
                .and_then(|n| n.inputs.get_mut(&candidate.input_key))
            else {
                continue;
            };
            if let InputValue::Literal(literal) = value {
                *literal = Value::String(key.placeholder());
                applied += 1;
            }
        }
        applied
    }
}
