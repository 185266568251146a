use super::NodeSchema;
use std::sync::{Arc, RwLock};

/// Holds the current schema snapshot and swaps it wholesale when the server schema changes.
///
/// Readers clone the inner `Arc`, so a compilation keeps working against the snapshot it
/// started with even if a replacement lands mid-call.
#[derive(Debug, Default)]
pub struct SchemaCache {
    current: RwLock<Arc<NodeSchema>>,
}

impl SchemaCache {
    pub fn new(schema: NodeSchema) -> Self {
        Self {
            current: RwLock::new(Arc::new(schema)),
        }
    }

    /// The schema in effect right now.
    pub fn snapshot(&self) -> Arc<NodeSchema> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Installs a new schema and returns the one it replaced.
    pub fn replace(&self, schema: NodeSchema) -> Arc<NodeSchema> {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tracing::debug!(classes = schema.len(), "replacing node type schema");
        std::mem::replace(&mut *guard, Arc::new(schema))
    }
}
