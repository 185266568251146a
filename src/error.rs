use thiserror::Error;

/// Fatal errors that abort a single compilation call.
///
/// Every variant that originates from caller-supplied text carries that text back
/// untouched, so the caller can fall back to submitting (or showing) the original.
#[derive(Error, Debug, Clone)]
pub enum CompileError {
    #[error("Failed to parse workflow JSON: {message}")]
    Parse { message: String, original: String },

    #[error("Workflow JSON is neither a layout document nor a canonical node map")]
    UnrecognizedFormat { original: String },

    #[error("Node '{node_id}' is invalid: {message}")]
    InvalidNode { node_id: String, message: String },

    #[error("Failed to parse node type schema: {0}")]
    Schema(String),

    #[error("Failed to render workflow JSON: {0}")]
    Serialize(String),
}

impl CompileError {
    pub(crate) fn parse(err: serde_json::Error, original: &str) -> Self {
        CompileError::Parse {
            message: err.to_string(),
            original: original.to_string(),
        }
    }

    /// The caller's original input, when the error carries it.
    pub fn original(&self) -> Option<&str> {
        match self {
            CompileError::Parse { original, .. } | CompileError::UnrecognizedFormat { original } => {
                Some(original)
            }
            _ => None,
        }
    }
}

/// Non-fatal problems recorded while a transformation proceeds.
///
/// These are rendered through `Display` into the plain warning list handed back to
/// the caller alongside the result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionWarning {
    #[error(
        "Node '{node_id}' ({class_type}): no schema available, widget values could not be mapped"
    )]
    UnmappedWidgets { node_id: String, class_type: String },

    #[error(
        "Input '{input}' on node '{node_id}' pointed at bypassed node '{bypassed_id}' but its type could not be inferred; connection dropped"
    )]
    UninferableBypassType {
        node_id: String,
        input: String,
        bypassed_id: String,
    },

    #[error(
        "Input '{input}' on node '{node_id}': bypassed node '{bypassed_id}' has no upstream {expected_type} connection; connection dropped"
    )]
    UnresolvedBypassChain {
        node_id: String,
        input: String,
        bypassed_id: String,
        expected_type: String,
    },

    #[error(
        "Input '{input}' on node '{node_id}': bypass chain exceeded {limit} hops (possible cycle); connection dropped"
    )]
    BypassDepthExceeded {
        node_id: String,
        input: String,
        limit: usize,
    },

    #[error(
        "Input '{input}' on node '{node_id}' pointed at missing node '{source_id}'; connection dropped"
    )]
    DanglingConnection {
        node_id: String,
        input: String,
        source_id: String,
    },
}
