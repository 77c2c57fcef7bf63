use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Node,
    Edge,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Node => f.write_str("node"),
            ElementKind::Edge => f.write_str("edge"),
        }
    }
}

/// Structural errors raised while building or parsing a graph.
///
/// These abort the step that produced them. Content-quality issues (unknown
/// tags, weights outside `[0, 1]`) are reported by `Graph::validate` instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("invalid graph document: {message}")]
    Schema { message: String },

    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: ElementKind, id: String },

    #[error("edge {edge_id} references unknown node {missing}")]
    DanglingReference { edge_id: String, missing: String },
}

impl GraphError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        GraphError::Schema {
            message: message.into(),
        }
    }
}
