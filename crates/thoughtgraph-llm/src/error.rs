use crate::client::CompletionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thoughtgraph_core::GraphError;

/// Which completion pass an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    GraphGeneration,
    Answer,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::GraphGeneration => f.write_str("graph generation"),
            Step::Answer => f.write_str("answer"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// The model replied, but nothing usable could be located in the text.
    #[error("{step} step: no JSON object found in model output")]
    Extraction { step: Step, raw: String },

    #[error("{step} step: could not parse model output: {message}")]
    Parse {
        step: Step,
        message: String,
        raw: String,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl PipelineError {
    /// Raw model text, when the failure happened after a completion arrived.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            PipelineError::Extraction { raw, .. } | PipelineError::Parse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
