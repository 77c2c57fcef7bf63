//! First pass: ask the model for a thought graph, parse it, validate it.
//!
//! Parsing failures abort the step. Validation problems do not; they travel
//! with the graph so later steps can run on a best-effort graph.

use crate::client::CompletionClient;
use crate::error::{PipelineError, Step};
use crate::pipeline::PipelineConfig;
use crate::prompts;
use serde_json::Value;
use thoughtgraph_core::{extract_json_object, parse_triple_lines, Graph, ValidationReport};

#[derive(Debug, Clone)]
pub struct GeneratedGraph {
    pub graph: Graph,
    pub report: ValidationReport,
}

pub fn generate_graph<C: CompletionClient>(
    client: &C,
    question: &str,
) -> Result<GeneratedGraph, PipelineError> {
    generate_graph_with(client, question, &PipelineConfig::default())
}

pub fn generate_graph_with<C: CompletionClient>(
    client: &C,
    question: &str,
    config: &PipelineConfig,
) -> Result<GeneratedGraph, PipelineError> {
    let raw = client.complete(
        &prompts::graph_system_prompt(),
        &prompts::graph_user_prompt(question),
    )?;

    let graph = graph_from_output(&raw, config)?;
    let report = graph.validate();

    tracing::info!(
        nodes = report.summary.nodes,
        edges = report.summary.edges,
        valid = report.valid,
        "thought graph parsed"
    );
    for problem in &report.problems {
        tracing::warn!(%problem, "graph validation problem");
    }

    Ok(GeneratedGraph { graph, report })
}

/// Turn raw model output into a graph according to `config`.
pub fn graph_from_output(raw: &str, config: &PipelineConfig) -> Result<Graph, PipelineError> {
    let Some(span) = extract_json_object(raw, config.extraction) else {
        return graph_from_triple_lines(raw, config);
    };

    let value: Value = serde_json::from_str(span).map_err(|e| PipelineError::Parse {
        step: Step::GraphGeneration,
        message: e.to_string(),
        raw: raw.to_string(),
    })?;

    Ok(Graph::from_value(value)?)
}

fn graph_from_triple_lines(raw: &str, config: &PipelineConfig) -> Result<Graph, PipelineError> {
    let extraction_failed = || PipelineError::Extraction {
        step: Step::GraphGeneration,
        raw: raw.to_string(),
    };

    if !config.accept_triple_lines {
        return Err(extraction_failed());
    }

    tracing::debug!("no JSON object in graph output, trying triple lines");
    let graph = parse_triple_lines(raw)?;
    if graph.edge_count() == 0 {
        return Err(extraction_failed());
    }
    Ok(graph)
}
