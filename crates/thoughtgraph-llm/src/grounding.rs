//! Second pass: answer the question using only the graph.
//!
//! An [`EdgeSelector`] decides which edges become context. The selected edges
//! are rendered as compact triples plus a legend mapping the node ids they
//! touch to display names, so the model can cite ids it never saw in a triple.

use crate::client::CompletionClient;
use crate::error::{PipelineError, Step};
use crate::prompts;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use thoughtgraph_core::{
    null_as_default, parse_json_object, Edge, ExtractionMode, Graph, JsonExtractError,
};

// ============================================================================
// Edge selection
// ============================================================================

/// Picks the edges that are relevant to a question.
pub trait EdgeSelector {
    fn select<'g>(&self, graph: &'g Graph, question: &str) -> Vec<&'g Edge>;
}

/// Every edge, in id order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullGraph;

impl EdgeSelector for FullGraph {
    fn select<'g>(&self, graph: &'g Graph, _question: &str) -> Vec<&'g Edge> {
        graph.edges().collect()
    }
}

/// Edges with an endpoint whose display name occurs in the question,
/// ignoring case.
///
/// Purely lexical: a question that paraphrases a node name ("程序员" vs
/// "软件工程师") selects nothing for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionMentions;

impl EdgeSelector for QuestionMentions {
    fn select<'g>(&self, graph: &'g Graph, question: &str) -> Vec<&'g Edge> {
        let question = question.to_lowercase();
        let mentioned = |node_id: &str| {
            graph.node(node_id).is_some_and(|n| {
                let name = n.name.trim();
                !name.is_empty() && question.contains(&name.to_lowercase())
            })
        };
        graph
            .edges()
            .filter(|e| mentioned(&e.source) || mentioned(&e.target))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextStrategy {
    #[default]
    FullGraph,
    QuestionMentions,
}

impl EdgeSelector for ContextStrategy {
    fn select<'g>(&self, graph: &'g Graph, question: &str) -> Vec<&'g Edge> {
        match self {
            ContextStrategy::FullGraph => FullGraph.select(graph, question),
            ContextStrategy::QuestionMentions => QuestionMentions.select(graph, question),
        }
    }
}

// ============================================================================
// Context rendering
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundingContext {
    pub triples: Vec<String>,
    /// `id = name` for every node touched by the selected edges, in id order.
    pub legend: Vec<String>,
}

impl GroundingContext {
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn triples_text(&self) -> String {
        if self.triples.is_empty() {
            prompts::EMPTY_CONTEXT_PLACEHOLDER.to_string()
        } else {
            self.triples.join("\n")
        }
    }

    pub fn legend_text(&self) -> String {
        self.legend.join("\n")
    }
}

pub fn build_context(graph: &Graph, question: &str, selector: &dyn EdgeSelector) -> GroundingContext {
    let edges = selector.select(graph, question);

    let node_ids: BTreeSet<&str> = edges
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .collect();

    GroundingContext {
        triples: edges.iter().map(|e| graph.format_triple(e)).collect(),
        legend: node_ids
            .into_iter()
            .map(|id| format!("{id} = {}", graph.display_name(id)))
            .collect(),
    }
}

// ============================================================================
// Answer
// ============================================================================

/// Structured reply of the answer pass. Only `final_answer` is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    #[serde(deserialize_with = "answer_text")]
    pub final_answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used_nodes: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used_edges: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risks: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub missing_info: Vec<String>,
}

impl AnswerResult {
    pub fn new(final_answer: impl Into<String>) -> Self {
        Self {
            final_answer: final_answer.into(),
            ..Self::default()
        }
    }

    pub fn citing_nodes<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.used_nodes.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn citing_edges<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.used_edges.extend(ids.into_iter().map(Into::into));
        self
    }
}

/// Models asked for an itemized answer sometimes return a list of items.
fn answer_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        One(String),
        Items(Vec<String>),
    }

    Ok(match Text::deserialize(deserializer)? {
        Text::One(text) => text,
        Text::Items(items) => items.join("\n"),
    })
}

pub fn answer_with_graph<C: CompletionClient>(
    client: &C,
    question: &str,
    graph: &Graph,
) -> Result<AnswerResult, PipelineError> {
    answer_with_context(client, question, graph, &FullGraph, ExtractionMode::default())
}

pub fn answer_with_context<C: CompletionClient>(
    client: &C,
    question: &str,
    graph: &Graph,
    selector: &dyn EdgeSelector,
    extraction: ExtractionMode,
) -> Result<AnswerResult, PipelineError> {
    let context = build_context(graph, question, selector);
    if context.is_empty() && !graph.is_empty() {
        tracing::warn!(
            edges = graph.edge_count(),
            "no graph edges selected for the question; answering without context"
        );
    }

    let raw = client.complete(
        &prompts::answer_system_prompt(),
        &prompts::answer_user_prompt(question, &context.triples_text(), &context.legend_text()),
    )?;

    parse_answer(&raw, extraction)
}

pub fn parse_answer(raw: &str, extraction: ExtractionMode) -> Result<AnswerResult, PipelineError> {
    parse_json_object::<AnswerResult>(raw, extraction).map_err(|e| match e {
        JsonExtractError::NotFound => PipelineError::Extraction {
            step: Step::Answer,
            raw: raw.to_string(),
        },
        JsonExtractError::Invalid(message) => PipelineError::Parse {
            step: Step::Answer,
            message,
            raw: raw.to_string(),
        },
    })
}
