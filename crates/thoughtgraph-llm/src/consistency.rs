//! Textual cross-check of an answer against its graph.
//!
//! Two checks, both reported rather than raised:
//! - every cited node/edge id exists in the graph
//! - the answer text names an endpoint of each of the heaviest edges
//!
//! Matching is case-insensitive substring presence. It is a linting signal
//! for prompt iteration and says nothing about whether the answer is right.

use crate::grounding::AnswerResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thoughtgraph_core::{Edge, Graph};

pub const DEFAULT_TOP_K: usize = 3;

pub const COVERAGE_RECOMMENDATION: &str =
    "若存在未覆盖的高权重关系，请在答案中补充与之相关的建议或行动项；若存在不存在的引用，请核对 used_nodes / used_edges。";

/// How many endpoints of a top edge the answer must mention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointMatch {
    #[default]
    Either,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// `None` checks every edge.
    pub top_k: Option<usize>,
    pub endpoint_match: EndpointMatch,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            top_k: Some(DEFAULT_TOP_K),
            endpoint_match: EndpointMatch::Either,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CoverageProblem {
    DanglingNode(String),
    DanglingEdge(String),
}

impl fmt::Display for CoverageProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageProblem::DanglingNode(id) => write!(f, "answer cites unknown node id: {id}"),
            CoverageProblem::DanglingEdge(id) => write!(f, "answer cites unknown edge id: {id}"),
        }
    }
}

/// A heavy edge the answer text does not talk about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissedRelation {
    pub edge_id: String,
    pub source: String,
    pub relation: String,
    pub target: String,
    pub weight: f64,
}

impl fmt::Display for MissedRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -[{}]-> {}",
            self.edge_id, self.source, self.relation, self.target
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub passed: bool,
    pub problems: Vec<CoverageProblem>,
    pub missed: Vec<MissedRelation>,
    /// Ids of the edges the coverage check looked at, heaviest first.
    pub checked_edges: Vec<String>,
    pub recommendation: Option<String>,
}

/// The `k` heaviest edges: weight descending, ties by edge id ascending.
pub fn top_k_edges(graph: &Graph, k: usize) -> Vec<&Edge> {
    let mut edges: Vec<&Edge> = graph.edges().collect();
    edges.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    edges.truncate(k);
    edges
}

pub fn check_consistency(graph: &Graph, answer: &AnswerResult) -> CoverageReport {
    check_consistency_with(graph, answer, &CoverageConfig::default())
}

pub fn check_consistency_with(
    graph: &Graph,
    answer: &AnswerResult,
    config: &CoverageConfig,
) -> CoverageReport {
    let mut problems = Vec::new();
    for id in &answer.used_nodes {
        if graph.node(id).is_none() {
            problems.push(CoverageProblem::DanglingNode(id.clone()));
        }
    }
    for id in &answer.used_edges {
        if graph.edge(id).is_none() {
            problems.push(CoverageProblem::DanglingEdge(id.clone()));
        }
    }

    let candidates = match config.top_k {
        Some(k) => top_k_edges(graph, k),
        None => top_k_edges(graph, graph.edge_count()),
    };

    let text = answer.final_answer.to_lowercase();
    let mentions = |name: &str| {
        let name = name.trim();
        !name.is_empty() && text.contains(&name.to_lowercase())
    };

    let mut missed = Vec::new();
    for edge in &candidates {
        let source = graph.display_name(&edge.source);
        let target = graph.display_name(&edge.target);
        let covered = match config.endpoint_match {
            EndpointMatch::Either => mentions(source) || mentions(target),
            EndpointMatch::Both => mentions(source) && mentions(target),
        };
        if !covered {
            missed.push(MissedRelation {
                edge_id: edge.id.clone(),
                source: source.to_string(),
                relation: edge.relation.clone(),
                target: target.to_string(),
                weight: edge.weight,
            });
        }
    }

    for problem in &problems {
        tracing::warn!(%problem, "dangling citation");
    }
    for relation in &missed {
        tracing::warn!(%relation, "important relation not covered");
    }

    let passed = problems.is_empty() && missed.is_empty();
    CoverageReport {
        passed,
        problems,
        missed,
        checked_edges: candidates.iter().map(|e| e.id.clone()).collect(),
        recommendation: (!passed).then(|| COVERAGE_RECOMMENDATION.to_string()),
    }
}
