//! In-memory thought graph: typed nodes, labeled weighted edges.
//!
//! A graph is built empty, populated through `add_node` / `add_edge` (or the
//! name-keyed `connect`), validated once, then used read-only. Nodes and edges
//! live in id-keyed `BTreeMap`s, so every iteration order in this module is
//! id order.
//!
//! Structural invariants are enforced on insertion:
//! - node ids and edge ids are unique
//! - every edge endpoint names an existing node
//!
//! Everything else (tag vocabularies, weight range) is checked by
//! [`Graph::validate`], which reports instead of failing.

use crate::error::{ElementKind, GraphError};
use crate::schema::{NodeType, RelationKind};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Weight assigned to edges whose document omits one.
pub const DEFAULT_EDGE_WEIGHT: f64 = 0.5;

/// Type tag for nodes created without one. Not part of the closed vocabulary,
/// so validation reports such nodes.
pub const UNTYPED_NODE_TAG: &str = "概念";

// ============================================================================
// Elements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(default = "untyped_tag")]
    pub ntype: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attrs: BTreeMap<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, ntype: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ntype: ntype.into(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// The recognized type, if the tag belongs to the vocabulary.
    pub fn node_type(&self) -> Option<NodeType> {
        NodeType::from_tag(&self.ntype)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relation: String,
    #[serde(default = "default_weight", deserialize_with = "number_or_numeric_string")]
    pub weight: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conditions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evidence: Vec<String>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        relation: impl Into<String>,
        target: impl Into<String>,
        weight: f64,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            relation: relation.into(),
            weight,
            conditions: Vec::new(),
            evidence: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence.push(evidence.into());
        self
    }

    pub fn relation_kind(&self) -> Option<RelationKind> {
        RelationKind::from_tag(&self.relation)
    }
}

fn untyped_tag() -> String {
    UNTYPED_NODE_TAG.to_string()
}

fn default_weight() -> f64 {
    DEFAULT_EDGE_WEIGHT
}

/// Serde helper: treat an explicit `null` like a missing field. Models emit
/// `null` for empty lists about as often as they omit the field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serde helper: a finite number, given either as a JSON number or as a
/// numeric string (`"0.8"`).
pub fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Value(f64),
        Text(String),
    }

    let value = match Number::deserialize(deserializer)? {
        Number::Value(v) => v,
        Number::Text(text) => text.trim().parse::<f64>().map_err(|_| {
            D::Error::custom(format!("expected a number or numeric string, got {text:?}"))
        })?,
    };
    if !value.is_finite() {
        return Err(D::Error::custom(format!("expected a finite number, got {value}")));
    }
    Ok(value)
}

// ============================================================================
// Wire document
// ============================================================================

/// JSON shape of a graph: `{"nodes": [...], "edges": [...]}`. Both arrays
/// may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

// ============================================================================
// Validation report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationProblem {
    UnknownNodeType {
        node_id: String,
        name: String,
        ntype: String,
    },
    UnknownRelation {
        edge_id: String,
        relation: String,
    },
    DanglingReference {
        edge_id: String,
        source: String,
        target: String,
    },
    WeightOutOfRange {
        edge_id: String,
        weight: f64,
    },
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationProblem::UnknownNodeType {
                node_id,
                name,
                ntype,
            } => write!(f, "unrecognized node type: {node_id}({name}) -> {ntype}"),
            ValidationProblem::UnknownRelation { edge_id, relation } => {
                write!(f, "unrecognized relation: {edge_id} -> {relation}")
            }
            ValidationProblem::DanglingReference {
                edge_id,
                source,
                target,
            } => write!(f, "edge references unknown node: {edge_id} {source}->{target}"),
            ValidationProblem::WeightOutOfRange { edge_id, weight } => {
                write!(f, "edge weight outside [0, 1]: {edge_id} -> {weight}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub problems: Vec<ValidationProblem>,
    pub summary: GraphSummary,
}

// ============================================================================
// Graph
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "GraphDocument", try_from = "GraphDocument")]
pub struct Graph {
    nodes: BTreeMap<String, Node>,
    edges: BTreeMap<String, Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateId {
                kind: ElementKind::Node,
                id: node.id,
            });
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Insert an edge. On failure the graph is left untouched.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if self.edges.contains_key(&edge.id) {
            return Err(GraphError::DuplicateId {
                kind: ElementKind::Edge,
                id: edge.id,
            });
        }
        for endpoint in [&edge.source, &edge.target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(GraphError::DanglingReference {
                    edge_id: edge.id.clone(),
                    missing: endpoint.clone(),
                });
            }
        }
        self.edges.insert(edge.id.clone(), edge);
        Ok(())
    }

    /// Name-keyed construction: endpoints are looked up by display name and
    /// created untyped (id = name) when absent. Returns the generated edge id.
    pub fn connect(
        &mut self,
        source_name: &str,
        relation: &str,
        target_name: &str,
        weight: f64,
    ) -> Result<String, GraphError> {
        let edge_id = self.next_edge_id();
        self.connect_with_id(&edge_id, source_name, relation, target_name, weight)?;
        Ok(edge_id)
    }

    pub fn connect_with_id(
        &mut self,
        edge_id: &str,
        source_name: &str,
        relation: &str,
        target_name: &str,
        weight: f64,
    ) -> Result<(), GraphError> {
        if self.edges.contains_key(edge_id) {
            return Err(GraphError::DuplicateId {
                kind: ElementKind::Edge,
                id: edge_id.to_string(),
            });
        }
        let source = self.ensure_named_node(source_name);
        let target = self.ensure_named_node(target_name);
        self.add_edge(Edge::new(edge_id, source, relation.trim(), target, weight))
    }

    fn ensure_named_node(&mut self, name: &str) -> String {
        let name = name.trim();
        if let Some(node) = self.node_by_name(name) {
            return node.id.clone();
        }

        let mut id = name.to_string();
        let mut suffix = 2;
        while self.nodes.contains_key(&id) {
            id = format!("{name}#{suffix}");
            suffix += 1;
        }
        self.nodes
            .insert(id.clone(), Node::new(id.clone(), name, UNTYPED_NODE_TAG));
        id
    }

    fn next_edge_id(&self) -> String {
        let mut n = self.edges.len() + 1;
        loop {
            let id = format!("e{n}");
            if !self.edges.contains_key(&id) {
                return id;
            }
            n += 1;
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node (in id order) whose display name is exactly `name`.
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        let name = name.trim();
        self.nodes.values().find(|n| n.name == name)
    }

    /// Edges with an endpoint whose display name equals `name`, ignoring case.
    pub fn related_edges(&self, name: &str) -> Vec<&Edge> {
        let wanted = name.trim().to_lowercase();
        self.edges
            .values()
            .filter(|e| {
                [&e.source, &e.target].into_iter().any(|id| {
                    self.nodes
                        .get(id)
                        .is_some_and(|n| n.name.to_lowercase() == wanted)
                })
            })
            .collect()
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
        }
    }

    /// Check tags, endpoints and weights. Never fails and never mutates.
    pub fn validate(&self) -> ValidationReport {
        let mut problems = Vec::new();

        for node in self.nodes.values() {
            if node.node_type().is_none() {
                problems.push(ValidationProblem::UnknownNodeType {
                    node_id: node.id.clone(),
                    name: node.name.clone(),
                    ntype: node.ntype.clone(),
                });
            }
        }

        for edge in self.edges.values() {
            if edge.relation_kind().is_none() {
                problems.push(ValidationProblem::UnknownRelation {
                    edge_id: edge.id.clone(),
                    relation: edge.relation.clone(),
                });
            }
            if !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target) {
                problems.push(ValidationProblem::DanglingReference {
                    edge_id: edge.id.clone(),
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                });
            }
            if !(0.0..=1.0).contains(&edge.weight) {
                problems.push(ValidationProblem::WeightOutOfRange {
                    edge_id: edge.id.clone(),
                    weight: edge.weight,
                });
            }
        }

        ValidationReport {
            valid: problems.is_empty(),
            problems,
            summary: self.summary(),
        }
    }

    /// `(e1) Python -[需要, weight=0.9]-> 数据分析师`
    pub fn format_triple(&self, edge: &Edge) -> String {
        let source = self.display_name(&edge.source);
        let target = self.display_name(&edge.target);
        format!(
            "({}) {} -[{}, weight={}]-> {}",
            edge.id, source, edge.relation, edge.weight, target
        )
    }

    /// One compact triple per edge, in edge id order.
    pub fn to_compact_triples(&self) -> Vec<String> {
        self.edges.values().map(|e| self.format_triple(e)).collect()
    }

    pub fn display_name<'a>(&'a self, node_id: &'a str) -> &'a str {
        self.nodes
            .get(node_id)
            .map(|n| n.name.as_str())
            .unwrap_or(node_id)
    }

    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, GraphError> {
        serde_json::to_string(&self.to_document()).map_err(|e| GraphError::schema(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, GraphError> {
        serde_json::to_string_pretty(&self.to_document())
            .map_err(|e| GraphError::schema(e.to_string()))
    }

    /// Parse a graph document. Structural problems (missing fields, duplicate
    /// ids, edges to unknown nodes) are errors.
    pub fn parse(text: &str) -> Result<Self, GraphError> {
        let document: GraphDocument =
            serde_json::from_str(text).map_err(|e| GraphError::schema(e.to_string()))?;
        Self::try_from(document)
    }

    pub fn from_value(value: Value) -> Result<Self, GraphError> {
        let document: GraphDocument =
            serde_json::from_value(value).map_err(|e| GraphError::schema(e.to_string()))?;
        Self::try_from(document)
    }
}

impl TryFrom<GraphDocument> for Graph {
    type Error = GraphError;

    fn try_from(document: GraphDocument) -> Result<Self, Self::Error> {
        let mut graph = Graph::new();
        for node in document.nodes {
            graph.add_node(node)?;
        }
        for edge in document.edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }
}

impl From<Graph> for GraphDocument {
    fn from(graph: Graph) -> Self {
        GraphDocument {
            nodes: graph.nodes.into_values().collect(),
            edges: graph.edges.into_values().collect(),
        }
    }
}
