//! Thoughtgraph core: the graph a model externalizes its reasoning into.
//!
//! This crate owns everything that does not talk to a model:
//! - the closed node-type / relation vocabularies (`schema`)
//! - the id-keyed graph with its insertion invariants and validation report (`graph`)
//! - recovery of JSON objects from free-form model output (`extract`)
//! - the line-oriented `source -[relation]-> target` format (`triples`)
//!
//! Structural problems are errors (`GraphError`); content-quality problems are
//! data (`ValidationProblem`) so a partially valid graph can still be used.

pub mod error;
pub mod extract;
pub mod graph;
pub mod schema;
pub mod triples;

pub use error::{ElementKind, GraphError};
pub use extract::{
    extract_first_json, extract_json_object, parse_json_object, ExtractionMode, JsonExtractError,
};
pub use graph::{
    null_as_default, number_or_numeric_string, Edge, Graph, GraphDocument, GraphSummary, Node,
    ValidationProblem, ValidationReport, DEFAULT_EDGE_WEIGHT, UNTYPED_NODE_TAG,
};
pub use schema::{NodeType, RelationKind};
pub use triples::parse_triple_lines;
