//! Thoughtgraph LLM: graph-grounded two-pass prompting.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         PIPELINE RUN                             │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  question ──► graph prompt ──► LLM ──► extract ──► Graph         │
//! │                                                     │ validate   │
//! │                                                     ▼            │
//! │            ┌──────── EdgeSelector ◄──────────── Graph + report   │
//! │            ▼                                                     │
//! │  compact triples ──► answer prompt ──► LLM ──► AnswerResult      │
//! │                                                     │            │
//! │                                                     ▼            │
//! │                         consistency check ──► CoverageReport     │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The completion service is an injected [`CompletionClient`]:
//! [`HttpCompletionClient`] talks to an OpenAI-compatible chat endpoint,
//! [`MockCompletionClient`] replays scripted replies.
//!
//! ## Failure policy
//! - transport, extraction and structural parse failures abort the step
//!   ([`PipelineError`])
//! - validation problems, dangling citations and uncovered relations are
//!   reported and never abort

pub mod client;
pub mod config;
pub mod consistency;
pub mod error;
pub mod generation;
pub mod grounding;
pub mod pipeline;
pub mod prompts;

pub use client::{
    CompletionClient, CompletionError, HttpCompletionClient, MockCompletionClient, RecordedCall,
};
pub use config::{ConfigError, LlmConfig};
pub use consistency::{
    check_consistency, check_consistency_with, top_k_edges, CoverageConfig, CoverageProblem,
    CoverageReport, EndpointMatch, MissedRelation, COVERAGE_RECOMMENDATION,
};
pub use error::{PipelineError, Step};
pub use generation::{generate_graph, generate_graph_with, graph_from_output, GeneratedGraph};
pub use grounding::{
    answer_with_context, answer_with_graph, build_context, parse_answer, AnswerResult,
    ContextStrategy, EdgeSelector, FullGraph, GroundingContext, QuestionMentions,
};
pub use pipeline::{Pipeline, PipelineConfig, PipelineRun};
