//! The full protocol: generate a graph, answer from it, check the answer.
//!
//! One run is two sequential completions. Each step is also usable on its
//! own (`generate_graph_with`, `answer_with_context`, `check_consistency_with`).

use crate::client::CompletionClient;
use crate::consistency::{check_consistency_with, CoverageConfig, CoverageReport};
use crate::error::PipelineError;
use crate::generation::generate_graph_with;
use crate::grounding::{answer_with_context, AnswerResult, ContextStrategy, EdgeSelector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thoughtgraph_core::{ExtractionMode, Graph, ValidationReport};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub context: ContextStrategy,
    pub extraction: ExtractionMode,
    /// Parse `A -[rel]-> B` lines when the graph reply holds no JSON object.
    pub accept_triple_lines: bool,
    pub coverage: CoverageConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            context: ContextStrategy::default(),
            extraction: ExtractionMode::default(),
            accept_triple_lines: true,
            coverage: CoverageConfig::default(),
        }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub question: String,
    pub graph: Graph,
    pub validation: ValidationReport,
    pub answer: AnswerResult,
    pub coverage: CoverageReport,
}

pub struct Pipeline<C> {
    client: C,
    config: PipelineConfig,
    selector: Option<Box<dyn EdgeSelector>>,
}

impl<C: CompletionClient> Pipeline<C> {
    pub fn new(client: C) -> Self {
        Self::with_config(client, PipelineConfig::default())
    }

    pub fn with_config(client: C, config: PipelineConfig) -> Self {
        Self {
            client,
            config,
            selector: None,
        }
    }

    /// Replace the configured `ContextStrategy` with a custom selector.
    pub fn with_selector(mut self, selector: impl EdgeSelector + 'static) -> Self {
        self.selector = Some(Box::new(selector));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn run(&self, question: &str) -> Result<PipelineRun, PipelineError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = tracing::info_span!("pipeline_run", %run_id);
        let _guard = span.enter();

        tracing::info!(question_chars = question.chars().count(), "starting run");

        let generated = generate_graph_with(&self.client, question, &self.config)?;

        let selector: &dyn EdgeSelector = match &self.selector {
            Some(custom) => custom.as_ref(),
            None => &self.config.context,
        };
        let answer = answer_with_context(
            &self.client,
            question,
            &generated.graph,
            selector,
            self.config.extraction,
        )?;

        let coverage = check_consistency_with(&generated.graph, &answer, &self.config.coverage);
        tracing::info!(
            passed = coverage.passed,
            problems = coverage.problems.len(),
            missed = coverage.missed.len(),
            "run finished"
        );

        Ok(PipelineRun {
            run_id,
            started_at,
            question: question.to_string(),
            graph: generated.graph,
            validation: generated.report,
            answer,
            coverage,
        })
    }
}
