//! Thoughtgraph CLI
//!
//! - `ask`: run the two-pass pipeline against a chat-completions endpoint
//! - `validate`: check a saved graph document
//! - `triples`: print the compact triple listing of a graph
//! - `check`: run the coverage check offline on a saved graph + answer

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use thoughtgraph_core::ExtractionMode;
use thoughtgraph_llm::{
    build_context, check_consistency_with, ContextStrategy, CoverageConfig, EndpointMatch,
    HttpCompletionClient, LlmConfig, Pipeline, PipelineConfig,
};
use tracing_subscriber::EnvFilter;

mod input;
mod render;

#[derive(Parser)]
#[command(name = "thoughtgraph")]
#[command(
    author,
    version,
    about = "Thoughtgraph: graph-grounded answers to career-planning questions"
)]
struct Cli {
    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question: generate a thought graph, answer from it, check coverage.
    Ask {
        question: String,
        /// Write the full run (graph, answer, reports) as JSON
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print the run as JSON instead of text
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        endpoint: EndpointArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Validate a graph document (or a saved `ask --out` run). Exits 1 when it has problems.
    Validate {
        graph: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Print compact triples for a graph document.
    Triples {
        graph: PathBuf,
        /// Only edges touching nodes named in this question
        #[arg(short, long)]
        question: Option<String>,
    },

    /// Check an answer document against a graph. Either file may be a saved
    /// `ask --out` run. Exits 1 when the check fails.
    Check {
        graph: PathBuf,
        answer: PathBuf,
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        coverage: CoverageArgs,
    },
}

/// Overrides for the `THOUGHTGRAPH_*` environment.
#[derive(Args)]
struct EndpointArgs {
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    model: Option<String>,
    /// Request timeout in seconds (at least 1)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
}

#[derive(Args)]
struct PipelineArgs {
    #[arg(long, value_enum, default_value_t = ContextArg::Full)]
    context: ContextArg,
    #[arg(long, value_enum, default_value_t = ExtractionArg::Balanced)]
    extraction: ExtractionArg,
    /// Fail when the graph reply has no JSON object instead of reading triple lines
    #[arg(long)]
    no_triple_lines: bool,
    #[command(flatten)]
    coverage: CoverageArgs,
}

#[derive(Args)]
struct CoverageArgs {
    /// Number of heaviest edges the answer must cover
    #[arg(long, default_value_t = 3)]
    top_k: usize,
    /// Check every edge instead of the top K
    #[arg(long, conflicts_with = "top_k")]
    all_edges: bool,
    /// Require both endpoint names in the answer, not just one
    #[arg(long)]
    require_both: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ContextArg {
    /// Every edge of the graph
    Full,
    /// Edges touching nodes whose names appear in the question
    Mentions,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExtractionArg {
    Strict,
    Balanced,
    Greedy,
}

impl From<ContextArg> for ContextStrategy {
    fn from(arg: ContextArg) -> Self {
        match arg {
            ContextArg::Full => ContextStrategy::FullGraph,
            ContextArg::Mentions => ContextStrategy::QuestionMentions,
        }
    }
}

impl From<ExtractionArg> for ExtractionMode {
    fn from(arg: ExtractionArg) -> Self {
        match arg {
            ExtractionArg::Strict => ExtractionMode::Strict,
            ExtractionArg::Balanced => ExtractionMode::Balanced,
            ExtractionArg::Greedy => ExtractionMode::Greedy,
        }
    }
}

impl CoverageArgs {
    fn to_config(&self) -> CoverageConfig {
        CoverageConfig {
            top_k: (!self.all_edges).then_some(self.top_k),
            endpoint_match: if self.require_both {
                EndpointMatch::Both
            } else {
                EndpointMatch::Either
            },
        }
    }
}

impl PipelineArgs {
    fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            context: self.context.into(),
            extraction: self.extraction.into(),
            accept_triple_lines: !self.no_triple_lines,
            coverage: self.coverage.to_config(),
        }
    }
}

impl EndpointArgs {
    fn to_config(&self) -> Result<LlmConfig> {
        let mut config = LlmConfig::from_env()?;
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint);
        }
        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout_secs(secs);
        }
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "thoughtgraph=debug"
    } else {
        "thoughtgraph=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ok = match cli.command {
        Commands::Ask {
            question,
            out,
            json,
            endpoint,
            pipeline,
        } => cmd_ask(&question, out.as_ref(), json, &endpoint, &pipeline)?,
        Commands::Validate { graph, json } => cmd_validate(&graph, json)?,
        Commands::Triples { graph, question } => cmd_triples(&graph, question.as_deref())?,
        Commands::Check {
            graph,
            answer,
            json,
            coverage,
        } => cmd_check(&graph, &answer, json, &coverage)?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn cmd_ask(
    question: &str,
    out: Option<&PathBuf>,
    json: bool,
    endpoint: &EndpointArgs,
    pipeline: &PipelineArgs,
) -> Result<bool> {
    let llm_config = endpoint.to_config()?;
    tracing::debug!(config = ?llm_config, "completion endpoint");
    let client = HttpCompletionClient::new(llm_config)?;
    let config = pipeline.to_config();

    let run = Pipeline::with_config(client, config)
        .run(question)
        .context("pipeline run failed")?;

    if let Some(path) = out {
        fs::write(path, serde_json::to_string_pretty(&run)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("wrote {}", path.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
        return Ok(true);
    }

    render::print_validation(&run.validation);
    println!();
    render::print_triples(&run.graph, &build_context(&run.graph, question, &config.context));
    println!();
    render::print_answer(&run.answer);
    println!();
    render::print_coverage(&run.coverage);
    Ok(true)
}

fn cmd_validate(path: &PathBuf, json: bool) -> Result<bool> {
    let graph = input::read_graph(path)?;
    let report = graph.validate();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::print_validation(&report);
    }
    Ok(report.valid)
}

fn cmd_triples(path: &PathBuf, question: Option<&str>) -> Result<bool> {
    let graph = input::read_graph(path)?;
    let context = match question {
        Some(q) => build_context(&graph, q, &ContextStrategy::QuestionMentions),
        None => build_context(&graph, "", &ContextStrategy::FullGraph),
    };

    if context.is_empty() {
        println!("{}", context.triples_text());
    } else {
        for line in &context.triples {
            println!("{line}");
        }
    }
    Ok(true)
}

fn cmd_check(graph: &PathBuf, answer: &PathBuf, json: bool, coverage: &CoverageArgs) -> Result<bool> {
    let graph = input::read_graph(graph)?;
    let answer = input::read_answer(answer)?;
    let report = check_consistency_with(&graph, &answer, &coverage.to_config());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::print_coverage(&report);
    }
    Ok(report.passed)
}
