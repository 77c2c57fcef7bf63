//! Human-readable terminal output.

use colored::Colorize;
use thoughtgraph_core::{Graph, ValidationReport};
use thoughtgraph_llm::{AnswerResult, CoverageReport, GroundingContext};

fn heading(title: &str) {
    println!("{}", format!("== {title} ==").cyan().bold());
}

pub fn print_validation(report: &ValidationReport) {
    heading("graph");
    println!(
        "nodes: {}  edges: {}",
        report.summary.nodes, report.summary.edges
    );
    if report.valid {
        println!("{}", "valid".green().bold());
        return;
    }
    println!(
        "{} ({} problems)",
        "invalid".red().bold(),
        report.problems.len()
    );
    for problem in &report.problems {
        println!("  {} {problem}", "-".yellow());
    }
}

pub fn print_triples(graph: &Graph, context: &GroundingContext) {
    heading("triples");
    if context.is_empty() {
        println!("{}", context.triples_text().dimmed());
        return;
    }
    for line in &context.triples {
        println!("{line}");
    }
    if context.triples.len() < graph.edge_count() {
        println!(
            "{}",
            format!("({} of {} edges)", context.triples.len(), graph.edge_count()).dimmed()
        );
    }
}

pub fn print_answer(answer: &AnswerResult) {
    heading("answer");
    println!("{}", answer.final_answer);
    print_list("risks", &answer.risks);
    print_list("missing info", &answer.missing_info);
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!();
    println!("{}", label.bold());
    for item in items {
        println!("  - {item}");
    }
}

pub fn print_coverage(report: &CoverageReport) {
    heading("coverage");
    if report.passed {
        println!("{}", "pass".green().bold());
    } else {
        println!("{}", "fail".red().bold());
    }
    println!("checked: {}", report.checked_edges.join(", "));
    for problem in &report.problems {
        println!("  {} {problem}", "dangling:".yellow());
    }
    for missed in &report.missed {
        println!("  {} {missed}", "not covered:".yellow());
    }
    if let Some(recommendation) = &report.recommendation {
        println!("{} {recommendation}", "hint:".bold());
    }
}
