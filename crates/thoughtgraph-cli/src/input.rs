//! Loading graph and answer documents from disk.
//!
//! Files are often saved model replies, so the JSON object is extracted from
//! surrounding prose before the strict parse. A saved `ask --out` run is also
//! accepted: its `graph` or `answer` member is used.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use thoughtgraph_core::{extract_json_object, parse_triple_lines, ExtractionMode, Graph};
use thoughtgraph_llm::AnswerResult;

pub fn read_graph(path: &Path) -> Result<Graph> {
    let text = read_text(path)?;

    if let Some(value) = read_json_object(&text, path)? {
        return Graph::from_value(saved_run_member(value, "graph"))
            .with_context(|| format!("invalid graph in {}", path.display()));
    }

    let graph = parse_triple_lines(&text)
        .with_context(|| format!("invalid triple lines in {}", path.display()))?;
    if graph.edge_count() == 0 {
        return Err(anyhow!(
            "no graph JSON object or triple lines found in {}",
            path.display()
        ));
    }
    Ok(graph)
}

pub fn read_answer(path: &Path) -> Result<AnswerResult> {
    let text = read_text(path)?;
    let value = read_json_object(&text, path)?
        .ok_or_else(|| anyhow!("no answer JSON object found in {}", path.display()))?;
    serde_json::from_value(saved_run_member(value, "answer"))
        .with_context(|| format!("invalid answer in {}", path.display()))
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_json_object(text: &str, path: &Path) -> Result<Option<Value>> {
    let Some(span) = extract_json_object(text, ExtractionMode::Balanced) else {
        return Ok(None);
    };
    let value = serde_json::from_str(span)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    Ok(Some(value))
}

/// `run.graph` / `run.answer` when `value` is a saved run, else `value` itself.
fn saved_run_member(mut value: Value, member: &str) -> Value {
    let is_run = value.get("run_id").is_some() && value.get(member).is_some_and(Value::is_object);
    if is_run {
        value[member].take()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_saved_run_member_unwraps_runs_only() {
        let run = json!({"run_id": "r", "graph": {"nodes": []}, "answer": {"final_answer": "x"}});
        assert_eq!(saved_run_member(run.clone(), "graph"), json!({"nodes": []}));
        assert_eq!(saved_run_member(run, "answer"), json!({"final_answer": "x"}));

        let doc = json!({"nodes": [], "edges": []});
        assert_eq!(saved_run_member(doc.clone(), "graph"), doc);
    }
}
