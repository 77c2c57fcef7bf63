//! Subcommands run through the built binary. `ask` talks to a local mock server.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use mockito::Matcher;
use serde_json::json;
use tempfile::TempDir;

fn thoughtgraph_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_thoughtgraph"))
}

fn run(args: &[&str]) -> Output {
    Command::new(thoughtgraph_bin())
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("run thoughtgraph")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path_str(&path)
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

const GRAPH: &str = r#"模型输出如下：
{
  "nodes": [
    {"id": "n1", "name": "数据分析师", "ntype": "岗位"},
    {"id": "n2", "name": "Python", "ntype": "技能"},
    {"id": "n3", "name": "在线课程", "ntype": "资源"}
  ],
  "edges": [
    {"id": "e1", "source": "n1", "relation": "需要", "target": "n2", "weight": 0.9},
    {"id": "e2", "source": "n3", "relation": "提升", "target": "n2", "weight": 0.7}
  ]
}"#;

#[test]
fn validate_clean_graph_exits_zero() {
    let dir = TempDir::new().unwrap();
    let graph = write(&dir, "graph.txt", GRAPH);

    let output = run(&["validate", &graph]);

    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("valid"));
    assert!(stdout(&output).contains("nodes: 3  edges: 2"));
}

#[test]
fn validate_problem_graph_exits_one() {
    let dir = TempDir::new().unwrap();
    let graph = write(
        &dir,
        "graph.json",
        r#"{"nodes":[{"id":"a","name":"A","ntype":"技能"},{"id":"b","name":"B","ntype":"岗位"}],
            "edges":[{"id":"e1","source":"a","target":"b","relation":"需要","weight":1.5}]}"#,
    );

    let output = run(&["validate", &graph, "--json"]);

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["problems"][0]["kind"], "weight_out_of_range");
}

#[test]
fn validate_dangling_edge_is_an_error() {
    let dir = TempDir::new().unwrap();
    let graph = write(
        &dir,
        "graph.json",
        r#"{"nodes":[{"id":"a","name":"A"}],"edges":[{"id":"e1","source":"a","target":"zz","relation":"需要"}]}"#,
    );

    let output = run(&["validate", &graph]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("zz"));
}

#[test]
fn triples_lists_edges_in_id_order() {
    let dir = TempDir::new().unwrap();
    let graph = write(&dir, "graph.json", GRAPH);

    let output = run(&["triples", &graph]);

    assert!(output.status.success());
    assert_eq!(
        stdout(&output).lines().collect::<Vec<_>>(),
        vec![
            "(e1) 数据分析师 -[需要, weight=0.9]-> Python",
            "(e2) 在线课程 -[提升, weight=0.7]-> Python",
        ]
    );
}

#[test]
fn triples_filtered_by_question() {
    let dir = TempDir::new().unwrap();
    let graph = write(&dir, "graph.json", GRAPH);

    let output = run(&["triples", &graph, "--question", "有哪些在线课程推荐？"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("(e2)"));
    assert!(!text.contains("(e1)"));
}

#[test]
fn check_passes_and_fails() {
    let dir = TempDir::new().unwrap();
    let graph = write(&dir, "graph.json", GRAPH);
    let good = write(
        &dir,
        "good.json",
        r#"{"final_answer": "先学 Python", "used_nodes": ["n2"], "used_edges": ["e1"]}"#,
    );
    let bad = write(
        &dir,
        "bad.json",
        r#"{"final_answer": "先学 Python", "used_nodes": ["n99"], "used_edges": []}"#,
    );

    let output = run(&["check", &graph, &good]);
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("pass"));

    let output = run(&["check", &graph, &bad, "--json"]);
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["passed"], false);
    assert_eq!(report["problems"][0]["id"], "n99");
}

#[test]
fn check_require_both_is_stricter() {
    let dir = TempDir::new().unwrap();
    let graph = write(&dir, "graph.json", GRAPH);
    let answer = write(&dir, "answer.json", r#"{"final_answer": "先学 Python"}"#);

    assert!(run(&["check", &graph, &answer]).status.success());
    assert_eq!(
        run(&["check", &graph, &answer, "--require-both"]).status.code(),
        Some(1)
    );
}

#[test]
fn ask_without_api_key_fails() {
    let output = Command::new(thoughtgraph_bin())
        .args(["ask", "怎么转行？"])
        .env_remove("THOUGHTGRAPH_API_KEY")
        .output()
        .expect("run thoughtgraph");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("THOUGHTGRAPH_API_KEY"));
}

#[test]
fn ask_rejects_zero_timeout() {
    let output = run(&["ask", "怎么转行？", "--timeout-secs", "0"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--timeout-secs"));
}

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

fn completion_body(content: &str) -> String {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]}).to_string()
}

#[test]
fn ask_writes_run_that_validates_and_checks() {
    let mut server = mockito::Server::new();
    let graph_mock = server
        .mock("POST", COMPLETIONS_PATH)
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::Regex("构建思维图".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(GRAPH))
        .expect(1)
        .create();
    let answer_mock = server
        .mock("POST", COMPLETIONS_PATH)
        .match_body(Matcher::Regex("紧凑三元组".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(
            r#"{"final_answer": "先把 Python 学扎实，再用在线课程补足。", "used_nodes": ["n1", "n2"], "used_edges": ["e1"]}"#,
        ))
        .expect(1)
        .create();

    let dir = TempDir::new().unwrap();
    let run_path = path_str(&dir.path().join("run.json"));

    let output = Command::new(thoughtgraph_bin())
        .args(["ask", "如何成为数据分析师？", "--out", &run_path])
        .env("NO_COLOR", "1")
        .env("THOUGHTGRAPH_API_KEY", "sk-test")
        .env("THOUGHTGRAPH_ENDPOINT", format!("{}{COMPLETIONS_PATH}", server.url()))
        .env_remove("THOUGHTGRAPH_MODEL")
        .env_remove("THOUGHTGRAPH_TIMEOUT_SECS")
        .env_remove("RUST_LOG")
        .output()
        .expect("run thoughtgraph");

    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    graph_mock.assert();
    answer_mock.assert();

    let out = stdout(&output);
    assert!(out.contains("== answer =="));
    assert!(out.contains("先把 Python 学扎实"));
    assert!(out.contains("== coverage =="));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&run_path).unwrap()).unwrap();
    assert!(saved["run_id"].is_string());
    assert_eq!(saved["graph"]["nodes"].as_array().map(Vec::len), Some(3));
    assert_eq!(saved["coverage"]["passed"], true);

    let validated = run(&["validate", &run_path]);
    assert!(validated.status.success(), "{}", stdout(&validated));
    assert!(stdout(&validated).contains("nodes: 3  edges: 2"));

    let checked = run(&["check", &run_path, &run_path]);
    assert!(checked.status.success(), "{}", stdout(&checked));
}
