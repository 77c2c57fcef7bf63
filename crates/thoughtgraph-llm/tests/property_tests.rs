//! Property-based tests for the coverage check.
//!
//! 1. Top-K selection is ordered, bounded and deterministic
//! 2. An answer naming every node passes when it cites nothing unknown
//! 3. Citing an unknown id always fails the report

use proptest::prelude::*;
use thoughtgraph_core::{Edge, Graph, Node};
use thoughtgraph_llm::{check_consistency, top_k_edges, AnswerResult, CoverageProblem};

// ============================================================================
// Strategies
// ============================================================================

/// Weights on a coarse grid so ties are frequent.
fn weight_strategy() -> impl Strategy<Value = f64> {
    (0u32..=10).prop_map(|w| w as f64 / 10.0)
}

fn graph_strategy() -> impl Strategy<Value = Graph> {
    (2usize..6).prop_flat_map(|n| {
        proptest::collection::vec((0..n, 0..n, weight_strategy()), 0..15).prop_map(move |edges| {
            let mut g = Graph::new();
            for i in 0..n {
                g.add_node(Node::new(format!("n{i}"), format!("节点{i}号"), "技能"))
                    .unwrap();
            }
            for (j, (s, t, w)) in edges.into_iter().enumerate() {
                g.add_edge(Edge::new(
                    format!("e{j:02}"),
                    format!("n{s}"),
                    "需要",
                    format!("n{t}"),
                    w,
                ))
                .unwrap();
            }
            g
        })
    })
}

fn all_names(graph: &Graph) -> String {
    graph
        .nodes()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join("，")
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn top_k_is_sorted_and_bounded(graph in graph_strategy(), k in 0usize..6) {
        let top = top_k_edges(&graph, k);

        prop_assert_eq!(top.len(), k.min(graph.edge_count()));
        for pair in top.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(a.weight > b.weight || (a.weight == b.weight && a.id < b.id));
        }

        // nothing left out is heavier than the lightest pick
        if let Some(last) = top.last() {
            for edge in graph.edges() {
                if !top.iter().any(|t| t.id == edge.id) {
                    prop_assert!(edge.weight <= last.weight);
                }
            }
        }
    }

    #[test]
    fn top_k_is_deterministic(graph in graph_strategy()) {
        let first: Vec<String> = top_k_edges(&graph, 3).iter().map(|e| e.id.clone()).collect();
        let second: Vec<String> = top_k_edges(&graph.clone(), 3).iter().map(|e| e.id.clone()).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn naming_every_node_passes(graph in graph_strategy()) {
        let answer = AnswerResult::new(all_names(&graph))
            .citing_nodes(graph.nodes().map(|n| n.id.clone()))
            .citing_edges(graph.edges().map(|e| e.id.clone()));

        let report = check_consistency(&graph, &answer);
        prop_assert!(report.passed, "{:?}", report);
        prop_assert!(report.recommendation.is_none());
    }

    #[test]
    fn unknown_citation_always_fails(graph in graph_strategy(), suffix in "[a-z]{1,4}") {
        let unknown = format!("missing-{suffix}");
        let answer = AnswerResult::new(all_names(&graph)).citing_edges([unknown.clone()]);

        let report = check_consistency(&graph, &answer);
        prop_assert!(!report.passed);
        prop_assert_eq!(report.problems, vec![CoverageProblem::DanglingEdge(unknown)]);
    }
}
