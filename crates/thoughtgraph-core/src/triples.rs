//! Line-oriented graph format: one `source -[relation]-> target` per line.
//!
//! Accepts the bare arrow form some models produce when they ignore the JSON
//! instruction, as well as the compact triple listing emitted by
//! [`Graph::to_compact_triples`]:
//!
//! ```text
//! 职业培训 -[提高]-> 就业竞争力
//! - (e3) 新能源行业 -[适配, weight=0.6]-> 数据分析师
//! ```
//!
//! Lines that do not match are ignored.

use crate::error::GraphError;
use crate::graph::{Graph, DEFAULT_EDGE_WEIGHT};
use regex::Regex;
use std::sync::OnceLock;

fn triple_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^\s*(?:[-*•]\s+|\d+[.)]\s+)?(?:\((?P<id>[^)\s]+)\)\s*)?(?P<source>.+?)\s*-\[\s*(?P<relation>[^\],]+?)\s*(?:,\s*(?:w|weight)\s*=\s*(?P<weight>[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*)?\]->\s*(?P<target>.+?)\s*$",
        )
        .expect("triple line pattern compiles")
    })
}

/// Build a name-keyed graph from triple lines. Explicit edge ids are kept
/// unless already taken; missing weights default to `DEFAULT_EDGE_WEIGHT`.
pub fn parse_triple_lines(text: &str) -> Result<Graph, GraphError> {
    let pattern = triple_line_pattern();
    let mut graph = Graph::new();

    for line in text.lines() {
        let Some(cap) = pattern.captures(line) else {
            continue;
        };

        let source = &cap["source"];
        let relation = &cap["relation"];
        let target = &cap["target"];
        let weight = cap
            .name("weight")
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|w| w.is_finite())
            .unwrap_or(DEFAULT_EDGE_WEIGHT);

        match cap.name("id").map(|m| m.as_str()) {
            Some(id) if graph.edge(id).is_none() => {
                graph.connect_with_id(id, source, relation, target, weight)?;
            }
            _ => {
                graph.connect(source, relation, target, weight)?;
            }
        }
    }

    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "parsed triple lines"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    #[test]
    fn test_parses_bare_arrow_lines() {
        let text = "\
下面是图谱：
大学毕业生 -[进入]-> 就业市场
技能匹配 -[决定]-> 就业机会
绿色能源 -[创造]-> 就业机会

以上。";
        let g = parse_triple_lines(text).unwrap();
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.node_count(), 5);

        let e1 = g.edge("e1").unwrap();
        assert_eq!(e1.source, "大学毕业生");
        assert_eq!(e1.relation, "进入");
        assert_eq!(e1.target, "就业市场");
        assert_eq!(e1.weight, DEFAULT_EDGE_WEIGHT);
        assert_eq!(g.related_edges("就业机会").len(), 2);
    }

    #[test]
    fn test_parses_compact_triples_with_ids_and_weights() {
        let mut original = Graph::new();
        original.add_node(Node::new("n1", "数据分析师", "岗位")).unwrap();
        original.add_node(Node::new("n2", "Python", "技能")).unwrap();
        original
            .add_edge(Edge::new("e7", "n2", "需要", "n1", 0.9))
            .unwrap();

        let listing: String = original
            .to_compact_triples()
            .iter()
            .map(|t| format!("- {t}\n"))
            .collect();
        let g = parse_triple_lines(&listing).unwrap();

        let e = g.edge("e7").unwrap();
        assert_eq!(e.relation, "需要");
        assert_eq!(e.weight, 0.9);
        assert_eq!(g.display_name(&e.source), "Python");
        assert_eq!(g.display_name(&e.target), "数据分析师");
    }

    #[test]
    fn test_repeated_explicit_id_gets_fresh_id() {
        let text = "(e1) A -[需要]-> B\n(e1) B -[需要]-> C";
        let g = parse_triple_lines(text).unwrap();
        assert_eq!(g.edge_count(), 2);
        assert!(g.edge("e1").is_some());
        assert!(g.edge("e2").is_some());
    }

    #[test]
    fn test_overflowing_weight_falls_back_to_default() {
        let g = parse_triple_lines("A -[需要, weight=1e999]-> B").unwrap();
        assert_eq!(g.edge("e1").unwrap().weight, DEFAULT_EDGE_WEIGHT);

        let reloaded = Graph::parse(&g.to_json().unwrap()).unwrap();
        assert_eq!(reloaded, g);
    }

    #[test]
    fn test_non_matching_text_yields_empty_graph() {
        let g = parse_triple_lines("I cannot help with that.").unwrap();
        assert!(g.is_empty());
        assert_eq!(g.edge_count(), 0);
    }
}
