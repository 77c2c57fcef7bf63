//! Prompt text for the two completion passes.
//!
//! Vocabulary lists are rendered from `thoughtgraph_core::schema` so the
//! prompt and the validator can never disagree about allowed tags.

use thoughtgraph_core::{NodeType, RelationKind};

/// Rendered in place of the triple listing when the selector picked no edges.
pub const EMPTY_CONTEXT_PLACEHOLDER: &str = "（图中没有相关关系）";

fn quoted_list(labels: &[&str]) -> String {
    let items: Vec<String> = labels.iter().map(|l| format!("\"{l}\"")).collect();
    format!("[{}]", items.join(","))
}

/// First pass: declare the graph schema and demand JSON only.
pub fn graph_system_prompt() -> String {
    format!(
        "你是职业规划领域的推理助手。请把你对问题的推理过程整理成一张“思维图”。\n\
         \n\
         输出格式（只输出这一个 JSON 对象，不要加代码块标记，也不要任何解释）：\n\
         {{\n\
         \x20 \"nodes\": [{{\"id\": \"n1\", \"name\": \"数据分析师\", \"ntype\": \"岗位\", \"attrs\": {{\"level\": \"junior\"}}}}],\n\
         \x20 \"edges\": [{{\"id\": \"e1\", \"source\": \"n2\", \"relation\": \"需要\", \"target\": \"n1\", \"weight\": 0.9,\n\
         \x20            \"conditions\": [\"岗位要求中必备\"], \"evidence\": [\"招聘JD常见要求\"]}}]\n\
         }}\n\
         \n\
         规则：\n\
         - ntype 只能取 {node_types}\n\
         - relation 只能取 {relations}\n\
         - 建议 8 到 14 个节点、10 到 20 条边\n\
         - 每条边的 source 和 target 必须是已声明节点的 id\n\
         - weight 取 0 到 1 之间的小数，越重要越大\n\
         - 优先给出可执行的行动、资源、技能节点",
        node_types = quoted_list(&NodeType::labels()),
        relations = quoted_list(&RelationKind::labels()),
    )
}

pub fn graph_user_prompt(question: &str) -> String {
    format!("请围绕下面的问题构建思维图。\n问题：{question}")
}

/// Second pass: answer from the supplied triples and nothing else.
pub fn answer_system_prompt() -> String {
    format!(
        "你是职业顾问。你会收到一组思维图三元组，回答必须完全基于这些三元组，\
         不得引入图中不存在的关系。如果三元组为“{EMPTY_CONTEXT_PLACEHOLDER}”或不足以回答，\
         请在 missing_info 中写明缺少哪些信息。\n\
         \n\
         只输出一个 JSON 对象，字段如下：\n\
         {{\n\
         \x20 \"final_answer\": \"分条给出的具体建议，包括短板、补齐路径和分阶段行动计划\",\n\
         \x20 \"used_nodes\": [\"回答中用到的节点 id\"],\n\
         \x20 \"used_edges\": [\"回答中用到的边 id\"],\n\
         \x20 \"risks\": [\"2 到 4 个主要风险\"],\n\
         \x20 \"missing_info\": [\"仍然缺少的关键信息，例如地区、期望薪资、时间安排\"]\n\
         }}"
    )
}

/// `triples` is the rendered listing (or the placeholder); `legend` maps the
/// node ids appearing in it to their names so the model can cite ids.
pub fn answer_user_prompt(question: &str, triples: &str, legend: &str) -> String {
    let mut prompt = format!("问题：{question}\n\n思维图（紧凑三元组）：\n{triples}\n");
    if !legend.is_empty() {
        prompt.push_str("\n节点 id 对照：\n");
        prompt.push_str(legend);
        prompt.push('\n');
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_prompt_lists_full_vocabulary() {
        let prompt = graph_system_prompt();
        for nt in NodeType::ALL {
            assert!(prompt.contains(nt.label()), "{}", nt.label());
        }
        for rel in RelationKind::ALL {
            assert!(prompt.contains(rel.label()), "{}", rel.label());
        }
        assert!(prompt.contains("8 到 14"));
    }

    #[test]
    fn test_answer_prompts_embed_inputs() {
        let user = answer_user_prompt("怎么转行？", "(e1) A -[需要, weight=0.5]-> B", "n1 = A");
        assert!(user.contains("怎么转行？"));
        assert!(user.contains("(e1) A -[需要, weight=0.5]-> B"));
        assert!(user.contains("n1 = A"));

        let bare = answer_user_prompt("q", EMPTY_CONTEXT_PLACEHOLDER, "");
        assert!(!bare.contains("节点 id 对照"));

        assert!(answer_system_prompt().contains("final_answer"));
    }
}
