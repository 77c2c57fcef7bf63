//! Closed vocabularies for node types and relation labels.
//!
//! Tags travel as plain strings on the wire so that an unrecognized tag can
//! survive parsing and be reported by validation. The canonical tag is the
//! Chinese label the generation prompt asks for; the English names are accepted
//! as aliases (`migrates_to`, `migrates-to` and `Migrates To` all resolve).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    Persona,
    Skill,
    Role,
    Industry,
    Constraint,
    Trend,
    Resource,
    Action,
    Outcome,
}

impl NodeType {
    pub const ALL: [NodeType; 9] = [
        NodeType::Persona,
        NodeType::Skill,
        NodeType::Role,
        NodeType::Industry,
        NodeType::Constraint,
        NodeType::Trend,
        NodeType::Resource,
        NodeType::Action,
        NodeType::Outcome,
    ];

    /// Canonical wire tag.
    pub fn label(self) -> &'static str {
        match self {
            NodeType::Persona => "人物画像",
            NodeType::Skill => "技能",
            NodeType::Role => "岗位",
            NodeType::Industry => "行业",
            NodeType::Constraint => "约束",
            NodeType::Trend => "趋势",
            NodeType::Resource => "资源",
            NodeType::Action => "行动",
            NodeType::Outcome => "成果",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeType::Persona => "persona",
            NodeType::Skill => "skill",
            NodeType::Role => "role",
            NodeType::Industry => "industry",
            NodeType::Constraint => "constraint",
            NodeType::Trend => "trend",
            NodeType::Resource => "resource",
            NodeType::Action => "action",
            NodeType::Outcome => "outcome",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        let alias = normalize_alias(tag);
        Self::ALL
            .into_iter()
            .find(|t| t.label() == tag || t.name() == alias)
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.label()).collect()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationKind {
    Requires,
    Improves,
    Causes,
    Promotes,
    Inhibits,
    MigratesTo,
    Fits,
    DependsOn,
    LocatedAt,
    Recommends,
}

impl RelationKind {
    pub const ALL: [RelationKind; 10] = [
        RelationKind::Requires,
        RelationKind::Improves,
        RelationKind::Causes,
        RelationKind::Promotes,
        RelationKind::Inhibits,
        RelationKind::MigratesTo,
        RelationKind::Fits,
        RelationKind::DependsOn,
        RelationKind::LocatedAt,
        RelationKind::Recommends,
    ];

    /// Canonical wire tag.
    pub fn label(self) -> &'static str {
        match self {
            RelationKind::Requires => "需要",
            RelationKind::Improves => "提升",
            RelationKind::Causes => "导致",
            RelationKind::Promotes => "促进",
            RelationKind::Inhibits => "抑制",
            RelationKind::MigratesTo => "迁移到",
            RelationKind::Fits => "适配",
            RelationKind::DependsOn => "依赖于",
            RelationKind::LocatedAt => "位于",
            RelationKind::Recommends => "推荐",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RelationKind::Requires => "requires",
            RelationKind::Improves => "improves",
            RelationKind::Causes => "causes",
            RelationKind::Promotes => "promotes",
            RelationKind::Inhibits => "inhibits",
            RelationKind::MigratesTo => "migrates_to",
            RelationKind::Fits => "fits",
            RelationKind::DependsOn => "depends_on",
            RelationKind::LocatedAt => "located_at",
            RelationKind::Recommends => "recommends",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        let alias = normalize_alias(tag);
        Self::ALL
            .into_iter()
            .find(|r| r.label() == tag || r.name() == alias)
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|r| r.label()).collect()
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize_alias(tag: &str) -> String {
    tag.to_ascii_lowercase().replace(['-', ' '], "_")
}
