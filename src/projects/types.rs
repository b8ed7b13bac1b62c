use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Category {
    Hardware,
    AiMl,
    Data,
    #[default]
    Systems,
    Creative,
}

impl Category {
    pub(crate) const ALL: [Category; 5] = [
        Category::Hardware,
        Category::AiMl,
        Category::Data,
        Category::Systems,
        Category::Creative,
    ];

    pub(crate) fn id(self) -> &'static str {
        match self {
            Category::Hardware => "hardware",
            Category::AiMl => "ai-ml",
            Category::Data => "data",
            Category::Systems => "systems",
            Category::Creative => "creative",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Category::Hardware => "Hardware & Edge",
            Category::AiMl => "AI & Language",
            Category::Data => "Data Engineering",
            Category::Systems => "Systems & Infra",
            Category::Creative => "Creative & Research",
        }
    }

    pub(crate) fn color(self) -> &'static str {
        match self {
            Category::Hardware => "var(--brand-primary)",
            Category::AiMl => "var(--brand-secondary)",
            Category::Data => "var(--brand-info)",
            Category::Systems => "var(--brand-steel)",
            Category::Creative => "var(--brand-warning)",
        }
    }

    pub(crate) fn icon(self) -> &'static str {
        match self {
            Category::Hardware => "Cpu",
            Category::AiMl => "Brain",
            Category::Data => "Database",
            Category::Systems => "Server",
            Category::Creative => "Lightbulb",
        }
    }
}

/// Chat-export conversations linked to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatContribution {
    pub(crate) conversation_count: u64,
    pub(crate) total_messages: u64,
    pub(crate) last_conversation: String,
}

/// Hosted repository metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RepoContribution {
    pub(crate) repo: String,
    pub(crate) stars: u64,
    pub(crate) language: String,
    pub(crate) last_push: String,
}

/// Local session telemetry for one working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TelemetryContribution {
    pub(crate) total_sessions: u64,
    pub(crate) total_messages: u64,
    pub(crate) last_session: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum SourceContribution {
    Chat(ChatContribution),
    Repo(RepoContribution),
    Telemetry(TelemetryContribution),
}

/// One record offered by a project source, before merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ProjectRecord {
    pub(crate) name: String,
    pub(crate) tagline: String,
    pub(crate) description: String,
    pub(crate) status: String,
    pub(crate) technologies: Vec<String>,
    pub(crate) last_activity: String,
    pub(crate) messages: u64,
    pub(crate) contribution: Option<SourceContribution>,
}

/// A merged project keyed by its normalized slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectEntity {
    pub(crate) slug: String,
    pub(crate) name: String,
    pub(crate) tagline: String,
    pub(crate) description: String,
    pub(crate) category: Category,
    pub(crate) is_research: bool,
    pub(crate) is_featured: bool,
    pub(crate) status: String,
    pub(crate) technologies: BTreeSet<String>,
    pub(crate) last_activity: String,
    pub(crate) total_messages: u64,
    pub(crate) sources: BTreeMap<String, SourceContribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) claude_involvement: Option<String>,
    /// Message count contributed by each source, so re-merging a source
    /// replaces its share instead of adding it twice.
    #[serde(skip)]
    pub(crate) source_messages: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_as_id() {
        for cat in Category::ALL {
            let json = serde_json::to_value(cat).unwrap();
            assert_eq!(json, serde_json::json!(cat.id()));
        }
    }

    #[test]
    fn contribution_shapes() {
        let c = SourceContribution::Repo(RepoContribution {
            repo: "acme/esp32".into(),
            stars: 3,
            language: "C".into(),
            last_push: "2026-01-01".into(),
        });
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["lastPush"], "2026-01-01");
        assert_eq!(json["stars"], 3);
    }
}
