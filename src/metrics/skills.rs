use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::metrics::keywords::KeywordTables;
use crate::source::evidence::{ProjectDoc, ToolSample};

const SKILLS_SHOWN: usize = 30;
/// A technology named in a project instruction file counts this many times.
const DOC_WEIGHT: u64 = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Skill {
    pub(crate) name: String,
    pub(crate) count: u64,
    pub(crate) category: String,
}

pub(crate) fn compute_skills_cloud(
    sample: &ToolSample,
    docs: &[ProjectDoc],
    tables: &KeywordTables,
) -> Vec<Skill> {
    let mut counts: HashMap<&str, u64> = sample
        .tech_mentions
        .iter()
        .map(|(name, count)| (name.as_str(), *count))
        .collect();
    for doc in docs {
        for tech in tables.techs_in(&doc.content_lower) {
            *counts.entry(tech.name.as_str()).or_default() += DOC_WEIGHT;
        }
    }

    let mut skills: Vec<Skill> = counts
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(name, count)| Skill {
            name: name.to_string(),
            count,
            category: tables
                .techs
                .iter()
                .find(|t| t.name == name)
                .and_then(|t| tables.domain_of_tech(t))
                .unwrap_or("General")
                .to_string(),
        })
        .collect();
    skills.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    skills.truncate(SKILLS_SHOWN);
    skills
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> ProjectDoc {
        ProjectDoc {
            project: "p".into(),
            size: text.len(),
            content_lower: text.into(),
        }
    }

    #[test]
    fn doc_mentions_weigh_three() {
        let mut sample = ToolSample::default();
        sample.tech_mentions.insert("Rust".into(), 2);
        sample.tech_mentions.insert("Pandas".into(), 4);
        let skills = compute_skills_cloud(
            &sample,
            &[doc("a rust service"), doc("more rust")],
            &KeywordTables::default(),
        );

        assert_eq!(skills[0].name, "Rust");
        assert_eq!(skills[0].count, 8);
        assert_eq!(skills[0].category, "Systems");
        assert_eq!(skills[1].name, "Pandas");
        assert_eq!(skills[1].category, "General");
    }

    #[test]
    fn ties_break_by_name_and_zero_counts_drop() {
        let mut sample = ToolSample::default();
        sample.tech_mentions.insert("Redis".into(), 1);
        sample.tech_mentions.insert("Docker".into(), 1);
        sample.tech_mentions.insert("Vercel".into(), 0);
        let skills = compute_skills_cloud(&sample, &[], &KeywordTables::default());
        let names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Docker", "Redis"]);
        assert_eq!(skills[0].category, "DevOps");
    }

    #[test]
    fn capped_at_thirty() {
        let tables = KeywordTables::default();
        let mut sample = ToolSample::default();
        for tech in tables.techs.iter().take(40) {
            sample.tech_mentions.insert(tech.name.clone(), 1);
        }
        assert_eq!(compute_skills_cloud(&sample, &[], &tables).len(), 30);
    }
}
