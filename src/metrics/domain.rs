//! Domain expertise ("instrument") ratings from keyword evidence

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::metrics::keywords::KeywordTables;
use crate::source::evidence::{PlanFile, ProjectDoc, ToolSample};

const MAX_SCORE: f64 = 98.0;
const MATCHED_SHOWN: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct InstrumentRating {
    pub(crate) score: u32,
    pub(crate) hits: usize,
    pub(crate) matched_keywords: Vec<String>,
    pub(crate) keyword_coverage: f64,
}

/// Lower-cased evidence corpus: plans, instruction files, then the names of
/// technologies seen in transcripts.
pub(crate) fn evidence_text(
    plans: &[PlanFile],
    docs: &[ProjectDoc],
    sample: &ToolSample,
) -> String {
    let mut text = String::new();
    for plan in plans {
        text.push(' ');
        text.push_str(&plan.content_lower);
    }
    for doc in docs {
        text.push(' ');
        text.push_str(&doc.content_lower);
    }
    let techs: Vec<&str> = sample.tech_mentions.keys().map(String::as_str).collect();
    text.push(' ');
    text.push_str(&techs.join(" ").to_lowercase());
    text
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score every domain on keyword coverage and on hit volume relative to the
/// busiest domain, half each.
pub(crate) fn compute_instrument_ratings(
    text: &str,
    tables: &KeywordTables,
) -> BTreeMap<String, InstrumentRating> {
    let tallies: Vec<(&str, usize, Vec<String>, usize)> = tables
        .domains
        .iter()
        .map(|domain| {
            let mut hits = 0;
            let mut matched = Vec::new();
            for kw in &domain.keywords {
                let count = text.matches(kw.as_str()).count();
                if count > 0 {
                    hits += count;
                    matched.push(kw.clone());
                }
            }
            (domain.name.as_str(), hits, matched, domain.keywords.len())
        })
        .collect();

    let max_hits = tallies.iter().map(|t| t.1).max().unwrap_or(0).max(1) as f64;

    tallies
        .into_iter()
        .map(|(name, hits, mut matched, total)| {
            let coverage = if total == 0 {
                0.0
            } else {
                matched.len() as f64 / total as f64
            };
            let raw = coverage * 50.0 + hits as f64 / max_hits * 50.0;
            let keyword_coverage = round1(coverage * 100.0);
            matched.truncate(MATCHED_SHOWN);
            (
                name.to_string(),
                InstrumentRating {
                    score: raw.min(MAX_SCORE) as u32,
                    hits,
                    matched_keywords: matched,
                    keyword_coverage,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::keywords::Domain;

    fn tables(domains: Vec<(&str, &[&str])>) -> KeywordTables {
        KeywordTables {
            domains: domains
                .into_iter()
                .map(|(n, k)| Domain {
                    name: n.to_string(),
                    keywords: k.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
            ..KeywordTables::default()
        }
    }

    #[test]
    fn full_coverage_and_max_volume_caps_at_98() {
        let t = tables(vec![("Radio", &["lora", "mesh"]), ("Web", &["react", "css"])]);
        let r = compute_instrument_ratings("lora mesh lora react", &t);
        assert_eq!(r["Radio"].score, 98);
        assert_eq!(r["Radio"].hits, 3);
        assert_eq!(r["Radio"].keyword_coverage, 100.0);
        // half coverage (25) + 1/3 volume (16.66)
        assert_eq!(r["Web"].score, 41);
        assert_eq!(r["Web"].matched_keywords, vec!["react"]);
    }

    #[test]
    fn no_evidence_scores_zero() {
        let r = compute_instrument_ratings("", &KeywordTables::default());
        assert_eq!(r.len(), 8);
        assert!(r.values().all(|x| x.score == 0 && x.hits == 0));
    }

    #[test]
    fn scores_never_exceed_cap() {
        let t = KeywordTables::default();
        let all: String = t
            .domains
            .iter()
            .flat_map(|d| d.keywords.iter())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        let r = compute_instrument_ratings(&all, &t);
        assert!(r.values().all(|x| x.score <= 98));
        assert!(r.values().all(|x| x.matched_keywords.len() <= 8));
    }

    #[test]
    fn evidence_text_joins_sources() {
        let plans = vec![PlanFile {
            name: "p".into(),
            size: 4,
            content_lower: "plan".into(),
        }];
        let docs = vec![ProjectDoc {
            project: "x".into(),
            size: 3,
            content_lower: "doc".into(),
        }];
        let mut sample = ToolSample::default();
        sample.tech_mentions.insert("Rust".into(), 2);
        let text = evidence_text(&plans, &docs, &sample);
        assert_eq!(text, " plan doc rust");
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round2(1.005_1), 1.01);
    }
}
