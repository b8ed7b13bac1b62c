//! Project registry merge
//!
//! Sources are merged in a fixed order. The first sighting of a slug creates
//! the entity; later sightings fold in with the same rules for every source.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::metrics::classify_category;
use crate::metrics::keywords::KeywordTables;
use crate::projects::normalize::Normalizer;
use crate::projects::types::{ProjectEntity, ProjectRecord};

/// A collaborator that offers project records to the registry.
pub(crate) trait ProjectSource {
    /// Key of this source in `ProjectEntity::sources`
    fn name(&self) -> &'static str;

    /// Whether a sighting from this source marks the project featured.
    fn featured(&self) -> bool {
        false
    }

    /// Records keyed by their raw name. The registry normalizes the name.
    fn records(&self, normalizer: &Normalizer) -> Vec<ProjectRecord>;
}

#[derive(Debug, Default)]
pub(crate) struct ProjectRegistry {
    entities: Vec<ProjectEntity>,
    index: HashMap<String, usize>,
}

impl ProjectRegistry {
    pub(crate) fn len(&self) -> usize {
        self.entities.len()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, slug: &str) -> Option<&ProjectEntity> {
        self.index.get(slug).map(|&i| &self.entities[i])
    }

    pub(crate) fn merge_source(
        &mut self,
        source: &dyn ProjectSource,
        normalizer: &Normalizer,
        research: &BTreeSet<String>,
    ) {
        let records = source.records(normalizer);
        tracing::debug!("merging {} records from {}", records.len(), source.name());
        // Entities whose share from this source was already reset in this pass
        let mut touched = HashSet::new();
        for record in records {
            let slug = normalizer.normalize(&record.name);
            let idx = self.entity_index(slug, &record, research);
            let fresh = record.contribution.is_some() && touched.insert(idx);
            self.fold_record(idx, fresh, source.name(), source.featured(), record);
        }
    }

    fn entity_index(
        &mut self,
        slug: String,
        record: &ProjectRecord,
        research: &BTreeSet<String>,
    ) -> usize {
        match self.index.get(&slug) {
            Some(&idx) => idx,
            None => {
                self.entities.push(ProjectEntity {
                    is_research: research.contains(&slug),
                    slug: slug.clone(),
                    name: record.name.clone(),
                    tagline: record.tagline.clone(),
                    description: record.description.clone(),
                    category: Default::default(),
                    is_featured: false,
                    status: record.status.clone(),
                    technologies: BTreeSet::new(),
                    last_activity: record.last_activity.clone(),
                    total_messages: 0,
                    sources: Default::default(),
                    claude_involvement: None,
                    source_messages: Default::default(),
                });
                self.index.insert(slug, self.entities.len() - 1);
                self.entities.len() - 1
            }
        }
    }

    /// Fold one record into an existing entity. Records from the same source
    /// that share a slug add their messages; `fresh` marks the first of them
    /// in the current pass, which replaces any share from an earlier pass.
    fn fold_record(
        &mut self,
        idx: usize,
        fresh: bool,
        source: &str,
        featured: bool,
        record: ProjectRecord,
    ) {
        let entity = &mut self.entities[idx];

        entity.technologies.extend(record.technologies);
        if record.last_activity > entity.last_activity {
            entity.last_activity = record.last_activity;
        }
        if record.status == "active" {
            entity.status = record.status;
        }
        entity.is_featured |= featured;

        if let Some(contribution) = record.contribution {
            entity.sources.insert(source.to_string(), contribution);
            let share = entity.source_messages.entry(source.to_string()).or_default();
            if fresh {
                *share = 0;
            }
            *share += record.messages;
            entity.total_messages = entity.source_messages.values().sum();
        }
    }

    /// Recompute every entity's category from its current fields.
    pub(crate) fn classify(&mut self, tables: &KeywordTables) {
        for entity in &mut self.entities {
            entity.category = classify_category(
                &entity.name,
                &entity.description,
                &entity.technologies,
                tables,
            );
        }
    }

    pub(crate) fn entities_mut(&mut self) -> &mut [ProjectEntity] {
        &mut self.entities
    }

    /// Entities ordered by most recent activity. Ties keep merge order.
    pub(crate) fn into_sorted(mut self) -> Vec<ProjectEntity> {
        self.entities
            .sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        self.entities
    }
}

/// Merge `sources` in order, then classify every entity.
pub(crate) fn merge_projects(
    registry: &mut ProjectRegistry,
    sources: &[&dyn ProjectSource],
    normalizer: &Normalizer,
    research: &BTreeSet<String>,
    tables: &KeywordTables,
) {
    for source in sources {
        registry.merge_source(*source, normalizer, research);
    }
    registry.classify(tables);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projects::types::{
        Category, ChatContribution, RepoContribution, SourceContribution, TelemetryContribution,
    };

    struct Fixed {
        name: &'static str,
        featured: bool,
        records: Vec<ProjectRecord>,
    }

    impl ProjectSource for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }
        fn featured(&self) -> bool {
            self.featured
        }
        fn records(&self, _normalizer: &Normalizer) -> Vec<ProjectRecord> {
            self.records.clone()
        }
    }

    fn chat(name: &str, msgs: u64, updated: &str) -> ProjectRecord {
        ProjectRecord {
            name: name.into(),
            description: "chat notes".into(),
            status: "active".into(),
            last_activity: updated.into(),
            messages: msgs,
            contribution: (msgs > 0).then(|| {
                SourceContribution::Chat(ChatContribution {
                    conversation_count: 1,
                    total_messages: msgs,
                    last_conversation: updated.get(..10).unwrap_or("").into(),
                })
            }),
            ..ProjectRecord::default()
        }
    }

    fn repo(name: &str, pushed: &str) -> ProjectRecord {
        ProjectRecord {
            name: name.into(),
            tagline: "firmware for mesh radios".into(),
            description: "firmware for mesh radios".into(),
            status: "active".into(),
            last_activity: pushed.into(),
            contribution: Some(SourceContribution::Repo(RepoContribution {
                repo: format!("acme/{name}"),
                stars: 4,
                language: "C".into(),
                last_push: pushed.get(..10).unwrap_or("").into(),
            })),
            ..ProjectRecord::default()
        }
    }

    fn mission(name: &str, msgs: u64, status: &str, techs: &[&str], last: &str) -> ProjectRecord {
        ProjectRecord {
            name: name.into(),
            status: status.into(),
            technologies: techs.iter().map(|t| t.to_string()).collect(),
            last_activity: last.into(),
            messages: msgs,
            contribution: Some(SourceContribution::Telemetry(TelemetryContribution {
                total_sessions: 2,
                total_messages: msgs,
                last_session: last.into(),
            })),
            ..ProjectRecord::default()
        }
    }

    fn sources() -> (Fixed, Fixed, Fixed) {
        (
            Fixed {
                name: "claudeWeb",
                featured: false,
                records: vec![chat("Hotbits", 12, "2026-01-05T00:00:00Z"), chat("Empty", 0, "")],
            },
            Fixed {
                name: "github",
                featured: true,
                records: vec![repo("hotbits", "2026-02-01T00:00:00Z")],
            },
            Fixed {
                name: "claudeCode",
                featured: false,
                records: vec![
                    mission("hotbits", 30, "archived", &["Rust", "ESP32"], "2025-12-01"),
                    mission("notes", 5, "recent", &["Markdown"], "2026-01-02"),
                ],
            },
        )
    }

    fn merged() -> ProjectRegistry {
        let (a, b, c) = sources();
        let mut reg = ProjectRegistry::default();
        merge_projects(
            &mut reg,
            &[&a, &b, &c],
            &Normalizer::default(),
            &BTreeSet::from(["hotbits".to_string()]),
            &KeywordTables::default(),
        );
        reg
    }

    #[test]
    fn first_sighting_creates_and_later_ones_fold() {
        let reg = merged();
        assert_eq!(reg.len(), 3);

        let hb = reg.get("hotbits").unwrap();
        assert_eq!(hb.name, "Hotbits");
        assert!(hb.is_research);
        assert!(hb.is_featured);
        assert_eq!(hb.status, "active");
        assert_eq!(hb.total_messages, 42);
        assert_eq!(hb.last_activity, "2026-02-01T00:00:00Z");
        assert_eq!(
            hb.technologies.iter().cloned().collect::<Vec<_>>(),
            vec!["ESP32", "Rust"]
        );
        assert_eq!(hb.sources.len(), 3);
        assert_eq!(hb.category, Category::Hardware);
    }

    #[test]
    fn zero_message_chat_project_has_no_source_entry() {
        let reg = merged();
        let empty = reg.get("empty").unwrap();
        assert!(empty.sources.is_empty());
        assert_eq!(empty.total_messages, 0);
        assert!(!empty.is_featured);
    }

    #[test]
    fn non_active_status_is_kept_on_creation() {
        let reg = merged();
        assert_eq!(reg.get("notes").unwrap().status, "recent");
    }

    #[test]
    fn merge_is_idempotent() {
        let (a, b, c) = sources();
        let mut reg = merged();
        let before: Vec<ProjectEntity> = reg.entities_mut().to_vec();
        merge_projects(
            &mut reg,
            &[&a, &b, &c],
            &Normalizer::default(),
            &BTreeSet::from(["hotbits".to_string()]),
            &KeywordTables::default(),
        );
        assert_eq!(reg.entities_mut().to_vec(), before);
    }

    #[test]
    fn same_slug_records_from_one_source_add_up() {
        let missions = Fixed {
            name: "claudeCode",
            featured: false,
            records: vec![
                mission("api", 10, "recent", &["Go"], "2026-01-01"),
                mission("API", 20, "active", &["Rust"], "2026-01-03"),
            ],
        };
        let mut reg = ProjectRegistry::default();
        for _ in 0..2 {
            merge_projects(
                &mut reg,
                &[&missions],
                &Normalizer::default(),
                &BTreeSet::new(),
                &KeywordTables::default(),
            );
        }

        assert_eq!(reg.len(), 1);
        let api = reg.get("api").unwrap();
        assert_eq!(api.total_messages, 30);
        assert_eq!(api.status, "active");
        assert_eq!(api.technologies.len(), 2);
        assert_eq!(api.last_activity, "2026-01-03");
    }

    #[test]
    fn sorted_by_last_activity_descending() {
        let sorted = merged().into_sorted();
        let dates: Vec<&str> = sorted.iter().map(|p| p.last_activity.as_str()).collect();
        assert_eq!(dates, vec!["2026-02-01T00:00:00Z", "2026-01-02", ""]);
    }
}
