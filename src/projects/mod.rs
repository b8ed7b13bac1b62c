//! Cross-source project registry
//!
//! Project records from the chat export, the hosted repositories and the
//! telemetry mission log are keyed by a normalized slug and merged into one
//! entity per project.

mod merge;
mod normalize;
mod sources;
mod types;

pub(crate) use merge::{ProjectRegistry, ProjectSource, merge_projects};
pub(crate) use normalize::Normalizer;
pub(crate) use sources::{ChatExportSource, MissionSource, RepoSource, conversation_key};
pub(crate) use types::{Category, ProjectEntity};
