//! Core data types shared by the log reader, the aggregator and the metrics
//!
//! `EventRecord` is the tolerant view of one JSONL line. Every field that the
//! pipeline reads is optional so that a partially populated record still
//! deserializes; structural mismatches drop only that line.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::consts::STATS_CACHE_VERSION;

// ============================================================================
// Event log records
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum EventKind {
    User,
    Assistant,
    SpeculationAccept,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventRecord {
    #[serde(rename = "type", default)]
    pub(crate) kind: EventKind,
    #[serde(default)]
    pub(crate) is_sidechain: Option<bool>,
    #[serde(default)]
    pub(crate) timestamp: Option<String>,
    #[serde(default)]
    pub(crate) cwd: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<EventMessage>,
    #[serde(default)]
    pub(crate) time_saved_ms: Option<i64>,
    /// Per-message cost written by some client versions
    #[serde(rename = "costUSD", default)]
    pub(crate) cost_usd: Option<f64>,
}

impl EventRecord {
    /// Conversational records count toward messages and sessions.
    pub(crate) fn is_conversational(&self) -> bool {
        matches!(self.kind, EventKind::User | EventKind::Assistant)
            && !self.is_sidechain.unwrap_or(false)
    }

    pub(crate) fn timestamp(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("")
    }

    pub(crate) fn blocks(&self) -> &[ContentBlock] {
        match self.message.as_ref().map(|m| &m.content) {
            Some(MessageContent::Blocks(blocks)) => blocks,
            _ => &[],
        }
    }

    /// Names of every tool invocation carried by this record.
    pub(crate) fn tool_uses(&self) -> impl Iterator<Item = &str> {
        self.blocks().iter().filter_map(ContentBlock::tool_name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct EventMessage {
    #[serde(default)]
    pub(crate) model: Option<String>,
    #[serde(default)]
    pub(crate) usage: Option<Usage>,
    #[serde(default)]
    pub(crate) content: MessageContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub(crate) enum MessageContent {
    Blocks(Vec<ContentBlock>),
    Text(String),
    #[default]
    Empty,
    Other(serde_json::Value),
}

/// A content block. Anything that isn't an object with the expected shape is
/// kept as `Opaque` and ignored by every consumer.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ContentBlock {
    Typed(TypedBlock),
    Opaque(serde_json::Value),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TypedBlock {
    #[serde(rename = "type", default)]
    pub(crate) kind: Option<String>,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) text: Option<String>,
}

impl ContentBlock {
    fn typed(&self, kind: &str) -> Option<&TypedBlock> {
        match self {
            ContentBlock::Typed(block) if block.kind.as_deref() == Some(kind) => Some(block),
            _ => None,
        }
    }

    pub(crate) fn tool_name(&self) -> Option<&str> {
        self.typed("tool_use")
            .map(|b| b.name.as_deref().unwrap_or(""))
    }

    pub(crate) fn text(&self) -> Option<&str> {
        self.typed("text").and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Usage {
    pub(crate) input_tokens: Option<i64>,
    pub(crate) output_tokens: Option<i64>,
    pub(crate) cache_read_input_tokens: Option<i64>,
    pub(crate) cache_creation_input_tokens: Option<i64>,
    #[serde(flatten)]
    pub(crate) extra: HashMap<String, serde_json::Value>,
}

impl Usage {
    /// An empty usage object carries no token information at all.
    pub(crate) fn is_empty(&self) -> bool {
        self.input_tokens.is_none()
            && self.output_tokens.is_none()
            && self.cache_read_input_tokens.is_none()
            && self.cache_creation_input_tokens.is_none()
            && self.extra.is_empty()
    }
}

// ============================================================================
// Per-session and aggregate results
// ============================================================================

/// Timing and message counts for one session log file.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SessionRecord {
    pub(crate) session_id: String,
    /// Empty when no record carried a working directory
    pub(crate) cwd: String,
    pub(crate) first_timestamp: String,
    pub(crate) last_timestamp: String,
    pub(crate) message_count: u64,
    pub(crate) user_message_count: u64,
    pub(crate) assistant_message_count: u64,
    pub(crate) duration_ms: i64,
    pub(crate) first_epoch_ms: Option<i64>,
    pub(crate) last_epoch_ms: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct DailyActivityBucket {
    pub(crate) date: String,
    pub(crate) message_count: u64,
    pub(crate) session_count: u64,
    pub(crate) tool_call_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ModelUsageRecord {
    pub(crate) input_tokens: i64,
    pub(crate) output_tokens: i64,
    pub(crate) cache_read_input_tokens: i64,
    pub(crate) cache_creation_input_tokens: i64,
    pub(crate) web_search_requests: i64,
    #[serde(rename = "costUSD")]
    pub(crate) cost_usd: f64,
    pub(crate) context_window: i64,
    pub(crate) max_output_tokens: i64,
}

impl ModelUsageRecord {
    pub(crate) fn add_usage(&mut self, usage: &Usage) {
        self.input_tokens += usage.input_tokens.unwrap_or(0);
        self.output_tokens += usage.output_tokens.unwrap_or(0);
        self.cache_read_input_tokens += usage.cache_read_input_tokens.unwrap_or(0);
        self.cache_creation_input_tokens += usage.cache_creation_input_tokens.unwrap_or(0);
    }

    pub(crate) fn add(&mut self, other: &ModelUsageRecord) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.cache_read_input_tokens += other.cache_read_input_tokens;
        self.cache_creation_input_tokens += other.cache_creation_input_tokens;
        self.web_search_requests += other.web_search_requests;
        self.cost_usd += other.cost_usd;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct DailyModelTokens {
    pub(crate) date: String,
    pub(crate) tokens_by_model: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct LongestSession {
    pub(crate) session_id: String,
    pub(crate) duration: i64,
    pub(crate) message_count: u64,
    pub(crate) timestamp: String,
}

/// The persisted stats cache document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct StatsCacheSnapshot {
    pub(crate) version: u32,
    pub(crate) last_computed_date: String,
    pub(crate) daily_activity: Vec<DailyActivityBucket>,
    pub(crate) daily_model_tokens: Vec<DailyModelTokens>,
    pub(crate) model_usage: BTreeMap<String, ModelUsageRecord>,
    pub(crate) total_sessions: u64,
    pub(crate) total_messages: u64,
    pub(crate) longest_session: Option<LongestSession>,
    pub(crate) first_session_date: Option<String>,
    pub(crate) hour_counts: BTreeMap<String, u64>,
    pub(crate) total_speculation_time_saved_ms: i64,
}

impl Default for StatsCacheSnapshot {
    fn default() -> Self {
        Self {
            version: STATS_CACHE_VERSION,
            last_computed_date: String::new(),
            daily_activity: Vec::new(),
            daily_model_tokens: Vec::new(),
            model_usage: BTreeMap::new(),
            total_sessions: 0,
            total_messages: 0,
            longest_session: None,
            first_session_date: None,
            hour_counts: BTreeMap::new(),
            total_speculation_time_saved_ms: 0,
        }
    }
}

impl StatsCacheSnapshot {
    /// Hour histogram keyed by numeric hour, dropping keys that aren't 0..=23.
    pub(crate) fn hours(&self) -> BTreeMap<u32, u64> {
        self.hour_counts
            .iter()
            .filter_map(|(k, v)| {
                k.parse::<u32>()
                    .ok()
                    .filter(|h| *h < 24)
                    .map(|h| (h, *v))
            })
            .collect()
    }
}
