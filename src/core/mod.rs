//! Core module - event records, per-session aggregation and the stats cache

mod aggregator;
mod cache;
mod types;

pub(crate) use aggregator::aggregate_session;
pub(crate) use cache::{CacheBuilder, load_snapshot};
pub(crate) use types::{
    DailyActivityBucket, DailyModelTokens, EventKind, EventRecord, MessageContent, ModelUsageRecord,
    SessionRecord, StatsCacheSnapshot,
};
