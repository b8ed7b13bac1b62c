use chrono::offset::Offset;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

use crate::error::AppError;

/// How event timestamps are mapped onto calendar days and hours.
///
/// `Recorded` keeps whatever offset the timestamp was written with, so a
/// record stamped `...Z` is bucketed on its UTC date.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Timezone {
    Recorded,
    Local,
    Named(Tz),
}

impl Timezone {
    pub(crate) fn parse(value: Option<&str>) -> Result<Self, AppError> {
        let Some(raw) = value else {
            return Ok(Timezone::Recorded);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("recorded") {
            return Ok(Timezone::Recorded);
        }
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(Timezone::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
            return Ok(Timezone::Named(chrono_tz::UTC));
        }
        Tz::from_str(trimmed)
            .map(Timezone::Named)
            .map_err(|_| AppError::InvalidTimezone {
                input: trimmed.to_string(),
            })
    }

    /// Re-express a parsed timestamp in this timezone.
    pub(crate) fn apply(self, ts: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            Timezone::Recorded => ts,
            Timezone::Local => {
                let local = ts.with_timezone(&Local);
                let offset = local.offset().fix();
                local.with_timezone(&offset)
            }
            Timezone::Named(tz) => {
                let local = ts.with_timezone(&tz);
                let offset = local.offset().fix();
                local.with_timezone(&offset)
            }
        }
    }

    /// Convert an epoch-millisecond instant. `Recorded` has no offset to keep
    /// here, so it falls back to the machine's local zone.
    pub(crate) fn from_epoch_ms(self, ms: i64) -> Option<DateTime<FixedOffset>> {
        let utc = DateTime::<Utc>::from_timestamp_millis(ms)?;
        let fixed = utc.with_timezone(&utc.offset().fix());
        Some(match self {
            Timezone::Recorded => Timezone::Local.apply(fixed),
            other => other.apply(fixed),
        })
    }

    pub(crate) fn today(self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            Timezone::Recorded | Timezone::Local => now.with_timezone(&Local).date_naive(),
            Timezone::Named(tz) => now.with_timezone(&tz).date_naive(),
        }
    }
}
