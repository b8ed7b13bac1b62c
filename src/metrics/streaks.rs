use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::DailyActivityBucket;
use crate::utils::{format_day, parse_day};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Streaks {
    pub(crate) current: u32,
    pub(crate) longest: u32,
    pub(crate) peak_day: String,
    pub(crate) peak_day_count: u64,
    pub(crate) peak_week: String,
    pub(crate) peak_week_count: u64,
    pub(crate) total_active_days: usize,
}

/// Consecutive active days ending today. When today has no activity yet the
/// count may start from yesterday instead.
pub(crate) fn current_streak(active: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = Some(today);
    while let Some(d) = day {
        if active.contains(&d) {
            streak += 1;
            day = d.checked_sub_days(Days::new(1));
            continue;
        }
        if streak == 0
            && let Some(yesterday) = d.checked_sub_days(Days::new(1))
            && active.contains(&yesterday)
        {
            streak = 1;
            day = yesterday.checked_sub_days(Days::new(1));
            continue;
        }
        break;
    }
    streak
}

/// Longest run of calendar-consecutive active days.
pub(crate) fn longest_streak(active: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for &d in active {
        run = match prev {
            Some(p) if (d - p).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(d);
    }
    longest
}

fn week_start(d: NaiveDate) -> NaiveDate {
    d - Days::new(u64::from(d.weekday().num_days_from_monday()))
}

pub(crate) fn compute_streaks(daily: &[DailyActivityBucket], today: NaiveDate) -> Streaks {
    if daily.is_empty() {
        return Streaks::default();
    }

    let mut days: Vec<&DailyActivityBucket> = daily.iter().collect();
    days.sort_by(|a, b| a.date.cmp(&b.date));

    let active: BTreeSet<NaiveDate> = days
        .iter()
        .filter(|d| d.message_count > 0)
        .filter_map(|d| parse_day(&d.date))
        .collect();

    // First maximum in date order
    let mut peak: Option<&DailyActivityBucket> = None;
    for d in &days {
        if peak.is_none_or(|p| d.message_count > p.message_count) {
            peak = Some(d);
        }
    }

    let mut weeks: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for d in &days {
        if let Some(date) = parse_day(&d.date) {
            *weeks.entry(week_start(date)).or_default() += d.message_count;
        }
    }
    let mut peak_week: Option<(NaiveDate, u64)> = None;
    for (&start, &count) in &weeks {
        if peak_week.is_none_or(|(_, best)| count > best) {
            peak_week = Some((start, count));
        }
    }

    Streaks {
        current: current_streak(&active, today),
        longest: longest_streak(&active),
        peak_day: peak.map(|p| p.date.clone()).unwrap_or_default(),
        peak_day_count: peak.map_or(0, |p| p.message_count),
        peak_week: peak_week.map(|(d, _)| format_day(d)).unwrap_or_default(),
        peak_week_count: peak_week.map_or(0, |(_, c)| c),
        total_active_days: active.len(),
    }
}
