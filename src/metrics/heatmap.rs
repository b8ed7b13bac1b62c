use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::DailyActivityBucket;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct HeatmapDay {
    pub(crate) date: String,
    pub(crate) count: u64,
    pub(crate) sessions: u64,
    pub(crate) tool_calls: u64,
    pub(crate) intensity: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct HourBucket {
    pub(crate) hour: u32,
    pub(crate) label: String,
    pub(crate) count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct HourlyDistribution {
    pub(crate) hours: Vec<HourBucket>,
    pub(crate) peak_hour: u32,
    pub(crate) peak_count: u64,
}

/// Quartile bucket of `count` against the busiest day. Zero stays zero.
pub(crate) fn intensity(count: u64, max: u64) -> u8 {
    if count == 0 {
        return 0;
    }
    let max = max.max(1) as f64;
    let count = count as f64;
    if count <= max * 0.25 {
        1
    } else if count <= max * 0.5 {
        2
    } else if count <= max * 0.75 {
        3
    } else {
        4
    }
}

pub(crate) fn compute_activity_heatmap(daily: &[DailyActivityBucket]) -> Vec<HeatmapDay> {
    let max = daily.iter().map(|d| d.message_count).max().unwrap_or(0);
    daily
        .iter()
        .map(|day| HeatmapDay {
            date: day.date.clone(),
            count: day.message_count,
            sessions: day.session_count,
            tool_calls: day.tool_call_count,
            intensity: intensity(day.message_count, max),
        })
        .collect()
}

/// Sessions started in each hour of the day. The peak is the first hour
/// with the strictly highest count; an all-zero histogram peaks at hour 0.
pub(crate) fn compute_hourly_distribution(hour_counts: &BTreeMap<u32, u64>) -> HourlyDistribution {
    let mut dist = HourlyDistribution::default();
    for hour in 0..24 {
        let count = hour_counts.get(&hour).copied().unwrap_or(0);
        if count > dist.peak_count {
            dist.peak_count = count;
            dist.peak_hour = hour;
        }
        dist.hours.push(HourBucket {
            hour,
            label: format!("{hour:02}:00"),
            count,
        });
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, count: u64) -> DailyActivityBucket {
        DailyActivityBucket {
            date: date.to_string(),
            message_count: count,
            session_count: 1,
            tool_call_count: 2,
        }
    }

    #[test]
    fn intensity_quartiles() {
        let daily: Vec<_> = [0, 10, 20, 30, 40]
            .iter()
            .enumerate()
            .map(|(i, c)| day(&format!("2026-01-0{}", i + 1), *c))
            .collect();
        let levels: Vec<u8> = compute_activity_heatmap(&daily)
            .iter()
            .map(|d| d.intensity)
            .collect();
        assert_eq!(levels, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn intensity_boundaries() {
        assert_eq!(intensity(0, 0), 0);
        assert_eq!(intensity(25, 100), 1);
        assert_eq!(intensity(26, 100), 2);
        assert_eq!(intensity(51, 100), 3);
        assert_eq!(intensity(76, 100), 4);
    }

    #[test]
    fn heatmap_carries_counts() {
        let h = compute_activity_heatmap(&[day("2026-01-01", 7)]);
        assert_eq!(h[0].sessions, 1);
        assert_eq!(h[0].tool_calls, 2);
        assert_eq!(h[0].intensity, 4);
        assert!(compute_activity_heatmap(&[]).is_empty());
    }

    #[test]
    fn hourly_labels_and_peak() {
        let counts = BTreeMap::from([(3, 5), (14, 9), (20, 9)]);
        let dist = compute_hourly_distribution(&counts);
        assert_eq!(dist.hours.len(), 24);
        assert_eq!(dist.hours[3].label, "03:00");
        assert_eq!(dist.hours[14].count, 9);
        assert_eq!(dist.peak_hour, 14);
        assert_eq!(dist.peak_count, 9);
    }

    #[test]
    fn empty_histogram_peaks_at_zero() {
        let dist = compute_hourly_distribution(&BTreeMap::new());
        assert_eq!(dist.peak_hour, 0);
        assert_eq!(dist.peak_count, 0);
    }
}
