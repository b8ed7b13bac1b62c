//! Six-axis competency radar

use serde::{Deserialize, Serialize};

use crate::source::evidence::ToolSample;

const AXIS_CAP: u32 = 95;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CompetencyAxis {
    pub(crate) axis: String,
    pub(crate) score: u32,
    pub(crate) detail: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CompetencyInputs<'a> {
    pub(crate) plan_count: usize,
    pub(crate) sample: Option<&'a ToolSample>,
    pub(crate) total_messages: u64,
    pub(crate) total_sessions: u64,
    pub(crate) project_count: usize,
    pub(crate) project_switches: u64,
}

/// Truncate toward zero, then cap.
pub(crate) fn capped(value: f64, cap: u32) -> u32 {
    (value.max(0.0) as u32).min(cap)
}

fn axis(name: &str, score: u32, detail: String) -> CompetencyAxis {
    CompetencyAxis {
        axis: name.to_string(),
        score,
        detail,
    }
}

pub(crate) fn compute_competency_radar(inputs: &CompetencyInputs<'_>) -> Vec<CompetencyAxis> {
    let empty = ToolSample::default();
    let sample = inputs.sample.unwrap_or(&empty);
    let plans = inputs.plan_count as f64;

    let planning = capped(40.0 + 30.0 * (plans + 1.0).log2() / 80f64.log2(), AXIS_CAP);

    let unique_tools = sample.tool_counts.len();
    let volume = sample.total_calls();
    let tool_mastery = capped(
        30.0 + unique_tools as f64 * 2.5 + ((volume as f64 + 1.0).log2() * 3.0).min(30.0),
        AXIS_CAP,
    );

    let debug_calls = sample.tool("Bash") + sample.tool("Grep") + sample.tool("Read");
    let debug_ratio = debug_calls as f64 / volume.max(1) as f64;
    let debugging = capped(
        40.0 + debug_ratio * 60.0 + ((debug_calls as f64 + 1.0).log2() * 3.0).min(20.0),
        AXIS_CAP,
    );

    let projects = inputs.project_count as f64;
    let architecture = capped(
        30.0 + (projects * 2.0).min(40.0) + (plans * 0.4).min(25.0),
        AXIS_CAP,
    );

    let per_session = inputs.total_messages as f64 / inputs.total_sessions.max(1) as f64;
    let iteration = capped(
        30.0 + 40.0 * (per_session + 1.0).log2() / 1000f64.log2(),
        AXIS_CAP,
    );

    let multi_project = capped(
        20.0 + inputs.project_switches as f64 * 0.5 + projects * 2.0,
        AXIS_CAP,
    );

    vec![
        axis(
            "Planning",
            planning,
            format!("{} plans created", inputs.plan_count),
        ),
        axis(
            "Tool Mastery",
            tool_mastery,
            format!("{unique_tools} tools, {volume} calls"),
        ),
        axis(
            "Debugging",
            debugging,
            format!("{debug_calls} debug tool calls"),
        ),
        axis(
            "Architecture",
            architecture,
            format!("{} projects designed", inputs.project_count),
        ),
        axis(
            "Iteration",
            iteration,
            format!("{} msgs/session avg", per_session as u64),
        ),
        axis(
            "Multi-Project",
            multi_project,
            format!("{} context switches", inputs.project_switches),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(radar: &[CompetencyAxis]) -> Vec<u32> {
        radar.iter().map(|a| a.score).collect()
    }

    #[test]
    fn zero_inputs_give_floor_scores() {
        let radar = compute_competency_radar(&CompetencyInputs::default());
        assert_eq!(scores(&radar), vec![40, 30, 40, 30, 30, 20]);
        assert_eq!(radar[0].detail, "0 plans created");
        assert_eq!(radar[1].detail, "0 tools, 0 calls");
        assert_eq!(radar[4].detail, "0 msgs/session avg");
    }

    #[test]
    fn literal_formula_values() {
        let mut sample = ToolSample::default();
        sample.tool_counts.insert("Bash".into(), 2);
        sample.tool_counts.insert("Edit".into(), 4);
        let radar = compute_competency_radar(&CompetencyInputs {
            plan_count: 20,
            sample: Some(&sample),
            total_messages: 100,
            total_sessions: 1,
            project_count: 10,
            project_switches: 40,
        });
        // 40 + 30 * log2(21) / log2(80) = 60.84
        assert_eq!(radar[0].score, 60);
        // 30 + 2 * 2.5 + log2(7) * 3 = 43.42
        assert_eq!(radar[1].score, 43);
        assert_eq!(radar[1].detail, "2 tools, 6 calls");
        // 40 + 2/6 * 60 + log2(3) * 3 = 64.75
        assert_eq!(radar[2].score, 64);
        // 30 + 20 + 8
        assert_eq!(radar[3].score, 58);
        // 30 + 40 * log2(101) / log2(1000) = 56.72
        assert_eq!(radar[4].score, 56);
        assert_eq!(radar[4].detail, "100 msgs/session avg");
        // 20 + 20 + 20
        assert_eq!(radar[5].score, 60);
        assert_eq!(radar[5].detail, "40 context switches");
    }

    #[test]
    fn axes_are_capped() {
        let mut sample = ToolSample::default();
        for i in 0..40 {
            sample.tool_counts.insert(format!("T{i}"), 1_000_000);
        }
        let radar = compute_competency_radar(&CompetencyInputs {
            plan_count: 100_000,
            sample: Some(&sample),
            total_messages: u64::MAX / 2,
            total_sessions: 1,
            project_count: 1_000,
            project_switches: 1_000,
        });
        assert!(radar.iter().all(|a| a.score <= 95));
    }
}
