use serde::{Deserialize, Serialize};

use crate::metrics::competency::capped;
use crate::source::evidence::ToolSample;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum StyleLabel {
    Commander,
    Strategist,
    Tactician,
    Explorer,
    #[default]
    Balanced,
}

impl StyleLabel {
    pub(crate) fn description(self) -> &'static str {
        match self {
            StyleLabel::Commander => {
                "Plans thoroughly, then executes decisively with specific tool directives."
            }
            StyleLabel::Strategist => {
                "Designs detailed plans then collaborates on implementation nuances."
            }
            StyleLabel::Tactician => {
                "Iterates rapidly with direct, precise instructions at each step."
            }
            StyleLabel::Explorer => {
                "Explores collaboratively, discovering solutions through conversation."
            }
            StyleLabel::Balanced => {
                "Flexibly adapts between planning and iteration as the task demands."
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PilotingStyle {
    pub(crate) directive: u32,
    pub(crate) collaborative: u32,
    pub(crate) plan_first: u32,
    pub(crate) iterate: u32,
    pub(crate) label: StyleLabel,
    pub(crate) description: String,
}

/// Place the operator on two axes: directive vs collaborative from the
/// share of editing tools, plan-first vs iterate from plans per session.
pub(crate) fn compute_piloting_style(
    sample: &ToolSample,
    plan_count: usize,
    total_sessions: u64,
) -> PilotingStyle {
    let edits = sample.tool("Edit") + sample.tool("Write");
    let total = sample.total_calls().max(1);
    let directive = capped(edits as f64 / total as f64 * 200.0, 100);
    let collaborative = 100 - directive;

    let plan_ratio = plan_count as f64 / total_sessions.max(1) as f64;
    let plan_first = capped(
        50.0 + 35.0 * (plan_ratio * 20.0 + 1.0).log2() / 10f64.log2(),
        85,
    );
    let iterate = 100 - plan_first;

    let label = if plan_first > 60 && directive > 60 {
        StyleLabel::Commander
    } else if plan_first > 60 && collaborative > 60 {
        StyleLabel::Strategist
    } else if iterate > 60 && directive > 60 {
        StyleLabel::Tactician
    } else if iterate > 60 && collaborative > 60 {
        StyleLabel::Explorer
    } else {
        StyleLabel::Balanced
    };

    PilotingStyle {
        directive,
        collaborative,
        plan_first,
        iterate,
        label,
        description: label.description().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pairs: &[(&str, u64)]) -> ToolSample {
        let mut s = ToolSample::default();
        for (k, v) in pairs {
            s.tool_counts.insert(k.to_string(), *v);
        }
        s
    }

    #[test]
    fn empty_sample_is_collaborative() {
        let style = compute_piloting_style(&ToolSample::default(), 0, 0);
        assert_eq!(style.directive, 0);
        assert_eq!(style.collaborative, 100);
        assert_eq!(style.plan_first, 50);
        assert_eq!(style.label, StyleLabel::Balanced);
    }

    #[test]
    fn heavy_planner_editor_is_commander() {
        let style = compute_piloting_style(&sample(&[("Edit", 8), ("Read", 2)]), 10, 10);
        assert_eq!(style.directive, 100);
        assert_eq!(style.plan_first, 85);
        assert_eq!(style.iterate, 15);
        assert_eq!(style.label, StyleLabel::Commander);
        assert!(style.description.starts_with("Plans thoroughly"));
    }

    #[test]
    fn planner_reader_is_strategist() {
        let style = compute_piloting_style(&sample(&[("Read", 9), ("Edit", 1)]), 10, 10);
        assert_eq!(style.directive, 20);
        assert_eq!(style.label, StyleLabel::Strategist);
    }

    #[test]
    fn label_serializes_as_name() {
        let json = serde_json::to_value(StyleLabel::Tactician).unwrap();
        assert_eq!(json, "Tactician");
    }
}
