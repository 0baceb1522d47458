//! Planner trait and the rule-based implementation
//!
//! The planner maps a goal string to an ordered plan. The rule matcher
//! here is intentionally the least sophisticated component; a real
//! plan-generation engine would sit behind the same contract.

use crate::models::{Acceptance, CapabilityInput, CapabilityKind, Plan, Step};
use tracing::debug;

/// Trait for plan generation.
///
/// Implementations must be deterministic, side-effect-free, and total:
/// a goal no rule matches yields an empty plan, never an error.
pub trait Planner: Send + Sync {
    fn plan(&self, goal: &str) -> Plan;
}

/// Deterministic planner: case-insensitive substring rules checked in
/// fixed priority order, first match wins.
pub struct RulePlanner;

impl Planner for RulePlanner {
    fn plan(&self, goal: &str) -> Plan {
        let lowered = goal.to_lowercase();

        // Rule 1: briefing on the gold/Nasdaq divergence.
        if lowered.contains("briefing") && lowered.contains("gold") && lowered.contains("nasdaq") {
            debug!(rule = "briefing", "Planner rule matched");
            return Plan {
                goal: goal.to_string(),
                steps: vec![
                    Step {
                        step_id: 1,
                        capability: CapabilityKind::Search,
                        input: CapabilityInput::Search {
                            query: "gold vs Nasdaq divergence latest".to_string(),
                        },
                        acceptance: Acceptance::MinResultCount { required: 2 },
                    },
                    Step {
                        step_id: 2,
                        capability: CapabilityKind::WriteNote,
                        input: CapabilityInput::WriteNote {
                            filename: "gold_nq_briefing.txt".to_string(),
                            content: "Gold-Nasdaq divergence briefing based on search results"
                                .to_string(),
                        },
                        acceptance: Acceptance::PathProduced,
                    },
                ],
            };
        }

        // Rule 2: any other gold/Nasdaq research gets a search plus a
        // saved note of the findings.
        if lowered.contains("gold") && lowered.contains("nasdaq") {
            debug!(rule = "gold_nasdaq", "Planner rule matched");
            return Plan {
                goal: goal.to_string(),
                steps: vec![
                    Step {
                        step_id: 1,
                        capability: CapabilityKind::Search,
                        input: CapabilityInput::Search {
                            query: goal.to_string(),
                        },
                        acceptance: Acceptance::MinResultCount { required: 2 },
                    },
                    Step {
                        step_id: 2,
                        capability: CapabilityKind::WriteNote,
                        input: CapabilityInput::WriteNote {
                            filename: "gold_nasdaq_notes.txt".to_string(),
                            content: format!("Research notes for goal: {}", goal),
                        },
                        acceptance: Acceptance::PathProduced,
                    },
                ],
            };
        }

        // Rule 3: arithmetic goals, expression taken verbatim after the
        // keyword.
        if let Some(idx) = lowered.find("calculate") {
            // Slice the lowered text: offsets into the original goal can
            // drift when lowercasing multi-byte characters.
            let expression = lowered[idx + "calculate".len()..]
                .trim()
                .trim_end_matches('.')
                .trim();
            if !expression.is_empty() {
                debug!(rule = "calculate", expression, "Planner rule matched");
                return Plan {
                    goal: goal.to_string(),
                    steps: vec![Step {
                        step_id: 1,
                        capability: CapabilityKind::Calculate,
                        input: CapabilityInput::Calculate {
                            expression: expression.to_string(),
                        },
                        acceptance: Acceptance::NoCheck,
                    }],
                };
            }
        }

        debug!("No planner rule matched, emitting empty plan");
        Plan {
            goal: goal.to_string(),
            steps: vec![],
        }
    }
}
