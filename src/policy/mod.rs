//! Policy gate: final aggregate check over a completed run
//!
//! Evaluates cost, then approval, then verification completeness. The
//! first failing check supplies the verdict message; checks are never
//! merged into a combined reason.

use crate::models::{ExecutionLog, Plan, RunConfig, Verdict};
use tracing::info;

/// Stateless policy evaluator; `check` is pure and idempotent.
pub struct PolicyGate;

impl PolicyGate {
    pub fn check(plan: &Plan, logs: &[ExecutionLog], config: &RunConfig) -> Verdict {
        // Cost: strictly exceeding the budget blocks, equality passes.
        let total_ms: u64 = logs.iter().map(|log| log.duration_ms).sum();
        if total_ms > config.max_cost_ms {
            info!(total_ms, limit_ms = config.max_cost_ms, "Run blocked by cost check");
            return Verdict {
                passed: false,
                message: format!(
                    "POLICY VIOLATION: {} ms exceeds {} ms limit",
                    total_ms, config.max_cost_ms
                ),
            };
        }

        // Approval: fires on the plan, whether or not the write succeeded.
        let has_writes = plan
            .steps
            .iter()
            .any(|step| step.capability.is_side_effecting());
        if has_writes && config.require_approval {
            info!("Run blocked pending approval");
            return Verdict {
                passed: false,
                message: "ESCALATE: Write operation requires human approval".to_string(),
            };
        }

        // Verification completeness.
        let failed: Vec<u32> = logs
            .iter()
            .filter(|log| !log.verified)
            .map(|log| log.step_id)
            .collect();
        if !failed.is_empty() {
            info!(?failed, "Run blocked by verification check");
            return Verdict {
                passed: false,
                message: format!("POLICY VIOLATION: Steps {:?} failed verification", failed),
            };
        }

        Verdict {
            passed: true,
            message: "APPROVED: All policy checks passed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Acceptance, CapabilityInput, CapabilityKind, CapabilityOutput, OutputPayload, Step,
    };

    fn log(step_id: u32, duration_ms: u64, verified: bool) -> ExecutionLog {
        ExecutionLog {
            step_id,
            capability: CapabilityKind::Search,
            input: CapabilityInput::Search {
                query: "q".to_string(),
            },
            output: CapabilityOutput::ok(OutputPayload::Search { results: vec![] }),
            success: true,
            attempt_count: 1,
            duration_ms,
            verified,
            verification_message: String::new(),
        }
    }

    fn plan_with_write() -> Plan {
        Plan {
            goal: "save a note".to_string(),
            steps: vec![Step {
                step_id: 1,
                capability: CapabilityKind::WriteNote,
                input: CapabilityInput::WriteNote {
                    filename: "n.txt".to_string(),
                    content: "c".to_string(),
                },
                acceptance: Acceptance::PathProduced,
            }],
        }
    }

    fn read_only_plan() -> Plan {
        Plan {
            goal: "look something up".to_string(),
            steps: vec![Step {
                step_id: 1,
                capability: CapabilityKind::Search,
                input: CapabilityInput::Search {
                    query: "q".to_string(),
                },
                acceptance: Acceptance::NoCheck,
            }],
        }
    }

    #[test]
    fn cost_check_blocks_only_on_strict_exceedance() {
        let logs = vec![log(1, 100, true), log(2, 200, true)];
        let plan = read_only_plan();

        let at_limit = RunConfig {
            max_cost_ms: 300,
            ..RunConfig::default()
        };
        assert!(PolicyGate::check(&plan, &logs, &at_limit).passed);

        let over_limit = RunConfig {
            max_cost_ms: 299,
            ..RunConfig::default()
        };
        let verdict = PolicyGate::check(&plan, &logs, &over_limit);
        assert!(!verdict.passed);
        assert!(verdict.message.contains("300"));
        assert!(verdict.message.contains("299"));
    }

    #[test]
    fn approval_check_fires_on_write_plans_regardless_of_outcome() {
        let config = RunConfig {
            require_approval: true,
            ..RunConfig::default()
        };

        // Even a fully verified run escalates.
        let verdict = PolicyGate::check(&plan_with_write(), &[log(1, 10, true)], &config);
        assert!(!verdict.passed);
        assert!(verdict.message.contains("requires human approval"));

        // Read-only plans do not.
        let verdict = PolicyGate::check(&read_only_plan(), &[log(1, 10, true)], &config);
        assert!(verdict.passed);
    }

    #[test]
    fn verification_check_enumerates_failing_steps() {
        let logs = vec![log(1, 10, true), log(2, 10, false), log(3, 10, false)];
        let verdict = PolicyGate::check(&read_only_plan(), &logs, &RunConfig::default());
        assert!(!verdict.passed);
        assert!(verdict.message.contains("[2, 3]"));
    }

    #[test]
    fn cost_check_takes_priority_over_verification() {
        let logs = vec![log(1, 500, false)];
        let config = RunConfig {
            max_cost_ms: 100,
            ..RunConfig::default()
        };
        let verdict = PolicyGate::check(&read_only_plan(), &logs, &config);
        assert!(verdict.message.contains("exceeds"));
    }

    #[test]
    fn empty_logs_pass_vacuously() {
        let plan = Plan {
            goal: "nothing matched".to_string(),
            steps: vec![],
        };
        let verdict = PolicyGate::check(&plan, &[], &RunConfig::default());
        assert!(verdict.passed);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let logs = vec![log(1, 50, true), log(2, 75, false)];
        let config = RunConfig::default();
        let first = PolicyGate::check(&read_only_plan(), &logs, &config);
        let second = PolicyGate::check(&read_only_plan(), &logs, &config);
        assert_eq!(first, second);
    }
}
