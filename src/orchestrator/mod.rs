//! Main orchestrator - sequences the pipeline
//!
//! goal → PLAN → EXECUTE (retry + verify) → POLICY GATE → RunRecord
//!
//! Pure sequencing and record assembly; all failure handling lives in
//! the executor and the policy gate, so `run` is infallible and every
//! failure mode is data in the returned record.

use crate::executor::Executor;
use crate::models::{RunConfig, RunRecord};
use crate::planner::Planner;
use crate::policy::PolicyGate;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

pub struct Orchestrator {
    planner: Box<dyn Planner>,
    executor: Executor,
}

impl Orchestrator {
    pub fn new(planner: Box<dyn Planner>, executor: Executor) -> Self {
        Self { planner, executor }
    }

    /// Run one goal end to end and assemble the audit record.
    pub async fn run(&self, goal: &str, config: &RunConfig) -> RunRecord {
        info!(goal, "Orchestrator: starting run");

        let plan = self.planner.plan(goal);
        debug!(step_count = plan.steps.len(), "Plan created");

        let logs = self.executor.execute(&plan, config).await;

        let verdict = PolicyGate::check(&plan, &logs, config);
        info!(passed = verdict.passed, message = %verdict.message, "Run complete");

        RunRecord {
            run_id: Uuid::new_v4(),
            goal: goal.to_string(),
            plan,
            logs,
            verdict,
            timestamp: Utc::now(),
        }
    }
}
