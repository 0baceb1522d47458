//! Execution engine for deterministic plan execution
//!
//! Runs steps strictly in plan order with per-attempt timeout and fixed
//! backoff between retries. Every step produces exactly one log entry;
//! failures never abort the run, the policy gate decides what blocks.

use crate::capability::CapabilityRegistry;
use crate::models::{CapabilityOutput, ExecutionLog, Plan, RunConfig, Step};
use crate::verifier;
use std::time::Instant;
use tracing::{debug, warn};

/// Executes a plan step-by-step against the capability registry.
pub struct Executor {
    registry: CapabilityRegistry,
}

impl Executor {
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self { registry }
    }

    /// Execute all steps in order, one `ExecutionLog` per step.
    ///
    /// Later steps run regardless of earlier failures so the audit
    /// trail stays complete even for runs the gate will block.
    pub async fn execute(&self, plan: &Plan, config: &RunConfig) -> Vec<ExecutionLog> {
        debug!(goal = %plan.goal, step_count = plan.steps.len(), "Starting plan execution");

        let mut logs = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            logs.push(self.execute_step(step, config).await);
        }

        debug!(log_count = logs.len(), "Plan execution completed");
        logs
    }

    async fn execute_step(&self, step: &Step, config: &RunConfig) -> ExecutionLog {
        let start = Instant::now();

        // Unresolved capability is a configuration error, not a
        // transient one: terminal, zero attempts.
        let Some(capability) = self.registry.get(step.capability) else {
            warn!(
                step_id = step.step_id,
                capability = %step.capability,
                "Capability not registered"
            );
            let output = CapabilityOutput::fail(format!(
                "Routing error: no capability registered for {}",
                step.capability
            ));
            return ExecutionLog {
                step_id: step.step_id,
                capability: step.capability,
                input: step.input.clone(),
                success: output.success,
                output,
                attempt_count: 0,
                duration_ms: start.elapsed().as_millis() as u64,
                verified: false,
                verification_message: format!(
                    "Routing error: no capability registered for {}",
                    step.capability
                ),
            };
        };

        let max_attempts = config.max_retries + 1;
        let mut last_output = CapabilityOutput::fail("step was never attempted");

        for attempt in 1..=max_attempts {
            debug!(
                step_id = step.step_id,
                capability = %step.capability,
                attempt,
                "Invoking capability"
            );

            let output = match tokio::time::timeout(
                config.timeout,
                capability.invoke(&step.input),
            )
            .await
            {
                Ok(output) => output,
                Err(_) => CapabilityOutput::fail(format!(
                    "Attempt timed out after {} ms",
                    config.timeout.as_millis()
                )),
            };

            if output.success {
                let verification = verifier::verify(step, &output);
                debug!(
                    step_id = step.step_id,
                    attempt,
                    verified = verification.verified,
                    "Step succeeded"
                );
                return ExecutionLog {
                    step_id: step.step_id,
                    capability: step.capability,
                    input: step.input.clone(),
                    success: output.success,
                    output,
                    attempt_count: attempt,
                    duration_ms: start.elapsed().as_millis() as u64,
                    verified: verification.verified,
                    verification_message: verification.message,
                };
            }

            warn!(
                step_id = step.step_id,
                attempt,
                error = output.error.as_deref().unwrap_or("unknown"),
                "Attempt failed"
            );
            last_output = output;

            if attempt < max_attempts {
                tokio::time::sleep(config.backoff).await;
            }
        }

        warn!(
            step_id = step.step_id,
            capability = %step.capability,
            attempts = max_attempts,
            "Retries exhausted"
        );
        ExecutionLog {
            step_id: step.step_id,
            capability: step.capability,
            input: step.input.clone(),
            success: false,
            output: last_output,
            attempt_count: max_attempts,
            duration_ms: start.elapsed().as_millis() as u64,
            verified: false,
            verification_message: format!(
                "Failed after {} attempts; retries exhausted",
                max_attempts
            ),
        }
    }
}
