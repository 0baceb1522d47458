//! Core data models for the orchestration pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

//
// ================= Capabilities =================
//

/// Closed set of invocable capabilities.
///
/// Adding a capability means adding a variant here and updating every
/// exhaustive match, so new actions are a reviewable change rather than
/// a string lookup that can silently miss.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Search,
    Calculate,
    WriteNote,
}

impl CapabilityKind {
    /// Side-effecting capabilities require human approval when the
    /// policy gate is configured to escalate writes.
    pub fn is_side_effecting(&self) -> bool {
        matches!(self, CapabilityKind::WriteNote)
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CapabilityKind::Search => "search",
            CapabilityKind::Calculate => "calculate",
            CapabilityKind::WriteNote => "write_note",
        };
        write!(f, "{}", s)
    }
}

/// Typed input for a capability invocation, one variant per capability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "capability", rename_all = "snake_case")]
pub enum CapabilityInput {
    Search { query: String },
    Calculate { expression: String },
    WriteNote { filename: String, content: String },
}

impl CapabilityInput {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            CapabilityInput::Search { .. } => CapabilityKind::Search,
            CapabilityInput::Calculate { .. } => CapabilityKind::Calculate,
            CapabilityInput::WriteNote { .. } => CapabilityKind::WriteNote,
        }
    }
}

/// Variant-specific result data carried by a successful output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputPayload {
    Search { results: Vec<String> },
    Calculate { value: f64 },
    WriteNote { path: String },
    Empty,
}

/// Uniform outcome signal for every capability invocation.
///
/// Invariant: `success == false` implies `error` is populated and the
/// payload is `Empty`; `success == true` implies a variant payload.
/// Use the constructors to uphold it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapabilityOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub payload: OutputPayload,
}

impl CapabilityOutput {
    pub fn ok(payload: OutputPayload) -> Self {
        Self {
            success: true,
            error: None,
            payload,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        let mut message: String = error.into();
        if message.is_empty() {
            message = "capability fault with no message".to_string();
        }
        Self {
            success: false,
            error: Some(message),
            payload: OutputPayload::Empty,
        }
    }
}

//
// ================= Plan =================
//

/// Structured acceptance criterion, decided at plan-construction time.
///
/// `NoCheck` is an explicit declaration that a step carries no
/// verification, not a fallback for unparseable criteria.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "criterion", rename_all = "snake_case")]
pub enum Acceptance {
    MinResultCount { required: usize },
    PathProduced,
    NoCheck,
}

/// One planned invocation of a capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub step_id: u32,
    pub capability: CapabilityKind,
    pub input: CapabilityInput,
    pub acceptance: Acceptance,
}

/// Ordered sequence of steps derived from a goal.
/// An empty step list means no planning rule matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub goal: String,
    pub steps: Vec<Step>,
}

//
// ================= Execution =================
//

/// Audit entry for one executed step, finalized once the step succeeds
/// and is verified or its retry budget is exhausted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub step_id: u32,
    pub capability: CapabilityKind,
    pub input: CapabilityInput,
    pub output: CapabilityOutput,
    pub success: bool,
    pub attempt_count: u32,
    pub duration_ms: u64,
    pub verified: bool,
    pub verification_message: String,
}

//
// ================= Verdict & Run Record =================
//

/// Aggregate policy outcome for a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub message: String,
}

/// The complete, immutable artifact of one orchestration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub goal: String,
    pub plan: Plan,
    pub logs: Vec<ExecutionLog>,
    pub verdict: Verdict,
    pub timestamp: DateTime<Utc>,
}

//
// ================= Configuration =================
//

/// Per-run knobs for the executor and policy gate.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Extra attempts after the first; a step is tried `max_retries + 1` times.
    pub max_retries: u32,
    /// Per-attempt deadline; a slower attempt counts as a failure.
    pub timeout: Duration,
    /// Fixed pause between failed attempts.
    pub backoff: Duration,
    /// Latency budget for the whole run, summed over step durations.
    pub max_cost_ms: u64,
    /// Escalate runs containing side-effecting steps for human approval.
    pub require_approval: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            timeout: Duration::from_secs(5),
            backoff: Duration::from_millis(500),
            max_cost_ms: 10_000,
            require_approval: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_output_always_carries_an_error() {
        let out = CapabilityOutput::fail("");
        assert!(!out.success);
        assert!(out.error.as_deref().is_some_and(|e| !e.is_empty()));
        assert_eq!(out.payload, OutputPayload::Empty);
    }

    #[test]
    fn input_kind_matches_variant() {
        let input = CapabilityInput::WriteNote {
            filename: "notes.txt".to_string(),
            content: "hello".to_string(),
        };
        assert_eq!(input.kind(), CapabilityKind::WriteNote);
        assert!(input.kind().is_side_effecting());
        assert!(!CapabilityKind::Search.is_side_effecting());
    }

    #[test]
    fn run_record_serializes_round_trip() {
        let record = RunRecord {
            run_id: Uuid::new_v4(),
            goal: "test".to_string(),
            plan: Plan {
                goal: "test".to_string(),
                steps: vec![Step {
                    step_id: 1,
                    capability: CapabilityKind::Search,
                    input: CapabilityInput::Search {
                        query: "q".to_string(),
                    },
                    acceptance: Acceptance::MinResultCount { required: 2 },
                }],
            },
            logs: vec![],
            verdict: Verdict {
                passed: true,
                message: "APPROVED".to_string(),
            },
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: RunRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.run_id, record.run_id);
        assert_eq!(back.plan.steps.len(), 1);
    }
}
