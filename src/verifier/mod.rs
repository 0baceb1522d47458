//! Acceptance-criterion verification
//!
//! Post-hoc check that a step's output satisfies its declared criterion.
//! Criteria are structured variants, so matching is exhaustive; there is
//! no substring guessing and no silent auto-pass for unknown criteria.

use crate::models::{Acceptance, CapabilityOutput, OutputPayload, Step};

/// Outcome of verifying one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepVerification {
    pub verified: bool,
    pub message: String,
}

impl StepVerification {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            verified: true,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            verified: false,
            message: message.into(),
        }
    }
}

/// Evaluate a step's acceptance criterion against its output.
///
/// A failed invocation never verifies, regardless of criterion.
pub fn verify(step: &Step, output: &CapabilityOutput) -> StepVerification {
    if !output.success {
        return StepVerification::fail("Capability invocation failed");
    }

    match step.acceptance {
        Acceptance::MinResultCount { required } => match &output.payload {
            OutputPayload::Search { results } => {
                let count = results.len();
                if count >= required {
                    StepVerification::pass(format!("Verified: {} results returned", count))
                } else {
                    StepVerification::fail(format!(
                        "Only {} results, need {}",
                        count, required
                    ))
                }
            }
            _ => StepVerification::fail(format!(
                "Criterion expects a result list but {} produced none",
                step.capability
            )),
        },
        Acceptance::PathProduced => match &output.payload {
            OutputPayload::WriteNote { path } if !path.is_empty() => {
                StepVerification::pass(format!("Verified: written to {}", path))
            }
            OutputPayload::WriteNote { .. } => StepVerification::fail("Write produced no path"),
            _ => StepVerification::fail(format!(
                "Criterion expects a stored path but {} produced none",
                step.capability
            )),
        },
        Acceptance::NoCheck => {
            StepVerification::pass("No acceptance check declared for this step")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CapabilityInput, CapabilityKind};

    fn search_step(required: usize) -> Step {
        Step {
            step_id: 1,
            capability: CapabilityKind::Search,
            input: CapabilityInput::Search {
                query: "q".to_string(),
            },
            acceptance: Acceptance::MinResultCount { required },
        }
    }

    fn search_output(n: usize) -> CapabilityOutput {
        CapabilityOutput::ok(OutputPayload::Search {
            results: (0..n).map(|i| format!("result {}", i)).collect(),
        })
    }

    #[test]
    fn failed_output_never_verifies() {
        let result = verify(&search_step(0), &CapabilityOutput::fail("boom"));
        assert!(!result.verified);
        assert_eq!(result.message, "Capability invocation failed");
    }

    #[test]
    fn min_result_count_boundary() {
        assert!(verify(&search_step(2), &search_output(2)).verified);
        assert!(verify(&search_step(2), &search_output(3)).verified);

        let short = verify(&search_step(2), &search_output(1));
        assert!(!short.verified);
        assert!(short.message.contains("need 2"));
    }

    #[test]
    fn min_result_count_rejects_payload_without_results() {
        let mut step = search_step(1);
        step.capability = CapabilityKind::Calculate;
        let output = CapabilityOutput::ok(OutputPayload::Calculate { value: 4.0 });
        assert!(!verify(&step, &output).verified);
    }

    #[test]
    fn path_produced_checks_the_stored_path() {
        let step = Step {
            step_id: 2,
            capability: CapabilityKind::WriteNote,
            input: CapabilityInput::WriteNote {
                filename: "a.txt".to_string(),
                content: "c".to_string(),
            },
            acceptance: Acceptance::PathProduced,
        };

        let ok = verify(
            &step,
            &CapabilityOutput::ok(OutputPayload::WriteNote {
                path: "/notes/a.txt".to_string(),
            }),
        );
        assert!(ok.verified);
        assert!(ok.message.contains("/notes/a.txt"));

        let empty = verify(
            &step,
            &CapabilityOutput::ok(OutputPayload::WriteNote {
                path: String::new(),
            }),
        );
        assert!(!empty.verified);
    }

    #[test]
    fn no_check_passes_with_an_explicit_message() {
        let step = Step {
            step_id: 3,
            capability: CapabilityKind::Calculate,
            input: CapabilityInput::Calculate {
                expression: "1 + 1".to_string(),
            },
            acceptance: Acceptance::NoCheck,
        };
        let result = verify(
            &step,
            &CapabilityOutput::ok(OutputPayload::Calculate { value: 2.0 }),
        );
        assert!(result.verified);
        assert!(result.message.contains("No acceptance check"));
    }
}
