//! Goal-Driven Task Orchestrator
//!
//! Given a natural-language goal, this crate:
//! - Decomposes it into a structured plan of capability invocations
//! - Executes each step with retry, backoff, and timeout discipline
//! - Verifies every output against a structured acceptance criterion
//! - Gates the run on cost and approval policy before reporting a verdict
//!
//! PIPELINE:
//! GOAL → PLAN → EXECUTE → VERIFY → POLICY GATE → RUN RECORD
//!
//! Every failure mode is represented as data in the `RunRecord`; nothing
//! escapes the orchestrator as an error.

pub mod capability;
pub mod error;
pub mod executor;
pub mod models;
pub mod orchestrator;
pub mod planner;
pub mod policy;
pub mod verifier;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use orchestrator::Orchestrator;
