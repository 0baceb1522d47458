//! Capability trait and registry
//!
//! Capabilities are the invocable actions a plan step can name. Every
//! invocation returns a `CapabilityOutput` carrying the uniform outcome
//! signal; internal faults never cross this boundary as errors.

use crate::error::{OrchestrationError, Result};
use crate::models::{CapabilityInput, CapabilityKind, CapabilityOutput, OutputPayload};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Trait for a single capability.
///
/// `invoke` is infallible by contract: anything that goes wrong inside
/// the implementation is reported as `success=false` with an error
/// message, so the executor only ever sees outcome data.
#[async_trait::async_trait]
pub trait Capability: Send + Sync {
    fn kind(&self) -> CapabilityKind;
    fn description(&self) -> &'static str;
    async fn invoke(&self, input: &CapabilityInput) -> CapabilityOutput;
}

/// Registry resolving a capability kind to its implementation.
///
/// Read-only after initialization; an unregistered kind is a routing
/// error for the step that names it, not a retryable failure.
pub struct CapabilityRegistry {
    capabilities: HashMap<CapabilityKind, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            capabilities: HashMap::new(),
        }
    }

    pub fn register(&mut self, capability: Arc<dyn Capability>) {
        self.capabilities.insert(capability.kind(), capability);
    }

    pub fn get(&self, kind: CapabilityKind) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(&kind).cloned()
    }

    pub fn list(&self) -> Vec<CapabilityKind> {
        self.capabilities.keys().copied().collect()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn mismatched_input(expected: CapabilityKind, got: &CapabilityInput) -> CapabilityOutput {
    CapabilityOutput::fail(
        OrchestrationError::InvalidCapabilityInput(format!(
            "{} capability received {} input",
            expected,
            got.kind()
        ))
        .to_string(),
    )
}

//
// ================= Search =================
//

/// Mock search capability with canned results.
pub struct SearchCapability;

/// Simulated network latency for the mock capabilities.
const SEARCH_LATENCY: Duration = Duration::from_millis(25);

#[async_trait::async_trait]
impl Capability for SearchCapability {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Search
    }

    fn description(&self) -> &'static str {
        "Search for articles matching a query (mock, canned results)"
    }

    async fn invoke(&self, input: &CapabilityInput) -> CapabilityOutput {
        let query = match input {
            CapabilityInput::Search { query } => query,
            other => return mismatched_input(CapabilityKind::Search, other),
        };

        tokio::time::sleep(SEARCH_LATENCY).await;

        let lowered = query.to_lowercase();
        let results = if lowered.contains("gold") && lowered.contains("nasdaq") {
            vec![
                "Gold rallied 2% while Nasdaq fell 1.5% on Fed hawkish signal".to_string(),
                "Risk-off rotation: Gold up, tech down as yields spike".to_string(),
                "Gold/Nasdaq correlation turns negative during tightening cycles".to_string(),
            ]
        } else {
            Vec::new()
        };

        CapabilityOutput::ok(OutputPayload::Search { results })
    }
}

//
// ================= Calculate =================
//

/// Arithmetic evaluator capability.
///
/// Supports `+ - * /`, parentheses, and unary minus over f64. Parse and
/// evaluation errors become failed outputs.
pub struct CalculateCapability;

const CALC_LATENCY: Duration = Duration::from_millis(10);

#[async_trait::async_trait]
impl Capability for CalculateCapability {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Calculate
    }

    fn description(&self) -> &'static str {
        "Evaluate an arithmetic expression"
    }

    async fn invoke(&self, input: &CapabilityInput) -> CapabilityOutput {
        let expression = match input {
            CapabilityInput::Calculate { expression } => expression,
            other => return mismatched_input(CapabilityKind::Calculate, other),
        };

        tokio::time::sleep(CALC_LATENCY).await;

        match evaluate_expression(expression) {
            Ok(value) => CapabilityOutput::ok(OutputPayload::Calculate { value }),
            Err(e) => CapabilityOutput::fail(e.to_string()),
        }
    }
}

/// Recursive-descent evaluator over a byte cursor.
struct ExprParser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

pub fn evaluate_expression(expr: &str) -> Result<f64> {
    let mut parser = ExprParser {
        src: expr,
        bytes: expr.as_bytes(),
        pos: 0,
    };
    let value = parser.parse_expr()?;
    parser.skip_whitespace();
    if parser.pos != parser.bytes.len() {
        return Err(OrchestrationError::InvalidExpression(format!(
            "unexpected input at byte {} of {:?}",
            parser.pos, expr
        )));
    }
    if !value.is_finite() {
        return Err(OrchestrationError::InvalidExpression(
            "expression does not evaluate to a finite number".to_string(),
        ));
    }
    Ok(value)
}

impl<'a> ExprParser<'a> {
    fn skip_whitespace(&mut self) {
        while self.bytes.get(self.pos) == Some(&b' ') {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.bytes.get(self.pos).copied()
    }

    fn parse_expr(&mut self) -> Result<f64> {
        let mut value = self.parse_term()?;
        loop {
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    value += self.parse_term()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    value -= self.parse_term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn parse_term(&mut self) -> Result<f64> {
        let mut value = self.parse_factor()?;
        loop {
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    value *= self.parse_factor()?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    let divisor = self.parse_factor()?;
                    if divisor == 0.0 {
                        return Err(OrchestrationError::InvalidExpression(
                            "division by zero".to_string(),
                        ));
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
        }
    }

    fn parse_factor(&mut self) -> Result<f64> {
        match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                Ok(-self.parse_factor()?)
            }
            Some(b'(') => {
                self.pos += 1;
                let value = self.parse_expr()?;
                if self.peek() != Some(b')') {
                    return Err(OrchestrationError::InvalidExpression(
                        "unbalanced parentheses".to_string(),
                    ));
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.parse_number(),
            _ => Err(OrchestrationError::InvalidExpression(
                "expected a number, '-', or '('".to_string(),
            )),
        }
    }

    fn parse_number(&mut self) -> Result<f64> {
        let start = self.pos;
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|c| c.is_ascii_digit() || *c == b'.')
        {
            self.pos += 1;
        }
        // Slice boundaries fall on ASCII digits and dots.
        let text = &self.src[start..self.pos];
        text.parse::<f64>().map_err(|_| {
            OrchestrationError::InvalidExpression(format!("invalid number {:?}", text))
        })
    }
}

//
// ================= WriteNote =================
//

/// Mock note-writing capability; produces a stored path without
/// touching the filesystem.
pub struct WriteNoteCapability;

const WRITE_LATENCY: Duration = Duration::from_millis(25);

#[async_trait::async_trait]
impl Capability for WriteNoteCapability {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::WriteNote
    }

    fn description(&self) -> &'static str {
        "Write a named note and return its stored path (mock)"
    }

    async fn invoke(&self, input: &CapabilityInput) -> CapabilityOutput {
        let (filename, _content) = match input {
            CapabilityInput::WriteNote { filename, content } => (filename, content),
            other => return mismatched_input(CapabilityKind::WriteNote, other),
        };

        tokio::time::sleep(WRITE_LATENCY).await;

        if filename.trim().is_empty() {
            return CapabilityOutput::fail("note filename must not be empty");
        }

        CapabilityOutput::ok(OutputPayload::WriteNote {
            path: format!("/notes/{}", filename),
        })
    }
}

/// Create a registry with every built-in capability registered.
pub fn create_default_registry() -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();
    registry.register(Arc::new(SearchCapability));
    registry.register(Arc::new(CalculateCapability));
    registry.register(Arc::new(WriteNoteCapability));
    registry
}

//
// ================= Tests =================
//
