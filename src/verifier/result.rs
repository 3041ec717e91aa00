use crate::domain::compare::HeaderSet;
use crate::domain::contract::{Request, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Progress of one interaction through verification.
///
/// Phases advance in declaration order and stop at the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Pending,
    StateSetup,
    RequestSent,
    ResponseCompared,
    Passed,
    Failed,
}

/// What the provider actually returned.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualResponse {
    pub status: u16,
    pub headers: HeaderSet,
    /// Decoded body, when there was one and it could be decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub raw_body: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionResult {
    pub description: String,
    pub success: bool,
    pub phase: Phase,
    /// Phase that was in progress when the interaction failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_phase: Option<Phase>,
    /// Mismatches joined with `"; "`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    /// Infrastructure failure; never set together with `diff`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub provider_states: Vec<String>,
    pub request: Request,
    pub expected: Response,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<ActualResponse>,
}

impl InteractionResult {
    pub(crate) fn pending(description: &str, provider_states: Vec<String>, request: Request, expected: Response) -> Self {
        Self {
            description: description.to_string(),
            success: false,
            phase: Phase::Pending,
            failed_phase: None,
            diff: None,
            error: None,
            provider_states,
            request,
            expected,
            actual: None,
        }
    }

    pub(crate) fn advance(&mut self, phase: Phase) {
        tracing::trace!(description = %self.description, ?phase, "interaction phase");
        self.phase = phase;
    }

    pub(crate) fn fail_with_error(mut self, error: String) -> Self {
        self.failed_phase = Some(self.phase);
        self.phase = Phase::Failed;
        self.error = Some(error);
        self
    }

    pub(crate) fn finish(mut self, diffs: Vec<String>) -> Self {
        if diffs.is_empty() {
            self.success = true;
            self.phase = Phase::Passed;
        } else {
            self.failed_phase = Some(self.phase);
            self.phase = Phase::Failed;
            self.diff = Some(diffs.join("; "));
        }
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub consumer: String,
    pub provider: String,
    pub success: bool,
    pub interactions: Vec<InteractionResult>,
    pub verified_at: DateTime<Utc>,
}

impl VerificationResult {
    pub fn passed_count(&self) -> usize {
        self.interactions.iter().filter(|i| i.success).count()
    }

    pub fn failed_count(&self) -> usize {
        self.interactions.len() - self.passed_count()
    }
}
