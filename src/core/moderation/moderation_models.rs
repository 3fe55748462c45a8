// Moderation domain models - data structures for the submit/poll workflow.
//
// These are pure domain types with no HTTP dependencies.
// The infra layer maps the wire format into these.

use std::fmt;

/// Opaque identifier for an in-flight moderation job. Returned by the submit
/// call and only ever used as the key for polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionHandle(String);

impl ExecutionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job state reported by the moderation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Processing,
    Succeeded,
    Failed,
    /// Anything the API reports that we don't recognize. A payload with no
    /// status field at all surfaces here as an empty string.
    Other(String),
}

impl From<&str> for JobStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "processing" => JobStatus::Processing,
            "succeeded" => JobStatus::Succeeded,
            "failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }
}

/// One scored category inside a moderation entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationItem {
    pub category: String,
    pub likelihood_score: f64,
}

/// One entry of the text-moderation results list. The API returns at most one
/// per job in practice; only the first is ever interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationEntry {
    pub nsfw_likelihood_score: f64,
    pub items: Vec<ModerationItem>,
}

/// Completed moderation payload, reduced to the part we score.
///
/// `text_moderation == None` means the payload had no text-moderation section
/// at all; `Some(vec![])` means the section was present but empty. The two
/// cases produce different status strings downstream, so the distinction is
/// kept in the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationReport {
    pub text_moderation: Option<Vec<ModerationEntry>>,
}

/// One fetch of the result endpoint: parsed status, the report, and the raw
/// payload (carried into the error when the job reports `failed`).
#[derive(Debug, Clone)]
pub struct PollResponse {
    pub status: JobStatus,
    pub report: ModerationReport,
    pub raw: serde_json::Value,
}

/// Classification status for one text sample.
///
/// `NoModerationData` renders as "success" and `EmptyResults` as "succeeded".
/// The mismatched vocabulary is what the result sheets have always contained;
/// consumers match on both literals, so neither is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleStatus {
    Validated,
    Rejected,
    NoModerationData,
    EmptyResults,
    Error,
}

impl fmt::Display for SampleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SampleStatus::Validated => "validated",
            SampleStatus::Rejected => "rejected",
            SampleStatus::NoModerationData => "success",
            SampleStatus::EmptyResults => "succeeded",
            SampleStatus::Error => "Error",
        };
        f.write_str(label)
    }
}

/// Final scoring for one sample: rejection percentage in [0, 100], dominant
/// category, and classification status.
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub rejection_percentage: f64,
    pub category: String,
    pub status: SampleStatus,
}
