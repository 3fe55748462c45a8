// Moderation service - core business logic for the submit/poll workflow.
//
// This service handles:
// - Submitting a text sample to the moderation API (via the port trait)
// - Polling for the asynchronous result at a fixed interval
// - Interpreting a completed payload against the rejection threshold
//
// NO HTTP dependencies here - just pure domain logic.

use super::moderation_models::{
    ExecutionHandle, JobStatus, ModerationReport, PollResponse, RowOutcome, SampleStatus,
};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Cutoff applied when no explicit threshold is configured.
pub const DEFAULT_REJECTION_THRESHOLD: f64 = 0.2;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("no execution id in submit response")]
    Submission,

    #[error("moderation failed: {payload}")]
    Failed { payload: serde_json::Value },

    #[error("unexpected moderation status: {status}")]
    UnexpectedStatus { status: String },

    #[error("moderation still processing after {attempts} poll attempts")]
    PollTimeout { attempts: u32 },

    #[error("moderation API error: {0}")]
    Http(String),

    #[error("failed to decode moderation response: {0}")]
    Decode(String),
}

// ============================================================================
// API TRAIT (PORT)
// ============================================================================

/// Trait for the two calls the moderation API exposes. One HTTP request per
/// call; the polling loop lives in the service, not the implementation.
#[async_trait]
pub trait ModerationApi: Send + Sync {
    /// Submit a text sample. Returns the handle used to poll for the result.
    async fn submit_text(&self, text: &str) -> Result<ExecutionHandle, ModerationError>;

    /// Fetch the current state of a submitted job.
    async fn fetch_result(&self, handle: &ExecutionHandle)
        -> Result<PollResponse, ModerationError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// How the result endpoint is polled.
///
/// The wait is bounded: a job stuck on `processing` fails with
/// `ModerationError::PollTimeout` once `max_attempts` fetches have been made,
/// rather than polling forever. There is no backoff growth between attempts.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

/// Moderation service: submit, wait for a terminal status, score the result.
#[derive(Clone)]
pub struct ModerationService<M: ModerationApi> {
    api: M,
    poll: PollConfig,
    rejection_threshold: f64,
}

impl<M: ModerationApi> ModerationService<M> {
    /// Create a service with the default poll settings and threshold.
    pub fn new(api: M) -> Self {
        Self::with_config(api, PollConfig::default(), DEFAULT_REJECTION_THRESHOLD)
    }

    pub fn with_config(api: M, poll: PollConfig, rejection_threshold: f64) -> Self {
        Self {
            api,
            poll,
            rejection_threshold,
        }
    }

    /// Submit a text sample and block until the job reaches a terminal state.
    pub async fn moderate(&self, text: &str) -> Result<ModerationReport, ModerationError> {
        let handle = self.api.submit_text(text).await?;
        tracing::debug!(handle = %handle, "text submitted for moderation");
        self.wait_for_result(&handle).await
    }

    /// Poll the result endpoint at a fixed interval until the job succeeds,
    /// fails, or the attempt bound runs out.
    async fn wait_for_result(
        &self,
        handle: &ExecutionHandle,
    ) -> Result<ModerationReport, ModerationError> {
        for attempt in 1..=self.poll.max_attempts {
            let response = self.api.fetch_result(handle).await?;

            match response.status {
                JobStatus::Succeeded => return Ok(response.report),
                JobStatus::Failed => {
                    return Err(ModerationError::Failed {
                        payload: response.raw,
                    })
                }
                JobStatus::Processing => {
                    tracing::debug!(handle = %handle, attempt, "moderation still processing");
                    tokio::time::sleep(self.poll.interval).await;
                }
                JobStatus::Other(status) => {
                    return Err(ModerationError::UnexpectedStatus { status })
                }
            }
        }

        Err(ModerationError::PollTimeout {
            attempts: self.poll.max_attempts,
        })
    }

    /// Score a completed report using the configured threshold.
    pub fn interpret(&self, report: &ModerationReport) -> RowOutcome {
        interpret(report, self.rejection_threshold)
    }

    /// Full cycle for one sample: submit, wait, score.
    pub async fn moderate_and_interpret(
        &self,
        text: &str,
    ) -> Result<RowOutcome, ModerationError> {
        let report = self.moderate(text).await?;
        Ok(self.interpret(&report))
    }
}

/// Score a completed moderation payload against a rejection threshold.
///
/// Only the first entry of the results list is considered. The dominant
/// category is picked with a strict `>` comparison, so on a tied maximum the
/// first item seen wins.
pub fn interpret(report: &ModerationReport, rejection_threshold: f64) -> RowOutcome {
    let Some(entries) = report.text_moderation.as_ref() else {
        // Payload without a text-moderation section. Renders as "success".
        return RowOutcome {
            rejection_percentage: 0.0,
            category: "Unknown".to_string(),
            status: SampleStatus::NoModerationData,
        };
    };

    let Some(entry) = entries.first() else {
        // Section present but empty. Renders as "succeeded".
        return RowOutcome {
            rejection_percentage: 0.0,
            category: "Unknown".to_string(),
            status: SampleStatus::EmptyResults,
        };
    };

    let status = if entry.nsfw_likelihood_score >= rejection_threshold {
        SampleStatus::Rejected
    } else {
        SampleStatus::Validated
    };

    let mut highest_category = "Unknown".to_string();
    let mut highest_score = 0.0;
    for item in &entry.items {
        if item.likelihood_score > highest_score {
            highest_category = item.category.clone();
            highest_score = item.likelihood_score;
        }
    }

    RowOutcome {
        rejection_percentage: entry.nsfw_likelihood_score * 100.0,
        category: highest_category,
        status,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::{ModerationEntry, ModerationItem};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Mock API that replays a scripted sequence of poll responses.
    struct ScriptedApi {
        responses: Mutex<VecDeque<PollResponse>>,
        fetches: Arc<AtomicUsize>,
    }

    impl ScriptedApi {
        fn new(responses: Vec<PollResponse>) -> (Self, Arc<AtomicUsize>) {
            let fetches = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    responses: Mutex::new(responses.into()),
                    fetches: Arc::clone(&fetches),
                },
                fetches,
            )
        }
    }

    #[async_trait]
    impl ModerationApi for ScriptedApi {
        async fn submit_text(&self, _text: &str) -> Result<ExecutionHandle, ModerationError> {
            Ok(ExecutionHandle::new("exec-123"))
        }

        async fn fetch_result(
            &self,
            _handle: &ExecutionHandle,
        ) -> Result<PollResponse, ModerationError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ModerationError::Http("mock ran out of responses".to_string()))
        }
    }

    fn processing() -> PollResponse {
        PollResponse {
            status: JobStatus::Processing,
            report: ModerationReport {
                text_moderation: None,
            },
            raw: serde_json::json!({"content": {"status": "processing"}}),
        }
    }

    fn succeeded(score: f64) -> PollResponse {
        PollResponse {
            status: JobStatus::Succeeded,
            report: report_with_score(score),
            raw: serde_json::json!({"content": {"status": "succeeded"}}),
        }
    }

    fn report_with_score(score: f64) -> ModerationReport {
        ModerationReport {
            text_moderation: Some(vec![ModerationEntry {
                nsfw_likelihood_score: score,
                items: vec![ModerationItem {
                    category: "Toxic".to_string(),
                    likelihood_score: score,
                }],
            }]),
        }
    }

    fn service_with(api: ScriptedApi) -> ModerationService<ScriptedApi> {
        ModerationService::with_config(
            api,
            PollConfig {
                interval: Duration::from_secs(5),
                max_attempts: 60,
            },
            DEFAULT_REJECTION_THRESHOLD,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_returns_after_two_intervals() {
        let (api, fetches) = ScriptedApi::new(vec![processing(), processing(), succeeded(0.5)]);
        let service = service_with(api);

        let started = tokio::time::Instant::now();
        let report = service.moderate("sample").await.unwrap();

        // Two processing responses -> exactly two sleeps before the result.
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert_eq!(fetches.load(Ordering::SeqCst), 3);
        assert!(report.text_moderation.is_some());
    }

    #[tokio::test]
    async fn test_failed_status_carries_payload() {
        let raw = serde_json::json!({"content": {"status": "failed", "error": "boom"}});
        let (api, _) = ScriptedApi::new(vec![PollResponse {
            status: JobStatus::Failed,
            report: ModerationReport {
                text_moderation: None,
            },
            raw: raw.clone(),
        }]);
        let service = service_with(api);

        let err = service.moderate("sample").await.unwrap_err();
        match err {
            ModerationError::Failed { payload } => assert_eq!(payload, raw),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unrecognized_status_is_an_error() {
        let (api, _) = ScriptedApi::new(vec![PollResponse {
            status: JobStatus::Other("weird".to_string()),
            report: ModerationReport {
                text_moderation: None,
            },
            raw: serde_json::json!({}),
        }]);
        let service = service_with(api);

        let err = service.moderate("sample").await.unwrap_err();
        match err {
            ModerationError::UnexpectedStatus { status } => assert_eq!(status, "weird"),
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_bound_stops_a_stuck_job() {
        let (api, fetches) = ScriptedApi::new(vec![processing(), processing(), processing()]);
        let service = ModerationService::with_config(
            api,
            PollConfig {
                interval: Duration::from_secs(5),
                max_attempts: 3,
            },
            DEFAULT_REJECTION_THRESHOLD,
        );

        let err = service.moderate("sample").await.unwrap_err();
        assert!(matches!(err, ModerationError::PollTimeout { attempts: 3 }));
        assert_eq!(fetches.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_interpret_rejects_at_threshold() {
        let outcome = interpret(&report_with_score(0.5), 0.2);
        assert_eq!(outcome.status, SampleStatus::Rejected);
        assert_eq!(outcome.rejection_percentage, 50.0);
    }

    #[test]
    fn test_interpret_validates_below_threshold() {
        let outcome = interpret(&report_with_score(0.1), 0.2);
        assert_eq!(outcome.status, SampleStatus::Validated);
        assert!((outcome.rejection_percentage - 10.0).abs() < 1e-9);
        assert_eq!(outcome.category, "Toxic");
    }

    #[test]
    fn test_interpret_tie_keeps_first_maximum() {
        let report = ModerationReport {
            text_moderation: Some(vec![ModerationEntry {
                nsfw_likelihood_score: 0.9,
                items: vec![
                    ModerationItem {
                        category: "A".to_string(),
                        likelihood_score: 0.3,
                    },
                    ModerationItem {
                        category: "B".to_string(),
                        likelihood_score: 0.9,
                    },
                    ModerationItem {
                        category: "C".to_string(),
                        likelihood_score: 0.9,
                    },
                ],
            }]),
        };

        let outcome = interpret(&report, 0.2);
        assert_eq!(outcome.category, "B");
    }

    #[test]
    fn test_interpret_no_items_defaults_to_unknown() {
        let report = ModerationReport {
            text_moderation: Some(vec![ModerationEntry {
                nsfw_likelihood_score: 0.05,
                items: vec![],
            }]),
        };

        let outcome = interpret(&report, 0.2);
        assert_eq!(outcome.category, "Unknown");
        assert_eq!(outcome.status, SampleStatus::Validated);
    }

    #[test]
    fn test_interpret_missing_section_renders_success() {
        let report = ModerationReport {
            text_moderation: None,
        };

        let outcome = interpret(&report, 0.2);
        assert_eq!(outcome.rejection_percentage, 0.0);
        assert_eq!(outcome.category, "Unknown");
        // Literal "success", distinct from the empty-results "succeeded".
        assert_eq!(outcome.status.to_string(), "success");
    }

    #[test]
    fn test_interpret_empty_results_renders_succeeded() {
        let report = ModerationReport {
            text_moderation: Some(vec![]),
        };

        let outcome = interpret(&report, 0.2);
        assert_eq!(outcome.rejection_percentage, 0.0);
        assert_eq!(outcome.category, "Unknown");
        assert_eq!(outcome.status.to_string(), "succeeded");
    }

    #[test]
    fn test_status_labels_are_stable() {
        assert_eq!(SampleStatus::Validated.to_string(), "validated");
        assert_eq!(SampleStatus::Rejected.to_string(), "rejected");
        assert_eq!(SampleStatus::Error.to_string(), "Error");
    }
}
