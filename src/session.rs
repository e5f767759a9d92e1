//! Generation session state
//!
//! Transient holder of the most recent generation result plus the status
//! state machine around it. At most one generation request is in flight at a
//! time; a submit while one is pending is a no-op, as is a submit with an
//! empty prompt.
//!
//! The API is split-phase ([`GenerationSession::begin`] /
//! [`GenerationSession::complete`]) so a caller that guards the session with
//! a lock can release it across the provider await while the state machine
//! still forbids overlapping requests. [`GenerationSession::submit`] drives
//! both phases for embeddings that own the session directly.

use crate::ai::{AiResult, AiService, RegexSolution};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Generic message shown for any generation failure; the distinguishing
/// detail is only logged.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate solution. Please check your API key and try again.";

/// Lifecycle of the current generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// In-memory store of the last generation result and its status
#[derive(Debug, Default)]
pub struct GenerationSession {
    status: GenerationStatus,
    result: Option<RegexSolution>,
    error_message: Option<String>,
}

impl GenerationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    /// The last successfully generated solution, retained across failed
    /// regenerations until replaced wholesale by the next success.
    pub fn result(&self) -> Option<&RegexSolution> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Try to start a generation request.
    ///
    /// Returns `false` without any state change when the prompt is empty or
    /// whitespace-only, or when a request is already in flight. Otherwise
    /// transitions to [`GenerationStatus::Loading`] and clears the previous
    /// error.
    pub fn begin(&mut self, prompt: &str) -> bool {
        if prompt.trim().is_empty() {
            return false;
        }
        if self.status == GenerationStatus::Loading {
            return false;
        }

        self.status = GenerationStatus::Loading;
        self.error_message = None;
        true
    }

    /// Record the outcome of the in-flight request.
    pub fn complete(&mut self, outcome: AiResult<RegexSolution>) {
        match outcome {
            Ok(solution) => {
                info!("Generation succeeded, replacing stored result");
                self.result = Some(solution);
                self.status = GenerationStatus::Success;
            }
            Err(err) => {
                error!("Pattern generation failed: {}", err);
                self.error_message = Some(GENERATION_FAILED_MESSAGE.to_string());
                self.status = GenerationStatus::Error;
            }
        }
    }

    /// Drive one full submit cycle against the given service.
    ///
    /// Rejected submits (empty prompt, request in flight) return the current
    /// status unchanged and issue no request.
    pub async fn submit(&mut self, service: &dyn AiService, prompt: &str) -> GenerationStatus {
        if !self.begin(prompt) {
            return self.status;
        }

        let outcome = service.generate_solution(prompt).await;
        self.complete(outcome);
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiConfig, AiError, AiService};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubService {
        config: AiConfig,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubService {
        fn new(fail: bool) -> Self {
            Self {
                config: AiConfig {
                    api_key: "stub".to_string(),
                    model: "stub-model".to_string(),
                    max_tokens: None,
                    temperature: None,
                    timeout_seconds: 1,
                },
                fail,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AiService for StubService {
        async fn generate_solution(&self, _prompt: &str) -> AiResult<RegexSolution> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AiError::ApiError("stubbed provider failure".to_string()))
            } else {
                Ok(sample_solution())
            }
        }

        fn config(&self) -> &AiConfig {
            &self.config
        }
    }

    fn sample_solution() -> RegexSolution {
        RegexSolution {
            pattern: r"\+[^+]*$".to_string(),
            csharp_code: "var m = Regex.Match(input, @\"\\+[^+]*$\");".to_string(),
            explanation: "Matches from the last plus sign to the end.".to_string(),
            preview_pattern: Some(r"\+[^+]*$".to_string()),
        }
    }

    #[test]
    fn test_initial_state() {
        let session = GenerationSession::new();
        assert_eq!(session.status(), GenerationStatus::Idle);
        assert!(session.result().is_none());
        assert!(session.error_message().is_none());
    }

    #[test]
    fn test_empty_prompt_is_rejected() {
        let mut session = GenerationSession::new();
        assert!(!session.begin(""));
        assert!(!session.begin("   \n\t"));
        assert_eq!(session.status(), GenerationStatus::Idle);
    }

    #[test]
    fn test_begin_while_loading_is_rejected() {
        let mut session = GenerationSession::new();
        assert!(session.begin("first"));
        assert_eq!(session.status(), GenerationStatus::Loading);
        assert!(!session.begin("second"));
        assert_eq!(session.status(), GenerationStatus::Loading);
    }

    #[tokio::test]
    async fn test_successful_submit_stores_result() {
        let service = StubService::new(false);
        let mut session = GenerationSession::new();

        let status = session.submit(&service, "match the last plus").await;

        assert_eq!(status, GenerationStatus::Success);
        assert_eq!(session.result(), Some(&sample_solution()));
        assert!(session.error_message().is_none());
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_submit_sets_error_and_keeps_result() {
        let ok_service = StubService::new(false);
        let failing_service = StubService::new(true);
        let mut session = GenerationSession::new();

        session.submit(&ok_service, "first request").await;
        let status = session.submit(&failing_service, "second request").await;

        assert_eq!(status, GenerationStatus::Error);
        assert_eq!(session.error_message(), Some(GENERATION_FAILED_MESSAGE));
        // The previous result stays rendered behind the error banner.
        assert_eq!(session.result(), Some(&sample_solution()));
    }

    #[tokio::test]
    async fn test_whitespace_prompt_issues_no_request() {
        let service = StubService::new(false);
        let mut session = GenerationSession::new();

        let status = session.submit(&service, "   ").await;

        assert_eq!(status, GenerationStatus::Idle);
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_resubmit_after_error_recovers() {
        let failing_service = StubService::new(true);
        let ok_service = StubService::new(false);
        let mut session = GenerationSession::new();

        session.submit(&failing_service, "will fail").await;
        assert_eq!(session.status(), GenerationStatus::Error);

        let status = session.submit(&ok_service, "will succeed").await;
        assert_eq!(status, GenerationStatus::Success);
        assert!(session.error_message().is_none());
    }

    #[test]
    fn test_begin_clears_previous_error() {
        let mut session = GenerationSession::new();
        session.complete(Err(AiError::AuthenticationError));
        assert_eq!(session.status(), GenerationStatus::Error);

        assert!(session.begin("retry"));
        assert_eq!(session.status(), GenerationStatus::Loading);
        assert!(session.error_message().is_none());
    }
}
