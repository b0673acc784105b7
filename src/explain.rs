//! Worked-explanation generation
//!
//! Builds a deterministic prompt for a problem and asks the language model
//! for a step-by-step solution. The whole attempt loop runs under a single
//! timeout; transient provider failures are retried with a fixed delay.

use crate::llm::{LlmError, LlmErrorKind, LlmRequest};
use crate::problems::ProblemRecord;
use crate::runtime::LlmClient;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, timeout, Instant};

pub const EXPLANATION_TIMEOUT: Duration = Duration::from_secs(15);
pub const MAX_ATTEMPTS: u32 = 5;
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Timeout and retry bounds for one explanation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplanationPolicy {
    /// Bound on the entire request, retries included
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for ExplanationPolicy {
    fn default() -> Self {
        Self {
            timeout: EXPLANATION_TIMEOUT,
            max_attempts: MAX_ATTEMPTS,
            retry_delay: RETRY_DELAY,
        }
    }
}

/// Why no explanation could be produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplanationFailure {
    #[error("explanation timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider unavailable after {attempts} attempts (last: {last_kind:?})")]
    Unavailable {
        attempts: u32,
        last_kind: LlmErrorKind,
    },

    #[error("provider rejected the request: {message}")]
    Rejected { message: String },
}

impl ExplanationFailure {
    /// The provider kept signalling a rate limit until attempts ran out
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            ExplanationFailure::Unavailable {
                last_kind: LlmErrorKind::RateLimit,
                ..
            }
        )
    }
}

/// Prompt asking for a concise worked solution that arrives at the known answer
pub fn build_prompt(problem: &ProblemRecord) -> String {
    format!(
        "Реши задачу ЕГЭ по физике. Требования:\n\
         1. Пошаговое объяснение\n\
         2. Использование формул\n\
         3. Логические выводы\n\
         4. Ответ должен быть кратким\n\
         5. Окончательный ответ: {answer}\n\n\
         Задача: {question}",
        answer = problem.answer,
        question = problem.question,
    )
}

/// Explanation adapter over any LLM client
pub struct ExplanationService<L: LlmClient> {
    llm: L,
    policy: ExplanationPolicy,
}

impl<L: LlmClient> ExplanationService<L> {
    pub fn new(llm: L, policy: ExplanationPolicy) -> Self {
        Self { llm, policy }
    }

    /// Generate an explanation for `problem`.
    ///
    /// Returns the first non-empty response, trimmed. No caching: every call
    /// reaches the provider.
    pub async fn explain(&self, problem: &ProblemRecord) -> Result<String, ExplanationFailure> {
        let request = LlmRequest::user_prompt(build_prompt(problem));
        let start = Instant::now();

        let outcome = match timeout(self.policy.timeout, self.attempt_loop(&request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ExplanationFailure::Timeout(self.policy.timeout)),
        };

        match &outcome {
            Ok(text) => tracing::info!(
                duration_ms = %start.elapsed().as_millis(),
                chars = text.chars().count(),
                "Explanation generated"
            ),
            Err(failure) => tracing::warn!(
                duration_ms = %start.elapsed().as_millis(),
                error = %failure,
                "Explanation failed"
            ),
        }

        outcome
    }

    async fn attempt_loop(&self, request: &LlmRequest) -> Result<String, ExplanationFailure> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match self.llm.complete(request).await {
                Ok(response) => {
                    let text = response.text.trim();
                    if !text.is_empty() {
                        return Ok(text.to_string());
                    }
                    LlmError::empty_response("Provider returned no text")
                }
                Err(e) => e,
            };

            if !error.kind.is_retryable() {
                return Err(ExplanationFailure::Rejected {
                    message: error.message,
                });
            }

            if attempt >= max_attempts {
                return Err(ExplanationFailure::Unavailable {
                    attempts: attempt,
                    last_kind: error.kind,
                });
            }

            tracing::warn!(
                attempt,
                max_attempts,
                kind = ?error.kind,
                retry_after = ?error.retry_after,
                error = %error.message,
                "Explanation attempt failed, retrying"
            );
            sleep(self.policy.retry_delay).await;
        }
    }
}
