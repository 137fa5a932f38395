// crates/fixture-keeper-client/src/executor.rs
// ============================================================================
// Module: Resilient Executor
// Description: Bounded retry loop for remote calls with status classification.
// Purpose: Absorb transient server and transport failures without masking 4xx.
// Dependencies: fixture-keeper-core, thiserror, tokio
// ============================================================================

//! ## Overview
//! A call is an operation that yields either a response carrying a status
//! code or a [`TransportError`]. The executor runs it up to
//! `delays.len() + 1` times, sleeping the scheduled delay before each retry:
//!
//! | Attempt result        | Not last attempt | Last attempt          |
//! |-----------------------|------------------|-----------------------|
//! | status < 500          | returned         | returned              |
//! | status >= 500         | retried          | returned as-is        |
//! | transport error       | retried          | [`ExecutorError`]     |

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use fixture_keeper_core::EventSink;
use fixture_keeper_core::FixtureEvent;
use fixture_keeper_core::RequestEvent;
use fixture_keeper_core::RequestOutcome;
use fixture_keeper_core::StatusClass;
use thiserror::Error;
use tokio::time::sleep;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Connection-level failure: no response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self(err.to_string())
    }
}

/// Failure surfaced after the attempt budget is spent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// Every attempt failed without a response.
    #[error("{method} {target} failed after {attempts} attempt(s): {source}")]
    Exhausted {
        /// Request method.
        method: String,
        /// Request target.
        target: String,
        /// Attempts made.
        attempts: u32,
        /// Last transport failure.
        source: TransportError,
    },
}

// ============================================================================
// SECTION: Status Access
// ============================================================================

/// A response that exposes its HTTP status code.
pub trait HasStatus {
    /// Returns the numeric status code.
    fn status_code(&self) -> u16;
}

impl HasStatus for reqwest::Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

impl HasStatus for u16 {
    fn status_code(&self) -> u16 {
        *self
    }
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Delays applied before each retry; the attempt budget is `delays + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before attempt `n + 2` is `delays[n]`.
    delays: Vec<Duration>,
}

impl RetryPolicy {
    /// Builds a policy from an explicit schedule.
    #[must_use]
    pub const fn new(delays: Vec<Duration>) -> Self {
        Self {
            delays,
        }
    }

    /// Three attempts, waiting one then two seconds.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![Duration::from_secs(1), Duration::from_secs(2)])
    }

    /// Single attempt.
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(Vec::new())
    }

    /// Total attempts permitted per call.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        u32::try_from(self.delays.len()).unwrap_or(u32::MAX).saturating_add(1)
    }

    /// Delay to wait after the given one-based attempt, if another is allowed.
    fn delay_after(&self, attempt: u32) -> Option<Duration> {
        let index = usize::try_from(attempt).ok()?.checked_sub(1)?;
        self.delays.get(index).copied()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// SECTION: Labels
// ============================================================================

/// Method and target used to describe a call in events and errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLabel {
    /// Request method.
    pub method: String,
    /// Request target.
    pub target: String,
}

impl RequestLabel {
    /// Builds a label.
    #[must_use]
    pub fn new(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
        }
    }
}

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Runs remote calls under a [`RetryPolicy`], reporting each attempt.
#[derive(Clone)]
pub struct ResilientExecutor {
    /// Retry schedule.
    policy: RetryPolicy,
    /// Attempt observer.
    events: Arc<dyn EventSink>,
}

impl ResilientExecutor {
    /// Builds an executor.
    #[must_use]
    pub fn new(policy: RetryPolicy, events: Arc<dyn EventSink>) -> Self {
        Self {
            policy,
            events,
        }
    }

    /// Returns a copy that makes exactly one attempt per call.
    #[must_use]
    pub fn without_retries(&self) -> Self {
        Self {
            policy: RetryPolicy::disabled(),
            events: Arc::clone(&self.events),
        }
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Executes `operation`, retrying transient outcomes.
    ///
    /// `operation` is invoked once per attempt and must build a fresh request
    /// each time.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Exhausted`] when the final attempt fails
    /// without a response. Responses of any status are returned as `Ok`.
    pub async fn execute<R, F, Fut>(
        &self,
        label: &RequestLabel,
        mut operation: F,
    ) -> Result<R, ExecutorError>
    where
        R: HasStatus,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, TransportError>>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0u32;
        loop {
            attempt = attempt.saturating_add(1);
            let retry_delay = self.policy.delay_after(attempt);
            match operation().await {
                Ok(response) => {
                    let status = response.status_code();
                    let class = StatusClass::of(status);
                    let outcome = match (class, retry_delay) {
                        (StatusClass::Success, _) => RequestOutcome::Completed,
                        (StatusClass::Terminal, _) => RequestOutcome::Rejected,
                        (StatusClass::Transient, Some(_)) => RequestOutcome::Retrying,
                        (StatusClass::Transient, None) => RequestOutcome::Exhausted,
                    };
                    let delay = if class.is_transient() { retry_delay } else { None };
                    self.emit(label, Some(status), attempt, max_attempts, outcome, delay, None);
                    match delay {
                        Some(delay) => sleep(delay).await,
                        None => return Ok(response),
                    }
                }
                Err(err) => {
                    let outcome = if retry_delay.is_some() {
                        RequestOutcome::Retrying
                    } else {
                        RequestOutcome::Exhausted
                    };
                    self.emit(
                        label,
                        None,
                        attempt,
                        max_attempts,
                        outcome,
                        retry_delay,
                        Some(err.0.clone()),
                    );
                    match retry_delay {
                        Some(delay) => sleep(delay).await,
                        None => {
                            return Err(ExecutorError::Exhausted {
                                method: label.method.clone(),
                                target: label.target.clone(),
                                attempts: attempt,
                                source: err,
                            });
                        }
                    }
                }
            }
        }
    }

    /// Records one attempt; a panicking sink is contained.
    #[allow(clippy::too_many_arguments, reason = "Flat event fields keep call sites readable.")]
    fn emit(
        &self,
        label: &RequestLabel,
        status: Option<u16>,
        attempt: u32,
        max_attempts: u32,
        outcome: RequestOutcome,
        retry_delay: Option<Duration>,
        error: Option<String>,
    ) {
        let event = FixtureEvent::Request(RequestEvent {
            method: label.method.clone(),
            target: label.target.clone(),
            status,
            attempt,
            max_attempts,
            outcome,
            retry_delay_ms: retry_delay.map(|delay| u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)),
            error,
        });
        let _ = std::panic::catch_unwind(AssertUnwindSafe(|| self.events.record(&event)));
    }
}
