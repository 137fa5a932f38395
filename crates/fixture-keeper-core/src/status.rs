// crates/fixture-keeper-core/src/status.rs
// ============================================================================
// Module: Status Classification
// Description: Maps remote status codes to retry and cleanup decisions.
// Purpose: Keep transient vs terminal classification in one place.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Status codes are classified once so the executor and the orchestrator agree
//! on what is retryable and what counts as a confirmed deletion.

/// Classification of a remote status code.
///
/// # Invariants
/// - `Transient` is the only class worth retrying.
/// - `Terminal` covers expected client-side outcomes and must never be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 1xx-3xx.
    Success,
    /// 4xx: an expected, final outcome.
    Terminal,
    /// 5xx and anything unrecognized above it.
    Transient,
}

impl StatusClass {
    /// Classifies an HTTP-style status code.
    #[must_use]
    pub const fn of(status: u16) -> Self {
        match status {
            0 ..= 399 => Self::Success,
            400 ..= 499 => Self::Terminal,
            _ => Self::Transient,
        }
    }

    /// Returns true for the retryable class.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Transient)
    }
}

/// Returns true when a delete-self status confirms the account is gone.
#[must_use]
pub const fn is_confirmed_deletion(status: u16) -> bool {
    matches!(status, 200 | 204)
}
