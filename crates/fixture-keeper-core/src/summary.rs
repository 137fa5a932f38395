// crates/fixture-keeper-core/src/summary.rs
// ============================================================================
// Module: Cleanup Summary
// Description: Read-only outcome of one cleanup sweep.
// Purpose: Report deletions and failures without aborting on the first error.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! A [`CleanupSummary`] is produced once per sweep. It never contains secrets;
//! error messages name the account identifier and the failing step only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Summary
// ============================================================================

/// Outcome of a cleanup sweep.
///
/// # Invariants
/// - `accounts_deleted + unreachable + errors.len() <= total_accounts`.
/// - Success holds iff `errors` is empty and every account was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupSummary {
    /// Size of the sweep set.
    total_accounts: usize,
    /// Accounts whose remote deletion was confirmed.
    accounts_deleted: usize,
    /// Ledger-only accounts whose login was refused (possibly never created).
    unreachable: usize,
    /// One message per failed account resolution.
    errors: Vec<String>,
    /// Sweep start.
    #[serde(with = "time::serde::rfc3339")]
    start_time: OffsetDateTime,
    /// Sweep end.
    #[serde(with = "time::serde::rfc3339")]
    end_time: OffsetDateTime,
    /// Wall-clock duration in milliseconds.
    duration_ms: u64,
}

impl CleanupSummary {
    /// Builds a summary; the duration is derived from the two timestamps.
    #[must_use]
    pub fn new(
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
        total_accounts: usize,
        accounts_deleted: usize,
        unreachable: usize,
        errors: Vec<String>,
    ) -> Self {
        let elapsed = Duration::try_from(end_time - start_time).unwrap_or_default();
        Self {
            total_accounts,
            accounts_deleted,
            unreachable,
            errors,
            start_time,
            end_time,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Summary of a sweep over an empty set.
    #[must_use]
    pub fn empty(at: OffsetDateTime) -> Self {
        Self::new(at, at, 0, 0, 0, Vec::new())
    }

    /// Returns the sweep set size.
    #[must_use]
    pub const fn total_accounts(&self) -> usize {
        self.total_accounts
    }

    /// Returns the number of confirmed deletions.
    #[must_use]
    pub const fn accounts_deleted(&self) -> usize {
        self.accounts_deleted
    }

    /// Returns the number of ledger-only accounts whose login was refused.
    #[must_use]
    pub const fn unreachable(&self) -> usize {
        self.unreachable
    }

    /// Returns the per-account failure messages.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns the sweep start time.
    #[must_use]
    pub const fn start_time(&self) -> OffsetDateTime {
        self.start_time
    }

    /// Returns the sweep end time.
    #[must_use]
    pub const fn end_time(&self) -> OffsetDateTime {
        self.end_time
    }

    /// Returns the sweep duration.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// True when no errors were recorded and every account was deleted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.accounts_deleted == self.total_accounts
    }
}
