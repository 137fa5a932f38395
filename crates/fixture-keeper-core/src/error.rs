// crates/fixture-keeper-core/src/error.rs
// ============================================================================
// Module: Fixture Errors
// Description: Fatal errors surfaced to calling test code.
// Purpose: Propagate fixture-creation failures; cleanup failures never use this.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Errors returned to test code when a fixture cannot be provisioned.

use thiserror::Error;

/// Errors that abort a fixture-creation call.
///
/// # Invariants
/// - Cleanup failures are reported through summaries, never through this type.
/// - Transport and decode failures during provisioning are folded into
///   [`FixtureError::Provision`] together with the identifier that was lost.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixtureError {
    /// No session could be obtained for a newly requested account.
    #[error("fixture provisioning failed for {identifier}: {reason}")]
    Provision {
        /// Identifier of the account that was requested.
        identifier: String,
        /// Last failure observed.
        reason: String,
    },
}
