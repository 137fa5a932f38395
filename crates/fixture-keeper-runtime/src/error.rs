// crates/fixture-keeper-runtime/src/error.rs
// ============================================================================
// Module: Runtime Errors
// Description: Failures while wiring or scoping a fixture run.
// Dependencies: fixture-keeper-core, thiserror
// ============================================================================

//! ## Overview
//! Provisioning failures use [`fixture_keeper_core::FixtureError`]; this type
//! only covers assembling the stack and supervising a scoped run.

use fixture_keeper_core::ServiceError;
use thiserror::Error;

/// Runtime setup and scope errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The configured event log could not be opened.
    #[error("event log unavailable: {0}")]
    Events(String),
    /// The remote service client could not be built.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// The scoped body was cancelled before completing; cleanup still ran.
    #[error("scoped fixture run was cancelled")]
    ScopeCancelled,
}
