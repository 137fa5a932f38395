// crates/fixture-keeper-runtime/src/lib.rs
// ============================================================================
// Module: Fixture Keeper Runtime
// Description: Account registry, cleanup orchestration, and run scoping.
// Purpose: Provide the per-run fixture service object used by test code.
// Dependencies: fixture-keeper-{client,config,core,ledger}, rand, tokio
// ============================================================================

//! ## Overview
//! [`FixtureAccounts`] is constructed once per test run and passed to every
//! scenario that needs fixture accounts. It writes each credential to the
//! [`fixture_keeper_ledger::PendingCleanupLedger`] before the remote creation
//! call, keeps successfully provisioned accounts in an [`AccountRegistry`], and
//! delegates teardown to the [`CleanupOrchestrator`].
//!
//! Teardown is guaranteed by [`FixtureAccounts::run_scoped`]; the
//! [`ShutdownHook`] is an additional best-effort trigger for interrupted runs.
//! Invariants:
//! - A ledger entry is removed only after the remote service confirmed deletion.
//! - Sweeps are sequential and paced.
//! - One account's failure never aborts the rest of a sweep.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod accounts;
pub mod error;
pub mod identity;
pub mod orchestrator;
pub mod registry;
pub mod report;
pub mod shutdown;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use accounts::FixtureAccounts;
pub use accounts::FixtureOptions;
pub use accounts::ScopedRun;
pub use accounts::event_sink;
pub use error::RuntimeError;
pub use identity::IdentityFactory;
pub use orchestrator::CleanupOrchestrator;
pub use orchestrator::Resolution;
pub use registry::AccountRegistry;
pub use report::SUMMARY_JSON;
pub use report::SUMMARY_MARKDOWN;
pub use report::write_summary;
pub use shutdown::AfterSweep;
pub use shutdown::INTERRUPTED_EXIT_CODE;
pub use shutdown::ShutdownHook;
