// crates/fixture-keeper-ledger/src/lib.rs
// ============================================================================
// Module: Fixture Keeper Ledger
// Description: Durable, crash-surviving record of pending account deletions.
// Purpose: Record credentials before remote creation so no account is orphaned.
// Dependencies: fixture-keeper-core, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! The ledger is a single JSON file listing every credential whose remote
//! deletion has not been confirmed yet. Callers append an entry *before* the
//! remote creation call and remove it only after a confirmed deletion, so a
//! crash at any point leaves enough information for a later sweep.
//! Invariants:
//! - Every read-modify-write cycle runs under one in-process mutex.
//! - The file is replaced atomically; a torn write never damages prior entries.
//! - The file never holds two entries with the same identifier.
//! - Ledger I/O failures are logged and swallowed by the public API.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod ledger;
mod persist;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use ledger::LedgerError;
pub use ledger::MAX_LEDGER_BYTES;
pub use ledger::PendingCleanupLedger;
