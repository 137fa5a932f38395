// crates/fixture-keeper-runtime/src/registry.rs
// ============================================================================
// Module: Account Registry
// Description: Accounts provisioned by the current process.
// Dependencies: fixture-keeper-core
// ============================================================================

//! ## Overview
//! The registry is process-local and never persisted; the ledger carries the
//! durable record. Entries are not deduplicated on insert.

use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use fixture_keeper_core::TrackedAccount;

/// Concurrency-safe list of tracked accounts.
#[derive(Default)]
pub struct AccountRegistry {
    /// Accounts in insertion order.
    accounts: Mutex<Vec<TrackedAccount>>,
}

impl AccountRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account.
    pub fn add(&self, account: TrackedAccount) {
        self.lock().push(account);
    }

    /// Returns a snapshot of every account.
    #[must_use]
    pub fn all(&self) -> Vec<TrackedAccount> {
        self.lock().clone()
    }

    /// Returns the number of tracked entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Returns tracked identifiers in insertion order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<String> {
        self.lock().iter().map(|account| account.identifier().to_string()).collect()
    }

    /// Drops every entry for `identifier`, returning how many were removed.
    pub fn remove(&self, identifier: &str) -> usize {
        let mut accounts = self.lock();
        let before = accounts.len();
        accounts.retain(|account| account.identifier() != identifier);
        before - accounts.len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TrackedAccount>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
