// crates/fixture-keeper-ledger/src/ledger.rs
// ============================================================================
// Module: Pending Cleanup Ledger
// Description: Append/remove log of credentials awaiting confirmed deletion.
// Purpose: Survive crashes and concurrent writers within one process.
// Dependencies: fixture-keeper-core, serde_json, thiserror, time
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use fixture_keeper_core::Credential;
use fixture_keeper_core::EventSink;
use fixture_keeper_core::FixtureEvent;
use fixture_keeper_core::LedgerAction;
use fixture_keeper_core::LedgerEvent;
use thiserror::Error;
use time::OffsetDateTime;

use crate::persist::copy_to_free_sibling;
use crate::persist::write_file_atomic;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest ledger file the ledger will parse; anything bigger is treated as corrupt.
pub const MAX_LEDGER_BYTES: u64 = 16 * 1024 * 1024;

/// Suffix of the copies kept when a corrupt ledger is replaced.
const QUARANTINE_SUFFIX: &str = ".corrupt";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Ledger failures on the fallible `try_*` paths.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// File could not be read or written.
    #[error("ledger io error: {0}")]
    Io(String),
    /// File contents are not a valid ledger.
    #[error("ledger corrupt: {0}")]
    Corrupt(String),
    /// Entries could not be serialized.
    #[error("ledger encode error: {0}")]
    Encode(String),
}

// ============================================================================
// SECTION: Ledger
// ============================================================================

/// File-backed ledger of credentials whose remote deletion is still pending.
///
/// # Invariants
/// - Mutations re-read the file under the guard, so entries written by an
///   earlier run are preserved.
/// - An entry is removed only through [`PendingCleanupLedger::remove`] or an
///   explicit [`PendingCleanupLedger::prune_older_than`].
/// - The guard is process-local; two processes sharing one file are not
///   coordinated.
pub struct PendingCleanupLedger {
    /// Ledger file location.
    path: PathBuf,
    /// Serializes every read-modify-write cycle.
    guard: Mutex<()>,
    /// Destination for ledger activity and failures.
    events: Arc<dyn EventSink>,
}

impl PendingCleanupLedger {
    /// Creates a ledger over `path`. The file is created lazily on first append.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>, events: Arc<dyn EventSink>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
            events,
        }
    }

    /// Returns the ledger file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records `credential` unless its identifier is already present.
    ///
    /// Must complete before the matching remote creation call is issued.
    /// Failures are logged and swallowed.
    pub fn append(&self, credential: &Credential) {
        if let Err(err) = self.try_append(credential) {
            self.emit(LedgerAction::WriteFailed, Some(credential.identifier()), Some(&err));
        }
    }

    /// Records `credential`, returning `Ok(false)` when it was already present.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger cannot be read or persisted.
    pub fn try_append(&self, credential: &Credential) -> Result<bool, LedgerError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load_for_update()?;
        if entries.iter().any(|entry| entry.identifier() == credential.identifier()) {
            self.emit(LedgerAction::Duplicate, Some(credential.identifier()), None);
            return Ok(false);
        }
        entries.push(credential.clone());
        self.store(&entries)?;
        self.emit(LedgerAction::Appended, Some(credential.identifier()), None);
        Ok(true)
    }

    /// Removes the entry for `identifier`; unknown identifiers are a no-op.
    ///
    /// Call only after a confirmed remote deletion. Failures are logged and
    /// swallowed.
    pub fn remove(&self, identifier: &str) {
        if let Err(err) = self.try_remove(identifier) {
            self.emit(LedgerAction::WriteFailed, Some(identifier), Some(&err));
        }
    }

    /// Removes the entry for `identifier`, returning whether one was present.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger cannot be read or persisted.
    pub fn try_remove(&self, identifier: &str) -> Result<bool, LedgerError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load_for_update()?;
        let before = entries.len();
        entries.retain(|entry| entry.identifier() != identifier);
        if entries.len() == before {
            self.emit(LedgerAction::Missing, Some(identifier), None);
            return Ok(false);
        }
        self.store(&entries)?;
        self.emit(LedgerAction::Removed, Some(identifier), None);
        Ok(true)
    }

    /// Returns the persisted entries; a missing or unreadable file yields none.
    #[must_use]
    pub fn read_all(&self) -> Vec<Credential> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        match self.load() {
            Ok(entries) => entries,
            Err(err) => {
                self.emit(LedgerAction::ReadFailed, None, Some(&err));
                Vec::new()
            }
        }
    }

    /// Returns true when an entry for `identifier` is persisted.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.read_all().iter().any(|entry| entry.identifier() == identifier)
    }

    /// Drops entries created before `cutoff` and returns them.
    ///
    /// This is an explicit operator action; sweeps never call it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger cannot be read or persisted.
    pub fn prune_older_than(
        &self,
        cutoff: OffsetDateTime,
    ) -> Result<Vec<Credential>, LedgerError> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let entries = self.load_for_update()?;
        let (pruned, kept): (Vec<Credential>, Vec<Credential>) =
            entries.into_iter().partition(|entry| entry.created_at() < cutoff);
        if pruned.is_empty() {
            return Ok(pruned);
        }
        self.store(&kept)?;
        for entry in &pruned {
            self.emit(LedgerAction::Pruned, Some(entry.identifier()), None);
        }
        Ok(pruned)
    }

    // ------------------------------------------------------------------------
    // Internals (caller holds the guard)
    // ------------------------------------------------------------------------

    /// Reads and parses the file.
    fn load(&self) -> Result<Vec<Credential>, LedgerError> {
        let bytes = match fs::metadata(&self.path) {
            Ok(meta) if meta.len() > MAX_LEDGER_BYTES => {
                return Err(LedgerError::Corrupt(format!(
                    "ledger exceeds size limit: {} bytes (max {MAX_LEDGER_BYTES})",
                    meta.len()
                )));
            }
            Ok(_) => fs::read(&self.path).map_err(|err| LedgerError::Io(err.to_string()))?,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(LedgerError::Io(err.to_string())),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let parsed: Vec<Credential> =
            serde_json::from_slice(&bytes).map_err(|err| LedgerError::Corrupt(err.to_string()))?;
        let mut seen = HashSet::new();
        Ok(parsed.into_iter().filter(|entry| seen.insert(entry.identifier().to_string())).collect())
    }

    /// Loads state for a mutation; a corrupt file is set aside and treated as empty.
    fn load_for_update(&self) -> Result<Vec<Credential>, LedgerError> {
        match self.load() {
            Err(LedgerError::Corrupt(reason)) => {
                self.emit(
                    LedgerAction::ReadFailed,
                    None,
                    Some(&LedgerError::Corrupt(reason)),
                );
                self.quarantine();
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Copies the current file next to itself so damaged history survives.
    ///
    /// Each corruption gets its own copy; earlier copies are left untouched.
    fn quarantine(&self) {
        match copy_to_free_sibling(&self.path, QUARANTINE_SUFFIX) {
            Ok(_) => self.emit(LedgerAction::Quarantined, None, None),
            Err(err) => {
                self.emit(LedgerAction::WriteFailed, None, Some(&LedgerError::Io(err.to_string())));
            }
        }
    }

    /// Rewrites the whole file.
    fn store(&self, entries: &[Credential]) -> Result<(), LedgerError> {
        let mut bytes =
            serde_json::to_vec_pretty(entries).map_err(|err| LedgerError::Encode(err.to_string()))?;
        bytes.push(b'\n');
        write_file_atomic(&self.path, &bytes).map_err(|err| LedgerError::Io(err.to_string()))
    }

    /// Emits a ledger event.
    fn emit(&self, action: LedgerAction, identifier: Option<&str>, error: Option<&LedgerError>) {
        self.events.record(&FixtureEvent::Ledger(LedgerEvent {
            action,
            path: self.path.display().to_string(),
            identifier: identifier.map(str::to_string),
            error: error.map(ToString::to_string),
        }));
    }
}
