// crates/fixture-keeper-core/src/events.rs
// ============================================================================
// Module: Fixture Events
// Description: Structured observability events and sink implementations.
// Purpose: Give the executor, ledger, and orchestrator an injected log target.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Components receive an [`EventSink`] at construction time instead of logging
//! through ambient globals. Sinks must swallow their own failures: a closed
//! stderr or a full disk never turns into an error for the caller.
//! Invariants:
//! - Events never carry secrets or session tokens.
//! - `record` is infallible from the caller's point of view.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

// ============================================================================
// SECTION: Event Payloads
// ============================================================================

/// Structured event emitted by Fixture Keeper components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FixtureEvent {
    /// One executor attempt.
    Request(RequestEvent),
    /// Ledger mutation or failure.
    Ledger(LedgerEvent),
    /// Account lifecycle step.
    Account(AccountEvent),
    /// Sweep boundary.
    Sweep(SweepEvent),
}

/// Result classification for a single executor attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// Success status returned to the caller.
    Completed,
    /// Terminal client-side status returned without retry.
    Rejected,
    /// Transient failure; another attempt follows after a delay.
    Retrying,
    /// Transient failure on the final attempt.
    Exhausted,
}

/// Executor attempt record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestEvent {
    /// Request method (for example `POST`).
    pub method: String,
    /// Request target path or URL.
    pub target: String,
    /// Response status when a response was received.
    pub status: Option<u16>,
    /// One-based attempt number.
    pub attempt: u32,
    /// Attempt budget for this request.
    pub max_attempts: u32,
    /// Attempt classification.
    pub outcome: RequestOutcome,
    /// Delay before the next attempt, when retrying.
    pub retry_delay_ms: Option<u64>,
    /// Transport error text when no response was received.
    pub error: Option<String>,
}

/// Ledger activity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerAction {
    /// Entry persisted.
    Appended,
    /// Append ignored; identifier already present.
    Duplicate,
    /// Entry removed after confirmed deletion.
    Removed,
    /// Remove ignored; identifier not present.
    Missing,
    /// Entries purged by an explicit prune.
    Pruned,
    /// Persisted state could not be read or parsed.
    ReadFailed,
    /// New state could not be persisted.
    WriteFailed,
    /// Corrupt ledger copied aside before being replaced.
    Quarantined,
}

/// Ledger activity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEvent {
    /// Activity kind.
    pub action: LedgerAction,
    /// Ledger file path.
    pub path: String,
    /// Affected identifier, when the action concerns one entry.
    pub identifier: Option<String>,
    /// Failure detail.
    pub error: Option<String>,
}

/// Account lifecycle steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountAction {
    /// Created remotely and logged in.
    Provisioned,
    /// Could not obtain a session for a new fixture.
    ProvisionFailed,
    /// Registered by the caller with an existing session.
    Tracked,
    /// Remote deletion confirmed.
    Deleted,
    /// Login or deletion failed; ledger entry retained.
    DeleteFailed,
    /// Ledger-only entry whose login was refused.
    Unreachable,
}

/// Account lifecycle record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountEvent {
    /// Lifecycle step.
    pub action: AccountAction,
    /// Account identifier.
    pub identifier: String,
    /// Optional human-readable detail.
    pub detail: Option<String>,
}

/// Sweep boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepPhase {
    /// Sweep set computed.
    Started,
    /// Every account resolved.
    Finished,
}

/// Sweep boundary record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepEvent {
    /// Boundary.
    pub phase: SweepPhase,
    /// Sweep set size.
    pub total: usize,
    /// Confirmed deletions so far.
    pub deleted: usize,
    /// Refused logins for ledger-only entries.
    pub unreachable: usize,
    /// Failed resolutions.
    pub errors: usize,
    /// Elapsed time, on `Finished`.
    pub duration_ms: Option<u64>,
}

// ============================================================================
// SECTION: Sink Trait
// ============================================================================

/// Destination for [`FixtureEvent`] records.
pub trait EventSink: Send + Sync {
    /// Records an event. Implementations must not panic or report failures.
    fn record(&self, event: &FixtureEvent);
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

/// Discards every event.
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record(&self, _event: &FixtureEvent) {}
}

/// Writes events as JSON lines to stderr.
pub struct StderrEventSink;

impl EventSink for StderrEventSink {
    fn record(&self, event: &FixtureEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            let mut stderr = io::stderr().lock();
            let _ = writeln!(stderr, "{line}");
        }
    }
}

/// Appends events as JSON lines to a file.
pub struct JsonLinesEventSink {
    /// Open append handle.
    file: Mutex<File>,
}

impl JsonLinesEventSink {
    /// Opens or creates the event log.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the file cannot be opened for appending.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl EventSink for JsonLinesEventSink {
    fn record(&self, event: &FixtureEvent) {
        if let Ok(line) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{line}");
            let _ = file.flush();
        }
    }
}

/// Keeps events in memory for later inspection.
#[derive(Default)]
pub struct MemoryEventSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<FixtureEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<FixtureEvent> {
        self.events.lock().map_or_else(|_| Vec::new(), |events| events.clone())
    }

    /// Returns the recorded executor attempts.
    #[must_use]
    pub fn requests(&self) -> Vec<RequestEvent> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FixtureEvent::Request(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Returns the recorded ledger activity.
    #[must_use]
    pub fn ledger(&self) -> Vec<LedgerEvent> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FixtureEvent::Ledger(ledger) => Some(ledger),
                _ => None,
            })
            .collect()
    }

    /// Returns the recorded account lifecycle steps.
    #[must_use]
    pub fn accounts(&self) -> Vec<AccountEvent> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                FixtureEvent::Account(account) => Some(account),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for MemoryEventSink {
    fn record(&self, event: &FixtureEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
