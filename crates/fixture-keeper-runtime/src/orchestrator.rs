// crates/fixture-keeper-runtime/src/orchestrator.rs
// ============================================================================
// Module: Cleanup Orchestrator
// Description: Merge registry and ledger, then resolve each account in order.
// Purpose: Drive every pending obligation toward confirmed remote deletion.
// Dependencies: fixture-keeper-core, fixture-keeper-ledger, time, tokio
// ============================================================================

//! ## Overview
//! A sweep covers `R ∪ (L \ keys(R))`: every account registered in this run,
//! plus ledger entries left behind by earlier runs. Each account is resolved
//! by logging in and deleting itself. Resolutions are sequential with a fixed
//! pause between them.
//!
//! Resolution outcomes:
//! - deleted: delete-self returned 200 or 204; ledger and registry entries are
//!   dropped.
//! - unreachable: a ledger-only entry whose login was refused with a 4xx. The
//!   account may never have been created. The entry is kept.
//! - failed: anything else; recorded as an error, the entry is kept.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use fixture_keeper_core::AccountAction;
use fixture_keeper_core::AccountEvent;
use fixture_keeper_core::AccountService;
use fixture_keeper_core::CleanupSummary;
use fixture_keeper_core::Credential;
use fixture_keeper_core::EventSink;
use fixture_keeper_core::FixtureEvent;
use fixture_keeper_core::LoginReply;
use fixture_keeper_core::SessionToken;
use fixture_keeper_core::StatusClass;
use fixture_keeper_core::SweepEvent;
use fixture_keeper_core::SweepPhase;
use fixture_keeper_core::TrackedAccount;
use fixture_keeper_core::status::is_confirmed_deletion;
use fixture_keeper_ledger::PendingCleanupLedger;
use time::OffsetDateTime;
use tokio::time::sleep;

use crate::registry::AccountRegistry;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of resolving one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Remote deletion confirmed.
    Deleted,
    /// Ledger-only account whose login was refused.
    Unreachable {
        /// Login status.
        status: u16,
    },
    /// Login or deletion failed; the message names the account.
    Failed(String),
}

/// Where a sweep item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Provisioned or tracked in this process.
    Registry,
    /// Only known from the durable ledger.
    Ledger,
}

/// One account scheduled for resolution.
#[derive(Debug, Clone)]
pub(crate) struct SweepItem {
    /// Credentials used to log in.
    pub(crate) credential: Credential,
    /// Source collection.
    pub(crate) origin: Origin,
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Sweeps fixture accounts to deletion.
pub struct CleanupOrchestrator {
    /// Remote service boundary.
    service: Arc<dyn AccountService>,
    /// Durable obligations.
    ledger: Arc<PendingCleanupLedger>,
    /// Accounts from this run.
    registry: Arc<AccountRegistry>,
    /// Pause between successive resolutions.
    pacing: Duration,
    /// Lifecycle observer.
    events: Arc<dyn EventSink>,
}

impl CleanupOrchestrator {
    /// Creates an orchestrator over shared collaborators.
    #[must_use]
    pub fn new(
        service: Arc<dyn AccountService>,
        ledger: Arc<PendingCleanupLedger>,
        registry: Arc<AccountRegistry>,
        pacing: Duration,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            service,
            ledger,
            registry,
            pacing,
            events,
        }
    }

    /// Resolves every registered account and every ledger leftover.
    pub async fn sweep(&self) -> CleanupSummary {
        let items = merge_sweep_set(&self.registry.all(), self.ledger.read_all());
        self.run(items).await
    }

    /// Resolves registered accounts created more than `age` ago.
    ///
    /// Ledger-only entries are excluded: their creation time was recorded by
    /// another process.
    pub async fn cleanup_older_than(&self, age: Duration) -> CleanupSummary {
        let age = time::Duration::try_from(age).unwrap_or(time::Duration::MAX);
        let Some(cutoff) = OffsetDateTime::now_utc().checked_sub(age) else {
            return self.run(Vec::new()).await;
        };
        let aged: Vec<TrackedAccount> = self
            .registry
            .all()
            .into_iter()
            .filter(|account| account.credential().created_at() < cutoff)
            .collect();
        self.run(merge_sweep_set(&aged, Vec::new())).await
    }

    /// Resolves a single account the caller holds credentials for.
    ///
    /// A refused login is a failure here; only sweeps treat ledger leftovers
    /// as unreachable.
    pub async fn delete(&self, credential: &Credential) -> Resolution {
        self.resolve(&SweepItem {
            credential: credential.clone(),
            origin: Origin::Registry,
        })
        .await
    }

    async fn run(&self, items: Vec<SweepItem>) -> CleanupSummary {
        let start = OffsetDateTime::now_utc();
        let total = items.len();
        self.emit_sweep(SweepPhase::Started, total, 0, 0, 0, None);

        let mut deleted = 0usize;
        let mut unreachable = 0usize;
        let mut errors = Vec::new();
        for (index, item) in items.iter().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                sleep(self.pacing).await;
            }
            match self.resolve(item).await {
                Resolution::Deleted => deleted += 1,
                Resolution::Unreachable {
                    ..
                } => unreachable += 1,
                Resolution::Failed(message) => errors.push(message),
            }
        }

        let summary =
            CleanupSummary::new(start, OffsetDateTime::now_utc(), total, deleted, unreachable, errors);
        self.emit_sweep(
            SweepPhase::Finished,
            total,
            deleted,
            unreachable,
            summary.errors().len(),
            Some(summary.duration()),
        );
        summary
    }

    async fn resolve(&self, item: &SweepItem) -> Resolution {
        let identifier = item.credential.identifier();
        let resolution = match self.service.login(identifier, item.credential.secret()).await {
            Ok(LoginReply::Authenticated(session)) => self.delete_with(identifier, &session).await,
            Ok(LoginReply::Refused {
                status,
            }) if item.origin == Origin::Ledger
                && StatusClass::of(status) == StatusClass::Terminal =>
            {
                Resolution::Unreachable {
                    status,
                }
            }
            Ok(LoginReply::Refused {
                status,
            }) => Resolution::Failed(format!("{identifier}: login refused with status {status}")),
            Err(err) => Resolution::Failed(format!("{identifier}: login failed: {err}")),
        };
        self.emit_account(identifier, &resolution);
        resolution
    }

    async fn delete_with(&self, identifier: &str, session: &SessionToken) -> Resolution {
        match self.service.delete_self(session).await {
            Ok(status) if is_confirmed_deletion(status) => {
                self.ledger.remove(identifier);
                self.registry.remove(identifier);
                Resolution::Deleted
            }
            Ok(status) => {
                Resolution::Failed(format!("{identifier}: delete-self returned status {status}"))
            }
            Err(err) => Resolution::Failed(format!("{identifier}: delete-self failed: {err}")),
        }
    }

    fn emit_account(&self, identifier: &str, resolution: &Resolution) {
        let (action, detail) = match resolution {
            Resolution::Deleted => (AccountAction::Deleted, None),
            Resolution::Unreachable {
                status,
            } => (AccountAction::Unreachable, Some(format!("login refused with status {status}"))),
            Resolution::Failed(message) => (AccountAction::DeleteFailed, Some(message.clone())),
        };
        self.events.record(&FixtureEvent::Account(AccountEvent {
            action,
            identifier: identifier.to_string(),
            detail,
        }));
    }

    fn emit_sweep(
        &self,
        phase: SweepPhase,
        total: usize,
        deleted: usize,
        unreachable: usize,
        errors: usize,
        duration: Option<Duration>,
    ) {
        self.events.record(&FixtureEvent::Sweep(SweepEvent {
            phase,
            total,
            deleted,
            unreachable,
            errors,
            duration_ms: duration.map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
        }));
    }
}

// ============================================================================
// SECTION: Merge
// ============================================================================

/// Builds `R ∪ (L \ keys(R))`, keeping the first occurrence of each identifier.
pub(crate) fn merge_sweep_set(
    registered: &[TrackedAccount],
    pending: Vec<Credential>,
) -> Vec<SweepItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(registered.len() + pending.len());
    for account in registered {
        if seen.insert(account.identifier().to_string()) {
            items.push(SweepItem {
                credential: account.credential().clone(),
                origin: Origin::Registry,
            });
        }
    }
    for credential in pending {
        if seen.insert(credential.identifier().to_string()) {
            items.push(SweepItem {
                credential,
                origin: Origin::Ledger,
            });
        }
    }
    items
}
