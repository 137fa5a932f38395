// crates/fixture-keeper-runtime/src/accounts.rs
// ============================================================================
// Module: Fixture Accounts
// Description: Per-run service object exposed to test code.
// Purpose: Provision fixtures write-ahead and guarantee their teardown.
// Dependencies: fixture-keeper-{client,config,core,ledger}, tokio
// ============================================================================

//! ## Overview
//! Provisioning order for [`FixtureAccounts::create_and_track`]:
//! 1. generate a credential;
//! 2. append it to the ledger (this completes before any remote call);
//! 3. create the account remotely;
//! 4. log in, even if creation looked unsuccessful, since a lost response may
//!    still have created the account;
//! 5. register the account with its session.
//!
//! If no session can be obtained the call fails and the ledger entry stays for
//! a later sweep.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use fixture_keeper_client::HttpAccountService;
use fixture_keeper_client::ResilientExecutor;
use fixture_keeper_client::RetryPolicy;
use fixture_keeper_client::ServiceEndpoints;
use fixture_keeper_config::EventsConfig;
use fixture_keeper_config::FixtureKeeperConfig;
use fixture_keeper_core::AccountAction;
use fixture_keeper_core::AccountEvent;
use fixture_keeper_core::AccountProfile;
use fixture_keeper_core::AccountService;
use fixture_keeper_core::CleanupSummary;
use fixture_keeper_core::Credential;
use fixture_keeper_core::EventSink;
use fixture_keeper_core::FixtureError;
use fixture_keeper_core::FixtureEvent;
use fixture_keeper_core::JsonLinesEventSink;
use fixture_keeper_core::LoginReply;
use fixture_keeper_core::NoopEventSink;
use fixture_keeper_core::Secret;
use fixture_keeper_core::ServiceError;
use fixture_keeper_core::SessionToken;
use fixture_keeper_core::StderrEventSink;
use fixture_keeper_core::TrackedAccount;
use fixture_keeper_ledger::PendingCleanupLedger;

use crate::error::RuntimeError;
use crate::identity::IdentityFactory;
use crate::orchestrator::CleanupOrchestrator;
use crate::orchestrator::Resolution;
use crate::registry::AccountRegistry;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Plain values that shape fixture generation and sweeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureOptions {
    /// Pause between sweep resolutions.
    pub pacing: Duration,
    /// Domain for generated identifiers.
    pub email_domain: String,
    /// Profile sent on creation.
    pub profile: AccountProfile,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(250),
            email_domain: "fixtures.test".to_string(),
            profile: AccountProfile::default(),
        }
    }
}

/// Output of a scoped run together with the sweep that closed it.
#[derive(Debug)]
pub struct ScopedRun<T> {
    /// Value returned by the scoped body.
    pub output: T,
    /// Cleanup performed after the body finished.
    pub summary: CleanupSummary,
}

// ============================================================================
// SECTION: Service Object
// ============================================================================

/// Fixture lifecycle manager for one test run.
pub struct FixtureAccounts {
    /// Remote service boundary.
    service: Arc<dyn AccountService>,
    /// Durable obligations.
    ledger: Arc<PendingCleanupLedger>,
    /// Accounts from this run.
    registry: Arc<AccountRegistry>,
    /// Sweep driver.
    orchestrator: CleanupOrchestrator,
    /// Credential generator.
    identities: IdentityFactory,
    /// Lifecycle observer.
    events: Arc<dyn EventSink>,
}

impl FixtureAccounts {
    /// Assembles a run context from its collaborators.
    #[must_use]
    pub fn new(
        service: Arc<dyn AccountService>,
        ledger: PendingCleanupLedger,
        options: FixtureOptions,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let ledger = Arc::new(ledger);
        let registry = Arc::new(AccountRegistry::new());
        let orchestrator = CleanupOrchestrator::new(
            Arc::clone(&service),
            Arc::clone(&ledger),
            Arc::clone(&registry),
            options.pacing,
            Arc::clone(&events),
        );
        Self {
            service,
            ledger,
            registry,
            orchestrator,
            identities: IdentityFactory::new(options.email_domain, options.profile),
            events,
        }
    }

    /// Wires the HTTP client, ledger, and event sink from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the event log or HTTP client cannot be set up.
    pub fn from_config(config: &FixtureKeeperConfig) -> Result<Self, RuntimeError> {
        let events = event_sink(&config.events)?;
        let executor =
            ResilientExecutor::new(RetryPolicy::new(config.retry_delays()), Arc::clone(&events));
        let endpoints = ServiceEndpoints {
            register: config.service.register_path.clone(),
            login: config.service.login_path.clone(),
            delete_self: config.service.delete_self_path.clone(),
            session_field: config.service.session_field.clone(),
        };
        let service = HttpAccountService::new(
            &config.service.base_url,
            endpoints,
            config.request_timeout(),
            executor,
        )?;
        let ledger = PendingCleanupLedger::open(config.ledger.path.clone(), Arc::clone(&events));
        let options = FixtureOptions {
            pacing: config.sweep_pacing(),
            email_domain: config.accounts.email_domain.clone(),
            profile: AccountProfile {
                first_name: config.accounts.first_name.clone(),
                last_name: config.accounts.last_name.clone(),
            },
        };
        Ok(Self::new(Arc::new(service), ledger, options, events))
    }

    /// Provisions a fresh account and tracks it for cleanup.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Provision`] when no session could be obtained.
    /// The credential stays in the ledger.
    pub async fn create_and_track(&self, prefix: &str) -> Result<TrackedAccount, FixtureError> {
        let credential = self.identities.credential(prefix);
        self.ledger.append(&credential);

        let created = self.service.create_account(&credential, self.identities.profile()).await;
        let login = self.service.login(credential.identifier(), credential.secret()).await;
        match login {
            Ok(LoginReply::Authenticated(session)) => {
                let account = TrackedAccount::new(credential, session);
                self.registry.add(account.clone());
                self.emit(AccountAction::Provisioned, account.identifier(), None);
                Ok(account)
            }
            other => {
                let identifier = credential.identifier().to_string();
                let reason = provision_failure(&created, &other);
                self.emit(AccountAction::ProvisionFailed, &identifier, Some(reason.clone()));
                Err(FixtureError::Provision {
                    identifier,
                    reason,
                })
            }
        }
    }

    /// Tracks an account the caller provisioned itself.
    pub fn track(
        &self,
        identifier: impl Into<String>,
        secret: Secret,
        session: SessionToken,
    ) -> TrackedAccount {
        let credential = Credential::new(identifier, secret);
        self.ledger.append(&credential);
        let account = TrackedAccount::new(credential, session);
        self.registry.add(account.clone());
        self.emit(AccountAction::Tracked, account.identifier(), None);
        account
    }

    /// Deletes one account now. Returns true only on confirmed deletion.
    pub async fn delete_account(&self, identifier: &str, secret: &Secret) -> bool {
        let credential = Credential::new(identifier, secret.clone());
        self.orchestrator.delete(&credential).await == Resolution::Deleted
    }

    /// Sweeps registered accounts and ledger leftovers.
    pub async fn sweep(&self) -> CleanupSummary {
        self.orchestrator.sweep().await
    }

    /// Sweeps registered accounts older than `age`.
    pub async fn cleanup_older_than(&self, age: Duration) -> CleanupSummary {
        self.orchestrator.cleanup_older_than(age).await
    }

    /// Returns the number of registered accounts.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.registry.count()
    }

    /// Returns registered identifiers in provisioning order.
    #[must_use]
    pub fn registered_identifiers(&self) -> Vec<String> {
        self.registry.identifiers()
    }

    /// Returns the durable ledger.
    #[must_use]
    pub fn ledger(&self) -> &PendingCleanupLedger {
        &self.ledger
    }

    /// Returns the remote service boundary.
    #[must_use]
    pub const fn service(&self) -> &Arc<dyn AccountService> {
        &self.service
    }

    /// Runs `body` on its own task and sweeps once it ends.
    ///
    /// The sweep happens whether the body returns normally or panics; a panic
    /// is resumed after the sweep completes.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ScopeCancelled`] when the body task was
    /// cancelled. The sweep has still run.
    pub async fn run_scoped<F, Fut, T>(self: &Arc<Self>, body: F) -> Result<ScopedRun<T>, RuntimeError>
    where
        F: FnOnce(Arc<Self>) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let joined = tokio::spawn(body(Arc::clone(self))).await;
        let summary = self.sweep().await;
        match joined {
            Ok(output) => Ok(ScopedRun {
                output,
                summary,
            }),
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Err(RuntimeError::ScopeCancelled),
        }
    }

    fn emit(&self, action: AccountAction, identifier: &str, detail: Option<String>) {
        self.events.record(&FixtureEvent::Account(AccountEvent {
            action,
            identifier: identifier.to_string(),
            detail,
        }));
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the configured event sink.
///
/// # Errors
///
/// Returns [`RuntimeError::Events`] when the log file cannot be opened.
pub fn event_sink(config: &EventsConfig) -> Result<Arc<dyn EventSink>, RuntimeError> {
    if config.quiet {
        return Ok(Arc::new(NoopEventSink));
    }
    match &config.log_path {
        Some(path) => JsonLinesEventSink::open(path)
            .map(|sink| Arc::new(sink) as Arc<dyn EventSink>)
            .map_err(|err| RuntimeError::Events(format!("{}: {err}", path.display()))),
        None => Ok(Arc::new(StderrEventSink)),
    }
}

fn provision_failure(
    created: &Result<u16, ServiceError>,
    login: &Result<LoginReply, ServiceError>,
) -> String {
    let create = match created {
        Ok(status) => format!("create returned status {status}"),
        Err(err) => format!("create failed: {err}"),
    };
    let login = match login {
        Ok(LoginReply::Refused {
            status,
        }) => format!("login refused with status {status}"),
        Ok(LoginReply::Authenticated(_)) => "login succeeded".to_string(),
        Err(err) => format!("login failed: {err}"),
    };
    format!("{create}; {login}")
}
