// crates/fixture-keeper-runtime/tests/helpers/mod.rs
// ============================================================================
// Module: Runtime Test Helpers
// Description: In-memory account service with failure injection.
// Dependencies: fixture-keeper-core, fixture-keeper-ledger, fixture-keeper-runtime
// ============================================================================

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers.")]

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use fixture_keeper_core::AccountProfile;
use fixture_keeper_core::AccountService;
use fixture_keeper_core::Credential;
use fixture_keeper_core::EventSink;
use fixture_keeper_core::LoginReply;
use fixture_keeper_core::MemoryEventSink;
use fixture_keeper_core::NoopEventSink;
use fixture_keeper_core::Secret;
use fixture_keeper_core::ServiceError;
use fixture_keeper_core::SessionToken;
use fixture_keeper_ledger::PendingCleanupLedger;
use fixture_keeper_runtime::FixtureAccounts;
use fixture_keeper_runtime::FixtureOptions;

#[derive(Default)]
struct FakeState {
    accounts: HashMap<String, String>,
    sessions: HashMap<String, String>,
    next_token: u64,
    failing_deletes: HashSet<String>,
    reject_creates: bool,
    lose_create_responses: bool,
    unreachable: bool,
    watched_ledger: Option<PathBuf>,
    write_ahead_violations: usize,
    calls: Vec<String>,
}

/// Account service that keeps accounts in memory.
#[derive(Default)]
pub struct FakeAccountService {
    state: Mutex<FakeState>,
}

impl FakeAccountService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates an account directly, as an earlier run would have.
    pub fn insert(&self, identifier: &str, secret: &str) {
        self.state.lock().unwrap().accounts.insert(identifier.to_string(), secret.to_string());
    }

    pub fn exists(&self, identifier: &str) -> bool {
        self.state.lock().unwrap().accounts.contains_key(identifier)
    }

    pub fn account_count(&self) -> usize {
        self.state.lock().unwrap().accounts.len()
    }

    /// Makes delete-self for `identifier` answer 500.
    pub fn fail_delete_for(&self, identifier: &str) {
        self.state.lock().unwrap().failing_deletes.insert(identifier.to_string());
    }

    /// Makes create answer 400 without creating anything.
    pub fn reject_creates(&self) {
        self.state.lock().unwrap().reject_creates = true;
    }

    /// Makes create store the account but answer 503.
    pub fn lose_create_responses(&self) {
        self.state.lock().unwrap().lose_create_responses = true;
    }

    /// Makes every call fail with a transport error.
    pub fn go_unreachable(&self) {
        self.state.lock().unwrap().unreachable = true;
    }

    /// Checks at every create call that the ledger at `path` already holds the credential.
    pub fn watch_ledger(&self, path: &Path) {
        self.state.lock().unwrap().watched_ledger = Some(path.to_path_buf());
    }

    pub fn write_ahead_violations(&self) -> usize {
        self.state.lock().unwrap().write_ahead_violations
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl AccountService for FakeAccountService {
    async fn create_account(
        &self,
        credential: &Credential,
        _profile: &AccountProfile,
    ) -> Result<u16, ServiceError> {
        let identifier = credential.identifier().to_string();
        let watched = self.state.lock().unwrap().watched_ledger.clone();
        let recorded = watched.map(|path| {
            PendingCleanupLedger::open(path, Arc::new(NoopEventSink)).contains(&identifier)
        });
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create {identifier}"));
        if recorded == Some(false) {
            state.write_ahead_violations += 1;
        }
        if state.unreachable {
            return Err(ServiceError::Transport("connection refused".to_string()));
        }
        if state.reject_creates {
            return Ok(400);
        }
        state.accounts.insert(identifier, credential.secret().expose().to_string());
        Ok(if state.lose_create_responses { 503 } else { 201 })
    }

    async fn login(&self, identifier: &str, secret: &Secret) -> Result<LoginReply, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("login {identifier}"));
        if state.unreachable {
            return Err(ServiceError::Transport("connection refused".to_string()));
        }
        if state.accounts.get(identifier).map(String::as_str) != Some(secret.expose()) {
            return Ok(LoginReply::Refused {
                status: 401,
            });
        }
        state.next_token += 1;
        let token = format!("token-{}", state.next_token);
        state.sessions.insert(token.clone(), identifier.to_string());
        Ok(LoginReply::Authenticated(SessionToken::new(token)))
    }

    async fn delete_self(&self, session: &SessionToken) -> Result<u16, ServiceError> {
        let mut state = self.state.lock().unwrap();
        let Some(identifier) = state.sessions.get(session.expose()).cloned() else {
            return Ok(401);
        };
        state.calls.push(format!("delete {identifier}"));
        if state.failing_deletes.contains(&identifier) {
            return Ok(500);
        }
        state.accounts.remove(&identifier);
        state.sessions.retain(|_, owner| *owner != identifier);
        Ok(204)
    }
}

/// Builds a run context over `service` with its ledger inside `dir`.
pub fn fixtures(
    dir: &Path,
    service: &Arc<FakeAccountService>,
    pacing: Duration,
) -> (Arc<FixtureAccounts>, Arc<MemoryEventSink>) {
    let sink = Arc::new(MemoryEventSink::new());
    let events = Arc::clone(&sink) as Arc<dyn EventSink>;
    let ledger = PendingCleanupLedger::open(ledger_path(dir), Arc::clone(&events));
    let options = FixtureOptions {
        pacing,
        ..FixtureOptions::default()
    };
    let service = Arc::clone(service) as Arc<dyn AccountService>;
    (Arc::new(FixtureAccounts::new(service, ledger, options, events)), sink)
}

pub fn ledger_path(dir: &Path) -> PathBuf {
    dir.join("fixture-ledger.json")
}

/// Reads the ledger through a separate handle.
pub fn ledger_identifiers(dir: &Path) -> Vec<String> {
    PendingCleanupLedger::open(ledger_path(dir), Arc::new(NoopEventSink))
        .read_all()
        .iter()
        .map(|credential| credential.identifier().to_string())
        .collect()
}
