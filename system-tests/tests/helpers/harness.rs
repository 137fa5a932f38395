// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Fixture Harness
// Description: Wires the real runtime against the stub service.
// Purpose: Build configured run contexts with ledgers in scratch directories.
// Dependencies: fixture-keeper-{config,core,ledger,runtime}, tempfile
// ============================================================================

use std::fs;
use std::future::Future;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use fixture_keeper_config::FixtureKeeperConfig;
use fixture_keeper_core::NoopEventSink;
use fixture_keeper_ledger::PendingCleanupLedger;
use fixture_keeper_runtime::FixtureAccounts;
use serde_json::Value;
use system_tests::config::SystemTestConfig;
use tempfile::TempDir;

/// Retry schedule short enough for scenarios that only count attempts.
pub const FAST_RETRY_MS: [u64; 2] = [20, 40];

/// Scratch directory holding one scenario's ledger and event log.
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.dir.path().join("fixture-ledger.json")
    }

    pub fn event_log_path(&self) -> PathBuf {
        self.dir.path().join("events.jsonl")
    }

    /// Config pointing at `base_url` with this scratch's ledger and event log.
    pub fn config(&self, base_url: &str, retry_delays_ms: &[u64]) -> FixtureKeeperConfig {
        let mut config = FixtureKeeperConfig::default();
        config.service.base_url = base_url.to_string();
        config.service.timeout_secs = 5;
        config.retry.delays_ms = retry_delays_ms.to_vec();
        config.ledger.path = self.ledger_path();
        config.sweep.pacing_ms = 5;
        config.events.log_path = Some(self.event_log_path());
        config
    }

    /// Validates `config` and builds a shared run context from it.
    pub fn fixtures(
        &self,
        config: &FixtureKeeperConfig,
    ) -> Result<Arc<FixtureAccounts>, Box<dyn std::error::Error>> {
        config.validate()?;
        Ok(Arc::new(FixtureAccounts::from_config(config)?))
    }

    /// Reads the ledger through a separate handle.
    pub fn ledger_identifiers(&self) -> Vec<String> {
        ledger_identifiers(&self.ledger_path())
    }

    /// Parses every JSON-lines event written so far.
    pub fn events(&self) -> Vec<Value> {
        fs::read_to_string(self.event_log_path())
            .unwrap_or_default()
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}

/// Reads identifiers from the ledger at `path`.
pub fn ledger_identifiers(path: &Path) -> Vec<String> {
    PendingCleanupLedger::open(path, Arc::new(NoopEventSink))
        .read_all()
        .iter()
        .map(|credential| credential.identifier().to_string())
        .collect()
}

/// Awaits `future` within the configured scenario timeout.
pub async fn within_timeout<F: Future>(future: F) -> Result<F::Output, String> {
    let timeout = SystemTestConfig::load()?.timeout_or_default();
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| format!("scenario exceeded {}s", timeout.as_secs()))
}
