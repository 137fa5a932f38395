// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Scenario Artifacts
// Description: Per-scenario directories for sweep summaries.
// Purpose: Keep each scenario's cleanup summary on disk for inspection.
// Dependencies: system-tests, fixture-keeper-runtime
// ============================================================================

use std::io;
use std::path::Path;
use std::path::PathBuf;

use fixture_keeper_core::CleanupSummary;
use fixture_keeper_runtime::write_summary;
use system_tests::config::SystemTestConfig;

/// Summary directory for one scenario.
///
/// Defaults to `target/system-tests/<scenario>` unless
/// `FIXTURE_KEEPER_SYSTEM_TEST_RUN_ROOT` points elsewhere.
#[derive(Debug, Clone)]
pub struct ScenarioArtifacts {
    root: PathBuf,
}

impl ScenarioArtifacts {
    pub fn new(scenario: &str) -> io::Result<Self> {
        let config = SystemTestConfig::load().map_err(io::Error::other)?;
        let root = config
            .run_root
            .unwrap_or_else(|| PathBuf::from("target").join("system-tests"))
            .join(scenario);
        Ok(Self {
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `cleanup-summary.{json,md}` for the scenario's final sweep.
    pub fn record(&self, summary: &CleanupSummary) -> io::Result<(PathBuf, PathBuf)> {
        write_summary(&self.root, summary)
    }
}
