// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Map scenario overrides onto the fixture-keeper-config parsers.
// Dependencies: fixture-keeper-config
// ============================================================================

//! ## Overview
//! Scenario overrides reuse the strict parsers from `fixture-keeper-config`, so
//! invalid UTF-8, blank values, and zero timeouts fail the same way here as
//! they do for the runtime configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use fixture_keeper_config::nonempty;
use fixture_keeper_config::parse_timeout_seconds;
use fixture_keeper_config::read_env_strict;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Directory that receives per-scenario sweep summaries.
    RunRoot,
    /// Per-scenario timeout in seconds (positive integer).
    TimeoutSeconds,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "FIXTURE_KEEPER_SYSTEM_TEST_RUN_ROOT",
            Self::TimeoutSeconds => "FIXTURE_KEEPER_SYSTEM_TEST_TIMEOUT_SEC",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Default per-scenario timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional run root override.
    pub run_root: Option<PathBuf>,
    /// Optional timeout override.
    pub timeout: Option<Duration>,
}

impl SystemTestConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a value is not valid UTF-8, is blank, or is not a
    /// positive timeout.
    pub fn load() -> Result<Self, String> {
        Self::load_with(read_env_strict)
    }

    /// Like [`SystemTestConfig::load`] with an explicit variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error when a looked-up value fails validation.
    pub fn load_with<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Result<Option<String>, String>,
    {
        let read = |key: SystemTestEnv| nonempty(key.as_str(), lookup(key.as_str())?);
        let run_root = read(SystemTestEnv::RunRoot)?.map(PathBuf::from);
        let timeout = read(SystemTestEnv::TimeoutSeconds)?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        Ok(Self {
            run_root,
            timeout,
        })
    }

    /// Returns the configured timeout or the default.
    #[must_use]
    pub fn timeout_or_default(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}
