// crates/fixture-keeper-config/src/env.rs
// ============================================================================
// Module: Config Environment
// Description: Environment variable names and strict value parsing.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys that override file configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigEnv {
    /// Base URL of the service under test.
    BaseUrl,
    /// Ledger file path.
    LedgerPath,
    /// Request timeout in seconds (positive integer).
    TimeoutSeconds,
    /// Comma-separated retry delays in milliseconds (empty list disables retries).
    RetryDelaysMs,
    /// Delay between sweep deletions in milliseconds.
    SweepPacingMs,
    /// Email domain for generated identifiers.
    EmailDomain,
    /// Optional JSON-lines event log path.
    EventLog,
}

impl ConfigEnv {
    /// Every override key, in application order.
    pub const ALL: [Self; 7] = [
        Self::BaseUrl,
        Self::LedgerPath,
        Self::TimeoutSeconds,
        Self::RetryDelaysMs,
        Self::SweepPacingMs,
        Self::EmailDomain,
        Self::EventLog,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseUrl => "FIXTURE_KEEPER_BASE_URL",
            Self::LedgerPath => "FIXTURE_KEEPER_LEDGER_PATH",
            Self::TimeoutSeconds => "FIXTURE_KEEPER_TIMEOUT_SEC",
            Self::RetryDelaysMs => "FIXTURE_KEEPER_RETRY_DELAYS_MS",
            Self::SweepPacingMs => "FIXTURE_KEEPER_SWEEP_PACING_MS",
            Self::EmailDomain => "FIXTURE_KEEPER_EMAIL_DOMAIN",
            Self::EventLog => "FIXTURE_KEEPER_EVENT_LOG",
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Rejects set-but-empty values and trims the rest.
///
/// # Errors
///
/// Returns an error naming `name` when the value is blank.
pub fn nonempty(name: &str, raw: Option<String>) -> Result<Option<String>, String> {
    match raw {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

/// Parses a positive number of seconds.
///
/// # Errors
///
/// Returns an error naming `name` when the value is zero or not an integer.
pub fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a non-negative number of milliseconds.
pub(crate) fn parse_millis(name: &str, raw: &str) -> Result<u64, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("{name} must be a non-negative integer number of milliseconds"))
}

/// Parses a comma-separated list of millisecond delays; `none` means no retries.
pub(crate) fn parse_delay_list(name: &str, raw: &str) -> Result<Vec<u64>, String> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }
    trimmed.split(',').map(|item| parse_millis(name, item)).collect()
}
