// crates/fixture-keeper-config/src/config.rs
// ============================================================================
// Module: Config Model
// Description: Typed configuration sections, loading, and validation.
// Purpose: Produce a validated configuration from file and environment inputs.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::env::ConfigEnv;
use crate::env::nonempty;
use crate::env::parse_delay_list;
use crate::env::parse_millis;
use crate::env::parse_timeout_seconds;
use crate::env::read_env_strict;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted config file size in bytes.
pub const MAX_CONFIG_BYTES: u64 = 1024 * 1024;
/// Maximum number of retry delays (attempts = delays + 1).
const MAX_RETRY_DELAYS: usize = 8;
/// Maximum single retry delay.
const MAX_RETRY_DELAY_MS: u64 = 60_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config file is not valid TOML for this model.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A value failed validation.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// Remote service location and endpoint layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServiceConfig {
    /// Base URL of the service under test.
    pub base_url: String,
    /// Account creation path.
    pub register_path: String,
    /// Login path.
    pub login_path: String,
    /// Delete-own-account path.
    pub delete_self_path: String,
    /// JSON field in the login response that carries the session token.
    pub session_field: String,
    /// Per-request transport timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            register_path: "/api/auth/register".to_string(),
            login_path: "/api/auth/login".to_string(),
            delete_self_path: "/api/users/me".to_string(),
            session_field: "accessToken".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Executor retry schedule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RetryConfig {
    /// Delays applied before each additional attempt; empty disables retries.
    pub delays_ms: Vec<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delays_ms: vec![1_000, 2_000],
        }
    }
}

/// Ledger location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LedgerConfig {
    /// Ledger file, relative to the working directory unless absolute.
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("fixture-ledger.json"),
        }
    }
}

/// Sweep pacing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SweepConfig {
    /// Delay between successive deletion attempts in milliseconds.
    pub pacing_ms: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            pacing_ms: 250,
        }
    }
}

/// Generated account shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AccountsConfig {
    /// Domain appended to generated identifiers.
    pub email_domain: String,
    /// Profile first name.
    pub first_name: String,
    /// Profile last name.
    pub last_name: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            email_domain: "fixtures.test".to_string(),
            first_name: "Fixture".to_string(),
            last_name: "Account".to_string(),
        }
    }
}

/// Event output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EventsConfig {
    /// Append JSON-lines events to this file instead of stderr.
    pub log_path: Option<PathBuf>,
    /// Discard events entirely.
    pub quiet: bool,
}

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Complete Fixture Keeper configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FixtureKeeperConfig {
    /// Remote service settings.
    pub service: ServiceConfig,
    /// Retry schedule.
    pub retry: RetryConfig,
    /// Ledger settings.
    pub ledger: LedgerConfig,
    /// Sweep settings.
    pub sweep: SweepConfig,
    /// Generated account settings.
    pub accounts: AccountsConfig,
    /// Event output settings.
    pub events: EventsConfig,
}

impl FixtureKeeperConfig {
    /// Loads the optional file, applies process environment overrides, and validates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file or an override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, read_env_strict)
    }

    /// Like [`FixtureKeeperConfig::load`] with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file or an override is invalid.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<Option<String>, String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document without environment overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Reads a config file with size and encoding guards.
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let meta = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if meta.len() > MAX_CONFIG_BYTES {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(&text)
    }

    /// Applies `FIXTURE_KEEPER_*` overrides.
    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Result<Option<String>, String>,
    {
        for key in ConfigEnv::ALL {
            let name = key.as_str();
            let Some(value) = lookup(name)
                .and_then(|raw| nonempty(name, raw))
                .map_err(ConfigError::Invalid)?
            else {
                continue;
            };
            match key {
                ConfigEnv::BaseUrl => self.service.base_url = value,
                ConfigEnv::LedgerPath => self.ledger.path = PathBuf::from(value),
                ConfigEnv::TimeoutSeconds => {
                    let timeout =
                        parse_timeout_seconds(name, &value).map_err(ConfigError::Invalid)?;
                    self.service.timeout_secs = timeout.as_secs();
                }
                ConfigEnv::RetryDelaysMs => {
                    self.retry.delays_ms =
                        parse_delay_list(name, &value).map_err(ConfigError::Invalid)?;
                }
                ConfigEnv::SweepPacingMs => {
                    self.sweep.pacing_ms = parse_millis(name, &value).map_err(ConfigError::Invalid)?;
                }
                ConfigEnv::EmailDomain => self.accounts.email_domain = value,
                ConfigEnv::EventLog => self.events.log_path = Some(PathBuf::from(value)),
            }
        }
        Ok(())
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.service.base_url)
            .map_err(|err| ConfigError::Invalid(format!("service.base_url: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid("service.base_url must use http or https".to_string()));
        }
        for (field, value) in [
            ("service.register_path", &self.service.register_path),
            ("service.login_path", &self.service.login_path),
            ("service.delete_self_path", &self.service.delete_self_path),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::Invalid(format!("{field} must start with '/'")));
            }
        }
        if self.service.session_field.trim().is_empty() {
            return Err(ConfigError::Invalid("service.session_field must not be empty".to_string()));
        }
        if self.service.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "service.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.retry.delays_ms.len() > MAX_RETRY_DELAYS {
            return Err(ConfigError::Invalid(format!(
                "retry.delays_ms allows at most {MAX_RETRY_DELAYS} entries"
            )));
        }
        if self.retry.delays_ms.iter().any(|delay| *delay > MAX_RETRY_DELAY_MS) {
            return Err(ConfigError::Invalid(format!(
                "retry.delays_ms entries must not exceed {MAX_RETRY_DELAY_MS}"
            )));
        }
        if self.ledger.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("ledger.path must not be empty".to_string()));
        }
        let domain = self.accounts.email_domain.trim();
        if domain.is_empty() || domain.contains('@') || domain.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid(
                "accounts.email_domain must be a bare domain".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the per-request transport timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }

    /// Returns the retry schedule.
    #[must_use]
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry.delays_ms.iter().copied().map(Duration::from_millis).collect()
    }

    /// Returns the pause between sweep deletions.
    #[must_use]
    pub const fn sweep_pacing(&self) -> Duration {
        Duration::from_millis(self.sweep.pacing_ms)
    }
}
