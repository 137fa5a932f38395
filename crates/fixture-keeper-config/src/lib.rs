// crates/fixture-keeper-config/src/lib.rs
// ============================================================================
// Module: Fixture Keeper Config
// Description: Configuration model, loading, and validation.
// Purpose: Supply base URL, retry, ledger, and sweep settings as plain values.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Configuration is read from an optional TOML file and then overridden by
//! `FIXTURE_KEEPER_*` environment variables. The result is validated once and
//! handed to the runtime as plain values; the runtime never parses
//! configuration formats itself.
//! Invariants:
//! - Loading fails closed on unknown keys, invalid UTF-8, and out-of-range values.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod config;
mod env;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::AccountsConfig;
pub use config::ConfigError;
pub use config::EventsConfig;
pub use config::FixtureKeeperConfig;
pub use config::LedgerConfig;
pub use config::MAX_CONFIG_BYTES;
pub use config::RetryConfig;
pub use config::ServiceConfig;
pub use config::SweepConfig;
pub use env::ConfigEnv;
pub use env::nonempty;
pub use env::parse_timeout_seconds;
pub use env::read_env_strict;
