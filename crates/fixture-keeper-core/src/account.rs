// crates/fixture-keeper-core/src/account.rs
// ============================================================================
// Module: Fixture Accounts
// Description: Credential and tracked-account records.
// Purpose: Represent provisioned fixture accounts without leaking secrets.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! A [`Credential`] is born when a test asks for a fixture account and lives in
//! the durable ledger until the remote deletion is confirmed. A
//! [`TrackedAccount`] adds the session obtained after login and only exists in
//! the current process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Secrets
// ============================================================================

/// Account password. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wraps a raw secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw secret for use on the wire.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Session token returned by a successful login. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw session token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token for use in authorization headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

// ============================================================================
// SECTION: Credential
// ============================================================================

/// Identifier, secret, and creation time of a fixture account.
///
/// # Invariants
/// - Immutable once created.
/// - `identifier` is unique within a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Unique account identifier (an email address for the default service).
    identifier: String,
    /// Account secret.
    secret: Secret,
    /// Local creation time, persisted as `createdAt`.
    #[serde(rename = "createdAt", alias = "created_at", with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl Credential {
    /// Creates a credential stamped with the current UTC time.
    #[must_use]
    pub fn new(identifier: impl Into<String>, secret: Secret) -> Self {
        Self::with_created_at(identifier, secret, OffsetDateTime::now_utc())
    }

    /// Creates a credential with an explicit creation time.
    #[must_use]
    pub fn with_created_at(
        identifier: impl Into<String>,
        secret: Secret,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            secret,
            created_at,
        }
    }

    /// Returns the account identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the account secret.
    #[must_use]
    pub const fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Returns the creation time.
    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

// ============================================================================
// SECTION: Tracked Account
// ============================================================================

/// A credential plus the session obtained for it in this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedAccount {
    /// Persistable part of the account.
    credential: Credential,
    /// Session obtained after the remote login succeeded.
    session: SessionToken,
}

impl TrackedAccount {
    /// Pairs a credential with its session.
    #[must_use]
    pub const fn new(credential: Credential, session: SessionToken) -> Self {
        Self {
            credential,
            session,
        }
    }

    /// Returns the credential.
    #[must_use]
    pub const fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Returns the account identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        self.credential.identifier()
    }

    /// Returns the session token.
    #[must_use]
    pub const fn session(&self) -> &SessionToken {
        &self.session
    }
}

// ============================================================================
// SECTION: Profile
// ============================================================================

/// Profile fields sent with an account creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl Default for AccountProfile {
    fn default() -> Self {
        Self {
            first_name: "Fixture".to_string(),
            last_name: "Account".to_string(),
        }
    }
}
