// crates/fixture-keeper-runtime/src/identity.rs
// ============================================================================
// Module: Fixture Identity
// Description: Unique identifiers and policy-compliant secrets for fixtures.
// Purpose: Generate credentials that never collide across runs or workers.
// Dependencies: fixture-keeper-core, rand, time
// ============================================================================

//! ## Overview
//! Identifiers take the form `{prefix}_{unix_millis}_{random}@{domain}`. The
//! random suffix comes from the OS RNG so parallel workers in the same
//! millisecond still diverge. Secrets always contain an uppercase letter, a
//! lowercase letter, a digit, and a symbol.

// ============================================================================
// SECTION: Imports
// ============================================================================

use fixture_keeper_core::AccountProfile;
use fixture_keeper_core::Credential;
use fixture_keeper_core::Secret;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Characters used for identifier suffixes.
const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
/// Characters used for the body of generated secrets.
const SECRET_ALPHABET: &[u8] =
    b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";
/// Random identifier suffix length.
const SUFFIX_LEN: usize = 8;
/// Random secret body length (excluding the fixed class prefix).
const SECRET_BODY_LEN: usize = 16;
/// Fallback when a prefix sanitizes to nothing.
const DEFAULT_PREFIX: &str = "fixture";

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Builds fresh fixture credentials for one email domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityFactory {
    /// Domain appended to identifiers.
    domain: String,
    /// Profile sent on creation.
    profile: AccountProfile,
}

impl IdentityFactory {
    /// Creates a factory.
    #[must_use]
    pub fn new(domain: impl Into<String>, profile: AccountProfile) -> Self {
        Self {
            domain: domain.into(),
            profile,
        }
    }

    /// Returns the creation profile.
    #[must_use]
    pub const fn profile(&self) -> &AccountProfile {
        &self.profile
    }

    /// Generates a new credential stamped with the current time.
    #[must_use]
    pub fn credential(&self, prefix: &str) -> Credential {
        let now = OffsetDateTime::now_utc();
        let millis = now.unix_timestamp_nanos() / 1_000_000;
        let identifier = format!(
            "{}_{millis}_{}@{}",
            sanitize_prefix(prefix),
            random_string(SUFFIX_ALPHABET, SUFFIX_LEN),
            self.domain
        );
        Credential::with_created_at(identifier, generate_secret(), now)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Lowercases the prefix and replaces anything outside `[a-z0-9]` with `_`.
pub(crate) fn sanitize_prefix(prefix: &str) -> String {
    let cleaned: String = prefix
        .trim()
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch.to_ascii_lowercase() } else { '_' })
        .collect();
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() { DEFAULT_PREFIX.to_string() } else { cleaned.to_string() }
}

/// Generates a secret that satisfies common complexity rules.
pub(crate) fn generate_secret() -> Secret {
    Secret::new(format!("Fk9!{}", random_string(SECRET_ALPHABET, SECRET_BODY_LEN)))
}

/// Draws `len` symbols uniformly from `alphabet`.
pub(crate) fn random_string(alphabet: &[u8], len: usize) -> String {
    let mut rng = OsRng;
    (0 .. len).filter_map(|_| alphabet.choose(&mut rng)).map(|byte| char::from(*byte)).collect()
}
