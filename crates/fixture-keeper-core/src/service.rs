// crates/fixture-keeper-core/src/service.rs
// ============================================================================
// Module: Account Service Interface
// Description: Boundary with the remote service under test.
// Purpose: Let the orchestrator drive create/login/delete without HTTP details.
// Dependencies: async-trait, thiserror
// ============================================================================

//! ## Overview
//! [`AccountService`] is the only way the runtime talks to the remote service.
//! Implementations are expected to route every call through a resilient
//! executor, so a returned status is already the final outcome after retries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;

use crate::account::AccountProfile;
use crate::account::Credential;
use crate::account::Secret;
use crate::account::SessionToken;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures that produced no usable response.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Connection-level failure that survived every retry.
    #[error("service transport error: {0}")]
    Transport(String),
    /// A response arrived but could not be interpreted.
    #[error("service decode error: {0}")]
    Decode(String),
}

// ============================================================================
// SECTION: Replies
// ============================================================================

/// Result of a login attempt that produced a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginReply {
    /// Credentials accepted.
    Authenticated(SessionToken),
    /// Credentials refused or the service failed; carries the final status.
    Refused {
        /// Final response status.
        status: u16,
    },
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Remote account operations used by fixture provisioning and cleanup.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Creates the account and returns the final response status.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when no response could be obtained.
    async fn create_account(
        &self,
        credential: &Credential,
        profile: &AccountProfile,
    ) -> Result<u16, ServiceError>;

    /// Logs in with the given credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when no response could be obtained or the
    /// success payload carried no session.
    async fn login(&self, identifier: &str, secret: &Secret) -> Result<LoginReply, ServiceError>;

    /// Deletes the account owning `session` and returns the final status.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when no response could be obtained.
    async fn delete_self(&self, session: &SessionToken) -> Result<u16, ServiceError>;
}
