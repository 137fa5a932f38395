// crates/fixture-keeper-client/src/service.rs
// ============================================================================
// Module: HTTP Account Service
// Description: reqwest implementation of the account service boundary.
// Purpose: Create, authenticate, and self-delete accounts over HTTP.
// Dependencies: async-trait, fixture-keeper-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! Wire contract:
//! - create: `POST {register}` with `email`, `password`, `confirmPassword`,
//!   `firstName`, `lastName`.
//! - login: `POST {login}` with `email` and `password`; a success body carries
//!   the session token in the configured field, at the top level or under `data`.
//! - delete: `DELETE {delete_self}` with the token as a bearer credential.
//!
//! Every call goes through the [`ResilientExecutor`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use fixture_keeper_core::AccountProfile;
use fixture_keeper_core::AccountService;
use fixture_keeper_core::Credential;
use fixture_keeper_core::LoginReply;
use fixture_keeper_core::Secret;
use fixture_keeper_core::ServiceError;
use fixture_keeper_core::SessionToken;
use fixture_keeper_core::StatusClass;
use serde_json::Value;
use serde_json::json;

use crate::executor::ExecutorError;
use crate::executor::RequestLabel;
use crate::executor::ResilientExecutor;
use crate::executor::TransportError;

// ============================================================================
// SECTION: Endpoints
// ============================================================================

/// Endpoint paths and response shape of the service under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    /// Account creation path.
    pub register: String,
    /// Login path.
    pub login: String,
    /// Delete-own-account path.
    pub delete_self: String,
    /// Login response field holding the session token.
    pub session_field: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            register: "/api/auth/register".to_string(),
            login: "/api/auth/login".to_string(),
            delete_self: "/api/users/me".to_string(),
            session_field: "accessToken".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// [`AccountService`] over HTTP.
pub struct HttpAccountService {
    /// Base URL without a trailing slash.
    base_url: String,
    /// Endpoint layout.
    endpoints: ServiceEndpoints,
    /// Shared HTTP client.
    client: reqwest::Client,
    /// Retry wrapper.
    executor: ResilientExecutor,
}

impl HttpAccountService {
    /// Builds a client with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Transport`] when the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        endpoints: ServiceEndpoints,
        timeout: Duration,
        executor: ResilientExecutor,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ServiceError::Transport(format!("failed to build http client: {err}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoints,
            client,
            executor,
        })
    }

    /// Returns the executor used for every call.
    #[must_use]
    pub const fn executor(&self) -> &ResilientExecutor {
        &self.executor
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends a JSON POST through the executor.
    async fn post_json(&self, path: &str, body: &Value) -> Result<reqwest::Response, ServiceError> {
        let url = self.url(path);
        let label = RequestLabel::new("POST", path);
        self.executor
            .execute(&label, || {
                let request = self.client.post(&url).json(body);
                async move { request.send().await.map_err(TransportError::from) }
            })
            .await
            .map_err(transport_error)
    }
}

#[async_trait]
impl AccountService for HttpAccountService {
    async fn create_account(
        &self,
        credential: &Credential,
        profile: &AccountProfile,
    ) -> Result<u16, ServiceError> {
        let body = json!({
            "email": credential.identifier(),
            "password": credential.secret().expose(),
            "confirmPassword": credential.secret().expose(),
            "firstName": profile.first_name,
            "lastName": profile.last_name,
        });
        let response = self.post_json(&self.endpoints.register, &body).await?;
        Ok(response.status().as_u16())
    }

    async fn login(&self, identifier: &str, secret: &Secret) -> Result<LoginReply, ServiceError> {
        let body = json!({
            "email": identifier,
            "password": secret.expose(),
        });
        let response = self.post_json(&self.endpoints.login, &body).await?;
        let status = response.status().as_u16();
        if StatusClass::of(status) != StatusClass::Success {
            return Ok(LoginReply::Refused {
                status,
            });
        }
        let payload: Value = response
            .json()
            .await
            .map_err(|err| ServiceError::Decode(format!("invalid login response: {err}")))?;
        session_from_payload(&payload, &self.endpoints.session_field)
            .map(LoginReply::Authenticated)
            .ok_or_else(|| {
                ServiceError::Decode(format!(
                    "login response missing {} field",
                    self.endpoints.session_field
                ))
            })
    }

    async fn delete_self(&self, session: &SessionToken) -> Result<u16, ServiceError> {
        let path = &self.endpoints.delete_self;
        let url = self.url(path);
        let label = RequestLabel::new("DELETE", path.as_str());
        let response = self
            .executor
            .execute(&label, || {
                let request = self.client.delete(&url).bearer_auth(session.expose());
                async move { request.send().await.map_err(TransportError::from) }
            })
            .await
            .map_err(transport_error)?;
        Ok(response.status().as_u16())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn transport_error(err: ExecutorError) -> ServiceError {
    ServiceError::Transport(err.to_string())
}

/// Finds a non-empty token string at `field` or `data.field`.
pub(crate) fn session_from_payload(payload: &Value, field: &str) -> Option<SessionToken> {
    [payload.get(field), payload.get("data").and_then(|data| data.get(field))]
        .into_iter()
        .flatten()
        .find_map(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(SessionToken::new)
}
