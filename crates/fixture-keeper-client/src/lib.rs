// crates/fixture-keeper-client/src/lib.rs
// ============================================================================
// Module: Fixture Keeper Client
// Description: Resilient request execution and the HTTP account service.
// Purpose: Talk to the service under test with bounded, classified retries.
// Dependencies: fixture-keeper-core, reqwest, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! [`ResilientExecutor`] wraps every remote call: transient failures (5xx or a
//! connection-level error) are retried on a fixed schedule, while 4xx responses
//! are returned immediately because they are usually the expected outcome of a
//! test assertion. [`HttpAccountService`] implements the core
//! [`fixture_keeper_core::AccountService`] boundary on top of it.
//! Invariants:
//! - Attempts per call never exceed the retry schedule length plus one.
//! - The final attempt's outcome is returned as-is.
//! - Every attempt emits exactly one request event.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod executor;
pub mod service;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use executor::ExecutorError;
pub use executor::HasStatus;
pub use executor::RequestLabel;
pub use executor::ResilientExecutor;
pub use executor::RetryPolicy;
pub use executor::TransportError;
pub use service::HttpAccountService;
pub use service::ServiceEndpoints;
