// crates/fixture-keeper-core/src/lib.rs
// ============================================================================
// Module: Fixture Keeper Core
// Description: Shared types and interfaces for fixture account lifecycles.
// Purpose: Define credentials, cleanup summaries, events, and the remote boundary.
// Dependencies: async-trait, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Fixture Keeper provisions ephemeral accounts on a service under test and
//! guarantees they are eventually deleted. This crate holds the pieces every
//! other crate agrees on: [`Credential`] and [`TrackedAccount`] records, the
//! [`CleanupSummary`] produced by a sweep, the [`EventSink`] observability
//! interface, and the [`AccountService`] boundary to the remote service.
//! Invariants:
//! - Secrets and session tokens are redacted from `Debug` output and events.
//! - Event sinks never surface write failures to callers.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod account;
pub mod error;
pub mod events;
pub mod service;
pub mod status;
pub mod summary;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use account::AccountProfile;
pub use account::Credential;
pub use account::Secret;
pub use account::SessionToken;
pub use account::TrackedAccount;
pub use error::FixtureError;
pub use events::AccountAction;
pub use events::AccountEvent;
pub use events::EventSink;
pub use events::FixtureEvent;
pub use events::JsonLinesEventSink;
pub use events::LedgerAction;
pub use events::LedgerEvent;
pub use events::MemoryEventSink;
pub use events::NoopEventSink;
pub use events::RequestEvent;
pub use events::RequestOutcome;
pub use events::StderrEventSink;
pub use events::SweepEvent;
pub use events::SweepPhase;
pub use service::AccountService;
pub use service::LoginReply;
pub use service::ServiceError;
pub use status::StatusClass;
pub use summary::CleanupSummary;
