// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for Fixture Keeper system-tests.
// Purpose: Provide the service stub, run harness, and artifact utilities.
// Dependencies: system-tests, fixture-keeper-runtime
// ============================================================================

//! ## Overview
//! Shared helpers for Fixture Keeper system-tests.
//! Invariants:
//! - Scenarios only talk to the in-process stub over loopback HTTP.
//! - Ledgers live in per-scenario scratch directories.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod harness;
pub mod service_stub;
