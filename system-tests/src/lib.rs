// system-tests/src/lib.rs
// ============================================================================
// Module: Fixture Keeper System Tests Library
// Description: Shared configuration for system test scenarios.
// Purpose: Provide common utilities for Fixture Keeper system-test binaries.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the Fixture Keeper
//! system-tests binaries in `system-tests/tests`. Scenarios run the real HTTP
//! client and runtime against an in-process stub of the account service.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
