// system-tests/tests/suites/fixture_lifecycle.rs
// ============================================================================
// Module: Fixture Lifecycle Scenarios
// Description: End-to-end provisioning, retry, and sweep scenarios.
// Purpose: Validate cleanup guarantees against a live HTTP service.
// Dependencies: system-tests helpers, fixture-keeper-runtime
// ============================================================================

//! Fixture lifecycle scenarios over loopback HTTP.

#![allow(clippy::use_debug, reason = "Failure messages print observed status lists.")]

use std::fs;
use std::sync::Arc;
use std::time::Instant;

use fixture_keeper_core::Credential;
use fixture_keeper_core::FixtureError;
use fixture_keeper_core::LoginReply;
use fixture_keeper_core::NoopEventSink;
use fixture_keeper_core::Secret;
use fixture_keeper_ledger::PendingCleanupLedger;
use helpers::artifacts::ScenarioArtifacts;
use helpers::harness::FAST_RETRY_MS;
use helpers::harness::Scratch;
use helpers::harness::within_timeout;
use helpers::service_stub::DELETE_SELF_PATH;
use helpers::service_stub::LOGIN_PATH;
use helpers::service_stub::REGISTER_PATH;
use helpers::service_stub::spawn_service_stub;

use crate::helpers;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::test(flavor = "multi_thread")]
async fn provisioned_accounts_are_swept_and_can_no_longer_log_in() -> TestResult {
    let artifacts = ScenarioArtifacts::new("provisioned_accounts_are_swept")?;
    let stub = spawn_service_stub()?;
    let scratch = Scratch::new()?;
    let fixtures = scratch.fixtures(&scratch.config(stub.base_url(), &FAST_RETRY_MS))?;

    let mut accounts = Vec::new();
    for prefix in ["a", "b", "c"] {
        accounts.push(within_timeout(fixtures.create_and_track(prefix)).await??);
    }
    if stub.account_count() != 3 || scratch.ledger_identifiers().len() != 3 {
        return Err("expected three live accounts recorded in the ledger".into());
    }

    let summary = within_timeout(fixtures.sweep()).await?;
    let (json, markdown) = artifacts.record(&summary)?;

    if summary.accounts_deleted() < 3 {
        return Err(format!("expected three deletions, got {}", summary.accounts_deleted()).into());
    }
    for account in &accounts {
        if summary.errors().iter().any(|error| error.contains(account.identifier())) {
            return Err(format!("unexpected error for {}", account.identifier()).into());
        }
    }
    if stub.account_count() != 0 || !scratch.ledger_identifiers().is_empty() {
        return Err("sweep left accounts behind".into());
    }

    let logins_before = stub.requests_to(LOGIN_PATH).len();
    let first = &accounts[0];
    let reply =
        fixtures.service().login(first.identifier(), first.credential().secret()).await?;
    if !matches!(reply, LoginReply::Refused { status: 401 }) {
        return Err("deleted account still accepted a login".into());
    }
    if stub.requests_to(LOGIN_PATH).len() != logins_before + 1 {
        return Err("a terminal 401 must not be retried".into());
    }

    let deleted_events = scratch
        .events()
        .into_iter()
        .filter(|event| event["event"] == "account" && event["action"] == "deleted")
        .count();
    if deleted_events != 3 {
        return Err(format!("expected three deleted events, got {deleted_events}").into());
    }

    let recorded: serde_json::Value = serde_json::from_slice(&fs::read(&json)?)?;
    if recorded["accounts_deleted"] != 3 || !fs::read_to_string(&markdown)?.contains("clean") {
        let root = artifacts.root().display();
        return Err(format!("summary artifacts under {root} do not match the sweep").into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn transient_failures_are_retried_on_the_standard_schedule() -> TestResult {
    let artifacts = ScenarioArtifacts::new("transient_failures_are_retried")?;
    let stub = spawn_service_stub()?;
    let scratch = Scratch::new()?;
    let fixtures = scratch.fixtures(&scratch.config(stub.base_url(), &[1_000, 2_000]))?;
    stub.fail_next(2);

    let started = Instant::now();
    let account = within_timeout(fixtures.create_and_track("retry")).await??;
    let elapsed = started.elapsed();

    let statuses: Vec<u16> =
        stub.requests_to(REGISTER_PATH).iter().map(|request| request.status).collect();
    if statuses != vec![503, 503, 201] {
        return Err(format!("unexpected register statuses {statuses:?}").into());
    }
    if elapsed.as_millis() < 3_000 {
        let millis = elapsed.as_millis();
        return Err(format!("retries finished after {millis}ms, expected 1s + 2s").into());
    }
    if !stub.account_exists(account.identifier()) {
        return Err("account missing after retried creation".into());
    }
    let retrying = scratch
        .events()
        .into_iter()
        .filter(|event| event["event"] == "request" && event["outcome"] == "retrying")
        .filter_map(|event| event["retry_delay_ms"].as_u64())
        .collect::<Vec<_>>();
    if retrying != vec![1_000, 2_000] {
        return Err(format!("unexpected retry delays {retrying:?}").into());
    }

    let summary = within_timeout(fixtures.sweep()).await?;
    artifacts.record(&summary)?;
    if !summary.is_success() {
        return Err("sweep after retried creation failed".into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn exhausted_retries_fail_provisioning_and_keep_the_obligation() -> TestResult {
    let artifacts = ScenarioArtifacts::new("exhausted_retries_fail_provisioning")?;
    let stub = spawn_service_stub()?;
    let scratch = Scratch::new()?;
    let fixtures = scratch.fixtures(&scratch.config(stub.base_url(), &FAST_RETRY_MS))?;
    stub.fail_next(6);

    let outcome = within_timeout(fixtures.create_and_track("doomed")).await?;
    let Err(FixtureError::Provision {
        identifier,
        reason,
    }) = outcome
    else {
        return Err("provisioning should fail after exhausted retries".into());
    };
    if !reason.contains("503") {
        return Err(format!("reason should name the final status: {reason}").into());
    }
    if stub.requests_to(REGISTER_PATH).len() != 3 || stub.requests_to(LOGIN_PATH).len() != 3 {
        return Err("each call should use exactly three attempts".into());
    }
    if fixtures.registered_count() != 0 || scratch.ledger_identifiers() != vec![identifier.clone()]
    {
        return Err("failed provisioning must leave only the ledger obligation".into());
    }

    let summary = within_timeout(fixtures.sweep()).await?;
    artifacts.record(&summary)?;
    if summary.total_accounts() != 1 || summary.unreachable() != 1 || !summary.errors().is_empty() {
        return Err("never-created account should resolve as unreachable".into());
    }
    if scratch.ledger_identifiers() != vec![identifier] {
        return Err("unreachable entries stay in the ledger".into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_deletion_is_isolated_from_the_rest_of_the_sweep() -> TestResult {
    let artifacts = ScenarioArtifacts::new("failed_deletion_is_isolated")?;
    let stub = spawn_service_stub()?;
    let scratch = Scratch::new()?;
    let fixtures = scratch.fixtures(&scratch.config(stub.base_url(), &FAST_RETRY_MS))?;
    let mut ids = Vec::new();
    for prefix in ["first", "middle", "last"] {
        let account = within_timeout(fixtures.create_and_track(prefix)).await??;
        ids.push(account.identifier().to_string());
    }
    stub.fail_delete_for(&ids[1]);

    let summary = within_timeout(fixtures.sweep()).await?;
    artifacts.record(&summary)?;

    if summary.accounts_deleted() != 2 || summary.errors().len() != 1 {
        return Err(format!(
            "expected 2 deletions and 1 error, got {} and {}",
            summary.accounts_deleted(),
            summary.errors().len()
        )
        .into());
    }
    let error = &summary.errors()[0];
    if !error.contains(&ids[1]) || !error.contains("500") {
        return Err(format!("error should name the account and status: {error}").into());
    }
    let deletes = stub.requests_to(DELETE_SELF_PATH);
    let failed = deletes.iter().filter(|request| request.status == 500).count();
    if failed != 3 || deletes.len() != 5 {
        let total = deletes.len();
        return Err(format!("expected 3 retried 500s among 5 deletes, got {failed}/{total}").into());
    }
    if scratch.ledger_identifiers() != vec![ids[1].clone()]
        || fixtures.registered_identifiers() != vec![ids[1].clone()]
    {
        return Err("only the failed account should remain tracked".into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn leftovers_from_an_earlier_run_are_swept() -> TestResult {
    let artifacts = ScenarioArtifacts::new("leftovers_from_an_earlier_run")?;
    let stub = spawn_service_stub()?;
    let scratch = Scratch::new()?;
    let previous = PendingCleanupLedger::open(scratch.ledger_path(), Arc::new(NoopEventSink));
    previous.append(&Credential::new("orphan@fixtures.test", Secret::new("Orphan-pw-1")));
    previous.append(&Credential::new("never@fixtures.test", Secret::new("Never-pw-1")));
    stub.insert_account("orphan@fixtures.test", "Orphan-pw-1");

    let fixtures = scratch.fixtures(&scratch.config(stub.base_url(), &FAST_RETRY_MS))?;
    let summary = within_timeout(fixtures.sweep()).await?;
    artifacts.record(&summary)?;

    if summary.total_accounts() != 2
        || summary.accounts_deleted() != 1
        || summary.unreachable() != 1
        || !summary.errors().is_empty()
    {
        return Err("expected one deletion and one unreachable leftover".into());
    }
    if summary.is_success() {
        return Err("an unreachable leftover is not a clean sweep".into());
    }
    if stub.account_exists("orphan@fixtures.test") {
        return Err("orphan account survived the sweep".into());
    }
    if scratch.ledger_identifiers() != vec!["never@fixtures.test".to_string()] {
        return Err("only the unreachable entry should remain".into());
    }
    let unreachable = scratch.events().into_iter().any(|event| {
        event["action"] == "unreachable" && event["identifier"] == "never@fixtures.test"
    });
    if !unreachable {
        return Err("missing unreachable event".into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn scoped_run_cleans_up_after_a_failed_body() -> TestResult {
    let artifacts = ScenarioArtifacts::new("scoped_run_cleans_up")?;
    let stub = spawn_service_stub()?;
    let scratch = Scratch::new()?;
    let fixtures = scratch.fixtures(&scratch.config(stub.base_url(), &FAST_RETRY_MS))?;

    let run = within_timeout(fixtures.run_scoped(|fixtures| async move {
        fixtures.create_and_track("scoped-one").await.map_err(|err| err.to_string())?;
        fixtures.create_and_track("scoped-two").await.map_err(|err| err.to_string())?;
        Err::<(), String>("scenario assertion failed".to_string())
    }))
    .await??;
    artifacts.record(&run.summary)?;

    if run.output != Err("scenario assertion failed".to_string()) {
        return Err("scoped body output was not preserved".into());
    }
    if run.summary.accounts_deleted() != 2 || stub.account_count() != 0 {
        return Err("scoped sweep did not delete both accounts".into());
    }
    if !scratch.ledger_identifiers().is_empty() {
        return Err("ledger not cleared after scoped sweep".into());
    }
    Ok(())
}
