// crates/fixture-keeper-runtime/src/shutdown.rs
// ============================================================================
// Module: Shutdown Hook
// Description: Best-effort sweep when the process is interrupted.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! The hook listens for a shutdown signal (Ctrl-C by default) on a background
//! task and sweeps once when it fires. Listening for Ctrl-C replaces the
//! default interrupt action, so [`ShutdownHook::install`] ends the process
//! with [`INTERRUPTED_EXIT_CODE`] after the sweep. Completion is not
//! guaranteed: the process may be killed before the sweep ends. Durable
//! coverage comes from the ledger; [`crate::FixtureAccounts::run_scoped`] is
//! the guaranteed path.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use fixture_keeper_core::CleanupSummary;
use tokio::task::JoinHandle;

use crate::accounts::FixtureAccounts;

/// Exit status after an interrupt-triggered sweep (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// What the listener does once its sweep has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSweep {
    /// Terminate the process with this status.
    Exit(i32),
    /// Keep running; the summary is handed to [`ShutdownHook::wait`].
    Resume,
}

/// Installs at most one signal-triggered sweep.
#[derive(Default)]
pub struct ShutdownHook {
    /// Set by the first successful install.
    installed: AtomicBool,
    /// Listener task.
    task: Mutex<Option<JoinHandle<Option<CleanupSummary>>>>,
}

impl ShutdownHook {
    /// Creates an uninstalled hook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sweeps `fixtures` on Ctrl-C, then exits with [`INTERRUPTED_EXIT_CODE`].
    ///
    /// Returns false if already installed.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn install(&self, fixtures: Arc<FixtureAccounts>) -> bool {
        self.install_with(
            fixtures,
            tokio::signal::ctrl_c(),
            AfterSweep::Exit(INTERRUPTED_EXIT_CODE),
        )
    }

    /// Sweeps `fixtures` when `signal` resolves successfully, then applies `after`.
    ///
    /// Returns false, and drops `signal`, if a listener is already installed.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn install_with<S>(
        &self,
        fixtures: Arc<FixtureAccounts>,
        signal: S,
        after: AfterSweep,
    ) -> bool
    where
        S: Future<Output = io::Result<()>> + Send + 'static,
    {
        if self.installed.swap(true, Ordering::SeqCst) {
            return false;
        }
        let handle = tokio::spawn(async move {
            if signal.await.is_err() {
                return None;
            }
            let summary = fixtures.sweep().await;
            if let AfterSweep::Exit(code) = after {
                terminate(code);
            }
            Some(summary)
        });
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        true
    }

    /// Returns true once a listener has been installed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    /// Waits for the listener to finish and returns its sweep, if one ran.
    ///
    /// Only returns a summary for [`AfterSweep::Resume`] listeners.
    pub async fn wait(&self) -> Option<CleanupSummary> {
        let handle = self.task.lock().unwrap_or_else(PoisonError::into_inner).take()?;
        handle.await.ok().flatten()
    }

    /// Stops listening without sweeping.
    pub fn cancel(&self) {
        if let Some(handle) = self.task.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }
}

/// Ends the process with `code`.
#[allow(clippy::exit, reason = "An interrupted run ends once its sweep has finished.")]
fn terminate(code: i32) -> ! {
    std::process::exit(code)
}
