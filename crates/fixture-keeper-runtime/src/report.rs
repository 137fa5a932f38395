// crates/fixture-keeper-runtime/src/report.rs
// ============================================================================
// Module: Cleanup Report
// Description: JSON and Markdown artifacts for a sweep summary.
// Purpose: Hand sweep results to report generators and CI logs.
// Dependencies: fixture-keeper-core, serde_json, time
// ============================================================================

//! ## Overview
//! Mirrors the summary pair written by the system-test reporter: a
//! machine-readable JSON file and a short Markdown digest.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use fixture_keeper_core::CleanupSummary;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// JSON summary file name.
pub const SUMMARY_JSON: &str = "cleanup-summary.json";
/// Markdown summary file name.
pub const SUMMARY_MARKDOWN: &str = "cleanup-summary.md";

/// Writes `cleanup-summary.json` and `cleanup-summary.md` into `dir`.
///
/// # Errors
///
/// Returns the I/O error when the directory or either file cannot be written.
pub fn write_summary(dir: &Path, summary: &CleanupSummary) -> io::Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)?;
    let json_path = dir.join(SUMMARY_JSON);
    let mut bytes = serde_json::to_vec_pretty(summary).map_err(io::Error::other)?;
    bytes.push(b'\n');
    fs::write(&json_path, bytes)?;
    let markdown_path = dir.join(SUMMARY_MARKDOWN);
    fs::write(&markdown_path, summary_markdown(summary))?;
    Ok((json_path, markdown_path))
}

fn summary_markdown(summary: &CleanupSummary) -> String {
    let status = if summary.is_success() { "clean" } else { "incomplete" };
    let mut out = String::new();
    out.push_str("# Fixture Cleanup Summary\n\n");
    out.push_str("## Status\n\n");
    let _ = writeln!(out, "- Status: {status}");
    let _ = writeln!(out, "- Accounts: {}", summary.total_accounts());
    let _ = writeln!(out, "- Deleted: {}", summary.accounts_deleted());
    let _ = writeln!(out, "- Unreachable: {}", summary.unreachable());
    let _ = writeln!(out, "- Started: {}", timestamp(summary.start_time()));
    let _ = writeln!(out, "- Finished: {}", timestamp(summary.end_time()));
    let _ = writeln!(out, "- Duration (ms): {}", summary.duration().as_millis());
    out.push_str("\n## Errors\n\n");
    if summary.errors().is_empty() {
        out.push_str("- None\n");
    } else {
        for error in summary.errors() {
            let _ = writeln!(out, "- {error}");
        }
    }
    out
}

fn timestamp(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.unix_timestamp().to_string())
}
