// crates/fixture-keeper-ledger/src/persist.rs
// ============================================================================
// Module: Ledger Persistence
// Description: Atomic whole-file replacement helpers.
// Purpose: Ensure a crash mid-write never corrupts the previous ledger state.
// Dependencies: std
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

// ============================================================================
// SECTION: Atomic Writes
// ============================================================================

/// Upper bound on temporary-name collisions before giving up.
const MAX_TEMP_ATTEMPTS: u32 = 64;
/// Upper bound on preserved copies of one file.
const MAX_PRESERVED_COPIES: u32 = 1_000;

/// Writes `bytes` to a temporary sibling, syncs it, and renames it over `path`.
pub(crate) fn write_file_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;
    for attempt in 0 .. MAX_TEMP_ATTEMPTS {
        let temp_path = parent.join(temp_file_name(path, attempt)?);
        match OpenOptions::new().write(true).create_new(true).open(&temp_path) {
            Ok(mut temp_file) => {
                let written = temp_file
                    .write_all(bytes)
                    .and_then(|()| temp_file.sync_all())
                    .and_then(|()| fs::rename(&temp_path, path));
                if let Err(err) = written {
                    let _ = fs::remove_file(&temp_path);
                    return Err(err);
                }
                return Ok(());
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err),
        }
    }
    Err(io::Error::new(ErrorKind::AlreadyExists, "unable to allocate temporary ledger file"))
}

/// Builds a per-process temporary file name for atomic writes.
fn temp_file_name(path: &Path, attempt: u32) -> io::Result<OsString> {
    let Some(base_name) = path.file_name() else {
        return Err(io::Error::new(ErrorKind::InvalidInput, "ledger path has no file name"));
    };
    let mut temp = OsString::from(".tmp-");
    temp.push(base_name);
    temp.push(format!(".{}.{}", std::process::id(), attempt));
    Ok(temp)
}

/// Returns `path` with `suffix` appended to its file name.
pub(crate) fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

// ============================================================================
// SECTION: Preserved Copies
// ============================================================================

/// Copies `path` to the first free name in `<file><suffix>`, `<file><suffix>.1`, ...
///
/// Existing copies are never overwritten. Returns the path written.
pub(crate) fn copy_to_free_sibling(path: &Path, suffix: &str) -> io::Result<PathBuf> {
    let mut source = File::open(path)?;
    for copy in 0 .. MAX_PRESERVED_COPIES {
        let target = if copy == 0 {
            sibling_path(path, suffix)
        } else {
            sibling_path(path, &format!("{suffix}.{copy}"))
        };
        match OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(mut dest) => {
                let copied = io::copy(&mut source, &mut dest).and_then(|_| dest.sync_all());
                if let Err(err) = copied {
                    let _ = fs::remove_file(&target);
                    return Err(err);
                }
                return Ok(target);
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err),
        }
    }
    Err(io::Error::new(ErrorKind::AlreadyExists, "no free name for preserved ledger copy"))
}
