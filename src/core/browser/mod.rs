// Browser cookie stores - read-only access to on-disk cookie databases

pub mod chrome;
pub mod chrome_decrypt;
pub mod dpapi;
pub mod firefox;

use std::path::Path;

use log::debug;
use sysinfo::{ProcessRefreshKind, System};
use tempfile::NamedTempFile;

// Re-export commonly used items
pub use chrome::{ChromeStore, ChromiumBrowser};
pub use chrome_decrypt::ChromeDecryptor;
pub use firefox::FirefoxStore;

/// A single entry as returned by a browser cookie store.
///
/// `expires` is unix seconds; `None` marks a session cookie. `http_only`
/// is `None` when the backing store cannot report the flag at all, which
/// downstream normalization treats as false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub expires: Option<i64>,
    pub http_only: Option<bool>,
}

/// Copy a live cookie database to a private temporary file.
///
/// Browsers keep the database open (and on Windows, locked) while running;
/// reading a snapshot sidesteps the lock and guarantees we never touch the
/// original. The returned handle deletes the copy on drop.
pub(crate) fn snapshot_database(db_path: &Path) -> std::io::Result<NamedTempFile> {
    let snapshot = tempfile::Builder::new()
        .prefix("xcookies-")
        .suffix(".sqlite")
        .tempfile()?;
    std::fs::copy(db_path, snapshot.path())?;
    debug!(
        "snapshotted '{}' to '{}'",
        db_path.display(),
        snapshot.path().display()
    );
    Ok(snapshot)
}

/// Check whether any process with one of the given names is running.
///
/// Used only to sharpen the diagnostic when the database cannot be read:
/// a running browser is the usual reason the file is locked or mid-write.
pub(crate) fn browser_process_running(names: &[&str]) -> bool {
    let mut system = System::new();
    system.refresh_processes_specifics(
        sysinfo::ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing(),
    );

    system.processes().values().any(|process| {
        let process_name = process.name().to_string_lossy().to_ascii_lowercase();
        names.iter().any(|name| process_name.contains(name))
    })
}
