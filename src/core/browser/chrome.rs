// Chrome cookie store - locate and read the profile's Cookies database
//
// Chromium keeps cookies in a SQLite database under the profile directory.
// Values are encrypted at rest on every platform; decryption is handled by
// the ChromeDecryptor. Reads always go through a snapshot copy so a running
// browser never sees us and file locks cannot corrupt anything.

use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::{Connection, OpenFlags};

use super::chrome_decrypt::ChromeDecryptor;
use super::{browser_process_running, snapshot_database, RawCookie};
use crate::error::StoreError;

/// Microseconds between the Windows epoch (1601-01-01) and the unix epoch.
const CHROME_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

/// Chromium-family browsers whose profile layout we understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromiumBrowser {
    Chrome,
    Edge,
    Brave,
    Chromium,
}

impl ChromiumBrowser {
    /// Human-readable name, used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            ChromiumBrowser::Chrome => "Google Chrome",
            ChromiumBrowser::Edge => "Microsoft Edge",
            ChromiumBrowser::Brave => "Brave",
            ChromiumBrowser::Chromium => "Chromium",
        }
    }

    /// Profile root ("User Data" directory on Windows) for this browser.
    ///
    /// # Browser Paths
    /// - Windows: `%LOCALAPPDATA%\<vendor>\<browser>\User Data`
    /// - macOS: `~/Library/Application Support/<vendor>/<browser>`
    /// - Linux: `~/.config/<browser>`
    pub fn user_data_dir(&self) -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            let base = dirs::data_local_dir()?;
            let rel = match self {
                ChromiumBrowser::Chrome => "Google/Chrome/User Data",
                ChromiumBrowser::Edge => "Microsoft/Edge/User Data",
                ChromiumBrowser::Brave => "BraveSoftware/Brave-Browser/User Data",
                ChromiumBrowser::Chromium => "Chromium/User Data",
            };
            Some(base.join(rel))
        }
        #[cfg(target_os = "macos")]
        {
            let base = dirs::config_dir()?;
            let rel = match self {
                ChromiumBrowser::Chrome => "Google/Chrome",
                ChromiumBrowser::Edge => "Microsoft Edge",
                ChromiumBrowser::Brave => "BraveSoftware/Brave-Browser",
                ChromiumBrowser::Chromium => "Chromium",
            };
            Some(base.join(rel))
        }
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            let base = dirs::config_dir()?;
            let rel = match self {
                ChromiumBrowser::Chrome => "google-chrome",
                ChromiumBrowser::Edge => "microsoft-edge",
                ChromiumBrowser::Brave => "BraveSoftware/Brave-Browser",
                ChromiumBrowser::Chromium => "chromium",
            };
            Some(base.join(rel))
        }
        #[cfg(not(any(windows, unix)))]
        {
            None
        }
    }

    /// Process names to probe when the database cannot be read.
    pub fn process_names(&self) -> &'static [&'static str] {
        match self {
            ChromiumBrowser::Chrome => {
                &["chrome.exe", "chrome", "google-chrome", "google-chrome-stable"]
            }
            ChromiumBrowser::Edge => &["msedge.exe", "msedge"],
            ChromiumBrowser::Brave => &["brave.exe", "brave", "brave-browser"],
            ChromiumBrowser::Chromium => &["chromium.exe", "chromium", "chromium-browser"],
        }
    }

    /// OS keychain entry holding the Safe Storage password (macOS).
    pub fn safe_storage_entry(&self) -> (&'static str, &'static str) {
        match self {
            ChromiumBrowser::Chrome => ("Chrome Safe Storage", "Chrome"),
            ChromiumBrowser::Edge => ("Microsoft Edge Safe Storage", "Microsoft Edge"),
            ChromiumBrowser::Brave => ("Brave Safe Storage", "Brave"),
            ChromiumBrowser::Chromium => ("Chromium Safe Storage", "Chromium"),
        }
    }
}

/// Read-only handle onto one browser profile's cookie database.
pub struct ChromeStore {
    browser: ChromiumBrowser,
    db_path: PathBuf,
    decryptor: ChromeDecryptor,
}

/// One row of the `cookies` table before value decryption.
struct CookieRow {
    host_key: String,
    name: String,
    value: String,
    encrypted_value: Vec<u8>,
    path: String,
    expires_utc: i64,
    is_secure: bool,
    is_httponly: bool,
}

impl ChromeStore {
    /// Locate the default profile's cookie database for a browser.
    ///
    /// Newer Chromium versions moved the database from `Default/Cookies`
    /// to `Default/Network/Cookies`; both locations are checked, newest
    /// first.
    pub fn locate(browser: ChromiumBrowser) -> Result<Self, StoreError> {
        let user_data = browser.user_data_dir().ok_or_else(|| {
            StoreError::Unsupported(format!(
                "no known profile location for {} on this platform",
                browser.label()
            ))
        })?;

        let candidates = [
            user_data.join("Default").join("Network").join("Cookies"),
            user_data.join("Default").join("Cookies"),
        ];

        let db_path = candidates
            .iter()
            .find(|path| path.is_file())
            .cloned()
            .ok_or_else(|| StoreError::DatabaseNotFound {
                browser: browser.label().to_string(),
                searched: user_data.display().to_string(),
            })?;
        debug!("using cookie database '{}'", db_path.display());

        let decryptor = ChromeDecryptor::for_profile(browser, &user_data)
            .map_err(|err| StoreError::KeySetup(format!("{err:#}")))?;

        Ok(ChromeStore {
            browser,
            db_path,
            decryptor,
        })
    }

    /// Build a store around an explicit database file.
    ///
    /// Bypasses profile discovery; used against snapshots taken elsewhere
    /// and against fixture databases in tests.
    pub fn with_database(
        browser: ChromiumBrowser,
        db_path: PathBuf,
        decryptor: ChromeDecryptor,
    ) -> Self {
        ChromeStore {
            browser,
            db_path,
            decryptor,
        }
    }

    /// Read all cookies whose host matches the given domain suffix.
    ///
    /// Matching follows the store's own semantics: `host_key LIKE '%<suffix>'`,
    /// so `.x.com` matches `.x.com` and `www.x.com` but not `x.com` itself.
    /// Rows come back in the store's natural order, undisturbed.
    pub fn cookies_for_domain(&self, domain_suffix: &str) -> Result<Vec<RawCookie>, StoreError> {
        let snapshot = snapshot_database(&self.db_path).map_err(|source| {
            let hint = if browser_process_running(self.browser.process_names()) {
                format!(" while {} is running", self.browser.label())
            } else {
                String::new()
            };
            StoreError::Snapshot {
                path: self.db_path.clone(),
                hint,
                source,
            }
        })?;

        let conn = Connection::open_with_flags(
            snapshot.path(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let mut stmt = conn.prepare(
            "SELECT host_key, name, value, encrypted_value, path, \
                    expires_utc, is_secure, is_httponly \
             FROM cookies WHERE host_key LIKE ?1",
        )?;

        let rows = stmt
            .query_map([format!("%{domain_suffix}")], |row| {
                Ok(CookieRow {
                    host_key: row.get(0)?,
                    name: row.get(1)?,
                    value: row.get(2)?,
                    encrypted_value: row.get(3)?,
                    path: row.get(4)?,
                    expires_utc: row.get(5)?,
                    is_secure: row.get(6)?,
                    is_httponly: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        debug!("{} rows match suffix '{}'", rows.len(), domain_suffix);

        let mut cookies = Vec::with_capacity(rows.len());
        for row in rows {
            let value = if !row.value.is_empty() || row.encrypted_value.is_empty() {
                row.value
            } else {
                self.decryptor
                    .decrypt(&row.encrypted_value)
                    .map_err(|err| StoreError::decrypt(&row.host_key, &err))?
            };

            cookies.push(RawCookie {
                name: row.name,
                value,
                domain: row.host_key,
                path: row.path,
                secure: row.is_secure,
                expires: chrome_time_to_unix(row.expires_utc),
                http_only: Some(row.is_httponly),
            });
        }

        Ok(cookies)
    }

    /// The database file this store reads from.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }
}

/// Convert a Chrome timestamp (microseconds since 1601-01-01) to unix
/// seconds. Zero marks a session cookie and maps to `None`.
fn chrome_time_to_unix(expires_utc: i64) -> Option<i64> {
    if expires_utc == 0 {
        None
    } else {
        Some((expires_utc - CHROME_EPOCH_OFFSET_MICROS) / 1_000_000)
    }
}
