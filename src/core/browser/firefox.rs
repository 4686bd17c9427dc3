// Firefox cookie store - plaintext SQLite, no decryption involved

use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::{Connection, OpenFlags};

use super::{browser_process_running, snapshot_database, RawCookie};
use crate::error::StoreError;

const FIREFOX_PROCESS_NAMES: &[&str] = &["firefox.exe", "firefox", "firefox-bin"];

/// Read-only handle onto a Firefox profile's `cookies.sqlite`.
pub struct FirefoxStore {
    db_path: PathBuf,
}

impl FirefoxStore {
    /// Locate the default profile's cookie database.
    ///
    /// Profiles live in one flat directory; the default one carries a
    /// `.default` or `.default-release` suffix. Any profile directory that
    /// actually contains a cookie database is accepted as a fallback.
    pub fn locate() -> Result<Self, StoreError> {
        let profiles_dir = firefox_profiles_dir().ok_or_else(|| {
            StoreError::Unsupported("no known Firefox profile location on this platform".into())
        })?;

        let db_path = find_profile_database(&profiles_dir).ok_or_else(|| {
            StoreError::DatabaseNotFound {
                browser: "Firefox".to_string(),
                searched: profiles_dir.display().to_string(),
            }
        })?;
        debug!("using cookie database '{}'", db_path.display());

        Ok(FirefoxStore { db_path })
    }

    /// Build a store around an explicit database file.
    pub fn with_database(db_path: PathBuf) -> Self {
        FirefoxStore { db_path }
    }

    /// Read all cookies whose host matches the given domain suffix, in the
    /// store's natural order. `moz_cookies.expiry` is unix seconds already;
    /// zero marks a session cookie.
    pub fn cookies_for_domain(&self, domain_suffix: &str) -> Result<Vec<RawCookie>, StoreError> {
        let snapshot = snapshot_database(&self.db_path).map_err(|source| {
            let hint = if browser_process_running(FIREFOX_PROCESS_NAMES) {
                " while Firefox is running".to_string()
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
            "SELECT host, name, value, path, isSecure, isHttpOnly, expiry \
             FROM moz_cookies WHERE host LIKE ?1",
        )?;

        let cookies = stmt
            .query_map([format!("%{domain_suffix}")], |row| {
                let expiry: i64 = row.get(6)?;
                Ok(RawCookie {
                    domain: row.get(0)?,
                    name: row.get(1)?,
                    value: row.get(2)?,
                    path: row.get(3)?,
                    secure: row.get(4)?,
                    http_only: Some(row.get(5)?),
                    expires: if expiry == 0 { None } else { Some(expiry) },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        debug!("{} rows match suffix '{}'", cookies.len(), domain_suffix);

        Ok(cookies)
    }

    /// The database file this store reads from.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }
}

fn firefox_profiles_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        Some(dirs::config_dir()?.join("Mozilla").join("Firefox").join("Profiles"))
    }
    #[cfg(target_os = "macos")]
    {
        Some(dirs::config_dir()?.join("Firefox").join("Profiles"))
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        Some(dirs::home_dir()?.join(".mozilla").join("firefox"))
    }
    #[cfg(not(any(windows, unix)))]
    {
        None
    }
}

fn find_profile_database(profiles_dir: &Path) -> Option<PathBuf> {
    let entries: Vec<PathBuf> = std::fs::read_dir(profiles_dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();

    let preferred = entries.iter().find(|path| {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".default-release") || n.ends_with(".default"))
    });

    preferred
        .into_iter()
        .chain(entries.iter())
        .map(|profile| profile.join("cookies.sqlite"))
        .find(|db| db.is_file())
}
