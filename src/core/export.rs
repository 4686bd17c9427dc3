// Export pipeline - merge, deduplicate and serialize browser cookies
//
// The whole program is this pipeline: read the store for the apex domain,
// then for the legacy alias domain, concatenate, drop later duplicates,
// normalize, serialize. One pass, no retries, no partial output.

use std::collections::HashSet;

use anyhow::Result;
use log::debug;
use serde::Serialize;

use super::browser::chrome::{ChromeStore, ChromiumBrowser};
use super::browser::RawCookie;

/// Primary domain suffix of the service.
pub const APEX_DOMAIN: &str = ".x.com";

/// Legacy alias domain of the same service; cookies may live under either.
pub const LEGACY_DOMAIN: &str = ".twitter.com";

/// A normalized cookie record as emitted on stdout.
///
/// Exactly these seven fields appear in the output, in declaration order.
/// `expires` serializes as a number of unix seconds or `null` for session
/// cookies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub expires: Option<i64>,
    #[serde(rename = "httpOnly")]
    pub http_only: bool,
}

impl From<RawCookie> for ExportedCookie {
    fn from(raw: RawCookie) -> Self {
        ExportedCookie {
            name: raw.name,
            value: raw.value,
            domain: raw.domain,
            path: raw.path,
            secure: raw.secure,
            expires: raw.expires,
            // Stores that cannot report the flag report it as unset.
            http_only: raw.http_only.unwrap_or(false),
        }
    }
}

/// Concatenate two store result sets and deduplicate on (name, domain).
///
/// The first occurrence of a key wins; later duplicates are dropped
/// silently. Output order is concatenation order minus the dropped rows.
pub fn merge_cookies(primary: Vec<RawCookie>, legacy: Vec<RawCookie>) -> Vec<ExportedCookie> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut merged = Vec::with_capacity(primary.len() + legacy.len());

    for raw in primary.into_iter().chain(legacy) {
        if !seen.insert((raw.name.clone(), raw.domain.clone())) {
            debug!(
                "dropping duplicate cookie '{}' for domain '{}'",
                raw.name, raw.domain
            );
            continue;
        }
        merged.push(ExportedCookie::from(raw));
    }

    merged
}

/// Export from an already-located store and serialize to one JSON line.
pub fn export_from(store: &ChromeStore) -> Result<String> {
    let apex = store.cookies_for_domain(APEX_DOMAIN)?;
    let legacy = store.cookies_for_domain(LEGACY_DOMAIN)?;
    debug!(
        "store returned {} cookies for {} and {} for {}",
        apex.len(),
        APEX_DOMAIN,
        legacy.len(),
        LEGACY_DOMAIN
    );

    let merged = merge_cookies(apex, legacy);
    debug!("{} cookies after deduplication", merged.len());

    Ok(serde_json::to_string(&merged)?)
}

/// Run the whole export against the local Chrome profile.
///
/// # Returns
/// * `Ok(String)` - The JSON array, ready to print as a single line
/// * `Err(...)` - The first store failure; nothing was written anywhere
pub fn run() -> Result<String> {
    let store = ChromeStore::locate(ChromiumBrowser::Chrome)?;
    export_from(&store)
}
