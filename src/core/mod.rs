// Core module - cookie store access and the export pipeline

pub mod browser;
pub mod export;

// Re-export commonly used items
pub use browser::chrome::{ChromeStore, ChromiumBrowser};
pub use browser::firefox::FirefoxStore;
pub use browser::RawCookie;
pub use export::{merge_cookies, run, ExportedCookie, APEX_DOMAIN, LEGACY_DOMAIN};
