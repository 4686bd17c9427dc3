// xcookies Library - Public API

// Re-export error types
pub mod error;
pub use error::StoreError;

// Module declarations
pub mod core;

// Re-export commonly used types
pub use crate::core::browser::RawCookie;
pub use crate::core::export::{run, ExportedCookie};

// Initialize logging
//
// Diagnostics default to warn so a normal run writes nothing to stderr;
// RUST_LOG=debug opts into the full trace.
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
}
