//! Logging facilities for the option system.
//!
//! The option system is instrumented with the `tracing` crate. It never
//! installs a subscriber itself; applications do that:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("options=debug")
//!     .init();
//! ```
//!
//! Rejected values are logged at `debug`, UI-binding policy violations at
//! `warn`, and persistence failures at `warn` or `error`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Option system root target.
    pub const OPTIONS: &str = "options";
    /// UI-binding capability target.
    pub const UI: &str = "options::ui";
    /// Value kinds (validation, range checks, choice lookup).
    pub const VALUE: &str = "options::value";
    /// Document store persistence target.
    pub const STORE: &str = "options::store";
    /// Option registry target.
    pub const DB: &str = "options::db";
}
