//! Logging facilities for Horizon Rowgroup.
//!
//! Horizon Rowgroup uses the `tracing` crate for instrumentation. To see
//! logs, install a subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_rowgroup=debug")
//!         .init();
//! }
//! ```
//!
//! Rebuilds are wrapped in a [`PerfSpan`], so a subscriber that records span
//! timings shows how long each full rebuild took.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_rowgroup_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_rowgroup_core::signal";
    /// Engine crate target.
    pub const ENGINE: &str = "horizon_rowgroup";
    /// Rebuild and expand/collapse target.
    pub const FLATTENER: &str = "horizon_rowgroup::flattener";
    /// Filter evaluation target.
    pub const FILTER: &str = "horizon_rowgroup::filter";
    /// Field access and value parsing target.
    pub const RECORD: &str = "horizon_rowgroup::record";
    /// Performance spans.
    pub const PERF: &str = "horizon_rowgroup::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for tracking the duration of an operation.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are thin wrappers around the `tracing` macros with the engine's
/// target already filled in.
#[macro_export]
macro_rules! rowgroup_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_rowgroup", $($arg)*)
    };
}

#[macro_export]
macro_rules! rowgroup_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_rowgroup", $($arg)*)
    };
}

#[macro_export]
macro_rules! rowgroup_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_rowgroup", $($arg)*)
    };
}
