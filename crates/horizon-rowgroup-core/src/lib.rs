//! Core systems for Horizon Rowgroup.
//!
//! This crate provides the foundational pieces shared by the row grouping
//! engine:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Logging**: `tracing` targets, performance spans and logging macros
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_rowgroup_core::Signal;
//!
//! // Create a signal that reports an inserted row range
//! let rows_inserted = Signal::<(usize, usize)>::new();
//!
//! let conn_id = rows_inserted.connect(|(first, last)| {
//!     println!("Rows {}..={} inserted", first, last);
//! });
//!
//! rows_inserted.emit((3, 5));
//! rows_inserted.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
