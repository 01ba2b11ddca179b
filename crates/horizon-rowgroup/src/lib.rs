//! Horizon Rowgroup: grouping and flattening of tabular records.
//!
//! This crate turns a collection of records into the flat row sequence a
//! virtualized list control displays. Records can be filtered per field,
//! sorted by one field, and grouped by one field into collapsible groups:
//!
//! ```text
//! [Eng]          header, depth 0
//!   Ada          data,   depth 1
//!   Bob          data,   depth 1
//! [Sales]        header, depth 0 (collapsed)
//! ```
//!
//! # Key Types
//!
//! - [`GroupedRowFlattener`] - Owns the records and the row sequence
//! - [`FieldAccessor`] - Typed field access, implemented per record type
//! - [`FieldValue`] - A single field value
//! - [`FlatRow`] - A header or data row
//! - [`RowSignals`] - Change notification for the row sequence
//! - [`GroupKeyPolicy`] - Date, size, file type and name bucketing
//! - [`ActiveFilterSet`] - Per-field accepted values
//! - [`FlattenerConfig`] - TOML-loadable configuration
//!
//! # Example
//!
//! ```
//! use horizon_rowgroup::{FieldAccessor, FieldValue, GroupedRowFlattener, SortSpec};
//!
//! struct File {
//!     name: &'static str,
//!     size: u64,
//! }
//!
//! impl FieldAccessor for File {
//!     fn field(&self, name: &str) -> FieldValue {
//!         match name {
//!             "Name" => self.name.into(),
//!             "Size" => self.size.into(),
//!             _ => FieldValue::None,
//!         }
//!     }
//! }
//!
//! let files = vec![
//!     File { name: "notes.txt", size: 500 },
//!     File { name: "empty.log", size: 0 },
//!     File { name: "movie.mp4", size: 2_000_000 },
//! ];
//!
//! let flattener = GroupedRowFlattener::with_source(files)
//!     .with_group_field("Size")
//!     .with_sort(SortSpec::ascending("Name"));
//!
//! let headers: Vec<_> = flattener
//!     .rows()
//!     .iter()
//!     .filter_map(|row| row.group_key())
//!     .collect();
//! assert_eq!(headers, vec!["Empty", "Tiny (< 1 KB)", "Medium (< 1 MB)"]);
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod flattener;
pub mod group_key;
pub mod record;
pub mod row;
pub mod signals;
pub mod sort;
pub mod source;
pub mod value;

pub use config::{FlattenerConfig, FlattenerConfigBuilder};
pub use error::{Error, Result};
pub use filter::{ActiveFilterSet, BLANK, FilterItem, normalize_filter_value};
pub use flattener::GroupedRowFlattener;
pub use group_key::{
    FieldKind, GroupKeyFormatter, GroupKeyPolicy, UNKNOWN, YearRank, date_bucket,
    file_type_category, name_bucket, size_bucket,
};
pub use record::{FieldAccessor, FieldMap};
pub use row::FlatRow;
pub use signals::RowSignals;
pub use sort::{SortDirection, SortSpec, compare_field_values, next_sort, sort_records};
pub use source::{SourceBatch, SourceQueue, SourceUpdate};
pub use value::FieldValue;

pub use horizon_rowgroup_core::{ConnectionId, Signal};

// Static assertions for thread safety
static_assertions::assert_impl_all!(FieldValue: Send, Sync);
static_assertions::assert_impl_all!(FlatRow<FieldMap>: Send, Sync);
static_assertions::assert_impl_all!(RowSignals<FieldMap>: Send, Sync);
static_assertions::assert_impl_all!(GroupedRowFlattener<FieldMap>: Send, Sync);
static_assertions::assert_impl_all!(SourceQueue<FieldMap>: Send, Sync, Clone);
