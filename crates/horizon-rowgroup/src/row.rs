//! The flat row type shown by a display layer.

use std::fmt;
use std::sync::Arc;

/// One row of the flattened sequence: a group header or a data row.
///
/// Headers are always at depth 0. Data rows are at depth 1 under a header,
/// or depth 0 when the sequence is not grouped. A header's children follow
/// it contiguously.
pub struct FlatRow<R> {
    kind: RowKind<R>,
    depth: usize,
}

enum RowKind<R> {
    Header {
        key: String,
        expanded: bool,
        item_count: usize,
    },
    Data(Arc<R>),
}

impl<R> FlatRow<R> {
    /// Creates a group header row.
    pub fn header(key: impl Into<String>, expanded: bool, item_count: usize) -> Self {
        Self {
            kind: RowKind::Header {
                key: key.into(),
                expanded,
                item_count,
            },
            depth: 0,
        }
    }

    /// Creates a data row at the given depth.
    pub fn data(record: Arc<R>, depth: usize) -> Self {
        Self {
            kind: RowKind::Data(record),
            depth,
        }
    }

    /// Returns `true` for a group header row.
    pub fn is_group_header(&self) -> bool {
        matches!(self.kind, RowKind::Header { .. })
    }

    /// Returns the group key of a header row.
    pub fn group_key(&self) -> Option<&str> {
        match &self.kind {
            RowKind::Header { key, .. } => Some(key),
            RowKind::Data(_) => None,
        }
    }

    /// Returns the record of a data row.
    pub fn record(&self) -> Option<&Arc<R>> {
        match &self.kind {
            RowKind::Header { .. } => None,
            RowKind::Data(record) => Some(record),
        }
    }

    /// Returns the nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns whether a header is expanded. Always `false` for data rows.
    pub fn is_expanded(&self) -> bool {
        match self.kind {
            RowKind::Header { expanded, .. } => expanded,
            RowKind::Data(_) => false,
        }
    }

    /// Returns the number of records in a header's group. `0` for data rows.
    ///
    /// The count reflects the active filters and does not change when the
    /// group is collapsed.
    pub fn item_count(&self) -> usize {
        match self.kind {
            RowKind::Header { item_count, .. } => item_count,
            RowKind::Data(_) => 0,
        }
    }

    pub(crate) fn set_expanded(&mut self, value: bool) {
        if let RowKind::Header { expanded, .. } = &mut self.kind {
            *expanded = value;
        }
    }

    pub(crate) fn set_item_count(&mut self, value: usize) {
        if let RowKind::Header { item_count, .. } = &mut self.kind {
            *item_count = value;
        }
    }
}

impl<R> Clone for FlatRow<R> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            RowKind::Header {
                key,
                expanded,
                item_count,
            } => RowKind::Header {
                key: key.clone(),
                expanded: *expanded,
                item_count: *item_count,
            },
            RowKind::Data(record) => RowKind::Data(Arc::clone(record)),
        };
        Self {
            kind,
            depth: self.depth,
        }
    }
}

/// Rows are equal when they are the same kind at the same depth and either
/// carry the same header state or point at the same record.
impl<R> PartialEq for FlatRow<R> {
    fn eq(&self, other: &Self) -> bool {
        if self.depth != other.depth {
            return false;
        }
        match (&self.kind, &other.kind) {
            (
                RowKind::Header {
                    key: a,
                    expanded: ea,
                    item_count: ca,
                },
                RowKind::Header {
                    key: b,
                    expanded: eb,
                    item_count: cb,
                },
            ) => a == b && ea == eb && ca == cb,
            (RowKind::Data(a), RowKind::Data(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<R> fmt::Debug for FlatRow<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RowKind::Header {
                key,
                expanded,
                item_count,
            } => f
                .debug_struct("Header")
                .field("key", key)
                .field("expanded", expanded)
                .field("item_count", item_count)
                .finish(),
            RowKind::Data(record) => f
                .debug_struct("Data")
                .field("record", &Arc::as_ptr(record))
                .field("depth", &self.depth)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_accessors() {
        let row = FlatRow::<()>::header("Eng", true, 3);
        assert!(row.is_group_header());
        assert_eq!(row.group_key(), Some("Eng"));
        assert!(row.record().is_none());
        assert_eq!(row.depth(), 0);
        assert!(row.is_expanded());
        assert_eq!(row.item_count(), 3);
    }

    #[test]
    fn test_data_accessors() {
        let record = Arc::new(7);
        let row = FlatRow::data(record.clone(), 1);
        assert!(!row.is_group_header());
        assert!(row.group_key().is_none());
        assert!(Arc::ptr_eq(row.record().unwrap(), &record));
        assert_eq!(row.depth(), 1);
        assert!(!row.is_expanded());
    }

    #[test]
    fn test_set_expanded_ignores_data_rows() {
        let mut header = FlatRow::<i32>::header("A", true, 1);
        header.set_expanded(false);
        assert!(!header.is_expanded());

        let mut data = FlatRow::data(Arc::new(1), 1);
        data.set_expanded(true);
        assert!(!data.is_expanded());
    }

    #[test]
    fn test_equality_is_record_identity() {
        let a = Arc::new(String::from("same"));
        let b = Arc::new(String::from("same"));
        assert_eq!(FlatRow::data(a.clone(), 1), FlatRow::data(a.clone(), 1));
        assert_ne!(FlatRow::data(a.clone(), 1), FlatRow::data(b, 1));
        assert_ne!(FlatRow::data(a.clone(), 0), FlatRow::data(a, 1));
    }
}
