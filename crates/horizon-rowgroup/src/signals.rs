//! Change notification for the flat row sequence.

use horizon_rowgroup_core::Signal;

use crate::row::FlatRow;

/// Signals emitted by a [`GroupedRowFlattener`](crate::GroupedRowFlattener).
///
/// A display layer connects to these to mirror the row sequence without
/// re-reading it after every change.
///
/// # Signal Usage
///
/// - **Before modifications**: `rows_about_to_be_*`, `model_about_to_reset`
/// - **After modifications**: `rows_*`, `model_reset`
/// - **Header state changes**: `row_changed`, then `group_toggled`
///
/// Index ranges are inclusive and refer to the sequence as it is when the
/// signal fires: before the change for `rows_about_to_be_*`, after it for
/// `rows_inserted`.
pub struct RowSignals<R> {
    // -------------------------------------------------------------------------
    // Row modification signals
    // -------------------------------------------------------------------------
    /// Emitted just before rows are inserted.
    /// Args: (first row, last row)
    pub rows_about_to_be_inserted: Signal<(usize, usize)>,

    /// Emitted after rows have been inserted.
    /// Args: (first row, last row, inserted rows)
    pub rows_inserted: Signal<(usize, usize, Vec<FlatRow<R>>)>,

    /// Emitted just before rows are removed.
    /// Args: (first row, last row)
    pub rows_about_to_be_removed: Signal<(usize, usize)>,

    /// Emitted after rows have been removed.
    /// Args: (first row, last row)
    pub rows_removed: Signal<(usize, usize)>,

    // -------------------------------------------------------------------------
    // Data change signals
    // -------------------------------------------------------------------------
    /// Emitted when a header row changes in place.
    /// Args: (row, new row state)
    pub row_changed: Signal<(usize, FlatRow<R>)>,

    /// Emitted after a group has been expanded or collapsed.
    /// Args: (group key, is expanded)
    pub group_toggled: Signal<(String, bool)>,

    // -------------------------------------------------------------------------
    // Reset signals
    // -------------------------------------------------------------------------
    /// Emitted before a full rebuild replaces the sequence.
    pub model_about_to_reset: Signal<()>,

    /// Emitted after a full rebuild.
    pub model_reset: Signal<()>,
}

impl<R: Send + Sync + 'static> Default for RowSignals<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Send + Sync + 'static> RowSignals<R> {
    /// Creates a new set of row signals.
    pub fn new() -> Self {
        Self {
            rows_about_to_be_inserted: Signal::new(),
            rows_inserted: Signal::new(),
            rows_about_to_be_removed: Signal::new(),
            rows_removed: Signal::new(),
            row_changed: Signal::new(),
            group_toggled: Signal::new(),
            model_about_to_reset: Signal::new(),
            model_reset: Signal::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Convenience methods for emitting signals
    // -------------------------------------------------------------------------

    /// Emits signals for inserting `rows` starting at `first`.
    ///
    /// Calls the provided function between the about_to_be_inserted and
    /// inserted signals. Does nothing when `rows` is empty.
    pub fn emit_rows_inserted<F>(&self, first: usize, rows: Vec<FlatRow<R>>, insert_fn: F)
    where
        F: FnOnce(&[FlatRow<R>]),
    {
        if rows.is_empty() {
            return;
        }
        let last = first + rows.len() - 1;
        self.rows_about_to_be_inserted.emit((first, last));
        insert_fn(&rows);
        self.rows_inserted.emit((first, last, rows));
    }

    /// Emits signals for row removal.
    ///
    /// Calls the provided function between the about_to_be_removed and
    /// removed signals.
    pub fn emit_rows_removed<F>(&self, first: usize, last: usize, remove_fn: F)
    where
        F: FnOnce(),
    {
        self.rows_about_to_be_removed.emit((first, last));
        remove_fn();
        self.rows_removed.emit((first, last));
    }

    /// Emits signals for a full rebuild.
    ///
    /// Calls the provided function between the about_to_reset and reset signals.
    pub fn emit_reset<F>(&self, reset_fn: F)
    where
        F: FnOnce(),
    {
        self.model_about_to_reset.emit(());
        reset_fn();
        self.model_reset.emit(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_row_signals_creation() {
        let signals = RowSignals::<String>::new();
        assert_eq!(signals.rows_inserted.connection_count(), 0);
        assert_eq!(signals.model_reset.connection_count(), 0);
    }

    #[test]
    fn test_emit_rows_inserted() {
        let signals = RowSignals::<String>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let r1 = received.clone();
        signals.rows_about_to_be_inserted.connect(move |&(first, last)| {
            r1.lock().push(("about_to_insert", first, last));
        });
        let r2 = received.clone();
        signals.rows_inserted.connect(move |(first, last, rows)| {
            assert_eq!(rows.len(), last - first + 1);
            r2.lock().push(("inserted", *first, *last));
        });

        let inserted = Arc::new(Mutex::new(0));
        let inserted_clone = inserted.clone();
        let rows = vec![
            FlatRow::data(Arc::new("a".to_string()), 1),
            FlatRow::data(Arc::new("b".to_string()), 1),
        ];
        signals.emit_rows_inserted(3, rows, move |rows| {
            *inserted_clone.lock() = rows.len();
        });

        assert_eq!(*inserted.lock(), 2);
        assert_eq!(
            *received.lock(),
            vec![("about_to_insert", 3, 4), ("inserted", 3, 4)]
        );
    }

    #[test]
    fn test_emit_rows_inserted_empty_is_silent() {
        let signals = RowSignals::<String>::new();
        let hits = Arc::new(Mutex::new(0));
        let hits_clone = hits.clone();
        signals.rows_about_to_be_inserted.connect(move |_| {
            *hits_clone.lock() += 1;
        });

        let mut called = false;
        signals.emit_rows_inserted(0, Vec::new(), |_| called = true);
        assert!(!called);
        assert_eq!(*hits.lock(), 0);
    }

    #[test]
    fn test_emit_rows_removed_and_reset() {
        let signals = RowSignals::<String>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let r1 = received.clone();
        signals.rows_about_to_be_removed.connect(move |&(first, last)| {
            r1.lock().push(format!("about_to_remove {first}..={last}"));
        });
        let r2 = received.clone();
        signals.rows_removed.connect(move |&(first, last)| {
            r2.lock().push(format!("removed {first}..={last}"));
        });
        let r3 = received.clone();
        signals.model_about_to_reset.connect(move |_| r3.lock().push("about_to_reset".into()));
        let r4 = received.clone();
        signals.model_reset.connect(move |_| r4.lock().push("reset".into()));

        let r5 = received.clone();
        signals.emit_rows_removed(1, 2, move || r5.lock().push("remove".into()));
        let r6 = received.clone();
        signals.emit_reset(move || r6.lock().push("rebuild".into()));

        assert_eq!(
            *received.lock(),
            vec![
                "about_to_remove 1..=2",
                "remove",
                "removed 1..=2",
                "about_to_reset",
                "rebuild",
                "reset",
            ]
        );
    }
}
