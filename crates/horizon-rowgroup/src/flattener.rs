//! The grouping and flattening engine.
//!
//! [`GroupedRowFlattener`] turns a collection of records into the flat row
//! sequence a virtualized list displays: optional group headers, each
//! followed by its member rows while expanded.
//!
//! # Rebuilds and toggles
//!
//! Changing the source, filters, sort or grouping field rebuilds the whole
//! sequence and is reported through the reset signals. Expanding or
//! collapsing a group patches the sequence in place and is reported as one
//! contiguous insertion or removal, so a view can update without
//! re-reading every row.
//!
//! Expansion state is kept per group key and survives rebuilds. A key seen
//! for the first time takes the flattener's default (expanded unless
//! configured otherwise).
//!
//! # Threading
//!
//! Every mutating operation takes `&mut self`, so calls are serialized by
//! the borrow checker. A host that shares a flattener between threads wraps
//! it in a mutex; background loaders should use a
//! [`SourceQueue`](crate::SourceQueue) instead of locking.
//!
//! # Example
//!
//! ```
//! use horizon_rowgroup::{FieldMap, GroupedRowFlattener, SortSpec};
//!
//! let people = vec![
//!     FieldMap::new().with("Name", "Sam").with("Department", "Sales"),
//!     FieldMap::new().with("Name", "Eve").with("Department", "Eng"),
//!     FieldMap::new().with("Name", "Ada").with("Department", "Eng"),
//! ];
//!
//! let mut flattener = GroupedRowFlattener::with_source(people)
//!     .with_group_field("Department")
//!     .with_sort(SortSpec::ascending("Name"));
//!
//! // Eng header, Ada, Eve, Sales header, Sam
//! assert_eq!(flattener.len(), 5);
//! assert_eq!(flattener.row(0).unwrap().group_key(), Some("Eng"));
//!
//! flattener.toggle_group("Eng");
//! assert_eq!(flattener.len(), 3);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use horizon_rowgroup_core::logging::targets;
use horizon_rowgroup_core::{PerfSpan, rowgroup_debug};

use crate::config::FlattenerConfig;
use crate::error::Result;
use crate::filter::{ActiveFilterSet, FilterItem};
use crate::group_key::{GroupKeyFormatter, GroupKeyPolicy};
use crate::record::FieldAccessor;
use crate::row::FlatRow;
use crate::signals::RowSignals;
use crate::sort::{SortDirection, SortSpec, next_sort, sort_records};
use crate::source::{SourceBatch, SourceQueue, SourceUpdate};

/// Groups, filters, sorts and flattens records into display rows.
///
/// See the [module documentation](self) for an overview.
pub struct GroupedRowFlattener<R> {
    source: Vec<Arc<R>>,
    group_field: Option<String>,
    filters: ActiveFilterSet,
    sort: Option<SortSpec>,
    formatter: Box<dyn GroupKeyFormatter>,
    expansion: HashMap<String, bool>,
    default_expanded: bool,
    rows: Vec<FlatRow<R>>,
    signals: RowSignals<R>,
    update_tx: Sender<SourceUpdate<R>>,
    update_rx: Receiver<SourceUpdate<R>>,
}

impl<R> Default for GroupedRowFlattener<R>
where
    R: FieldAccessor + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R> GroupedRowFlattener<R>
where
    R: FieldAccessor + Send + Sync + 'static,
{
    // =========================================================================
    // Construction
    // =========================================================================

    /// Creates an empty, ungrouped flattener with the standard group-key
    /// policy.
    pub fn new() -> Self {
        let (update_tx, update_rx) = unbounded();
        Self {
            source: Vec::new(),
            group_field: None,
            filters: ActiveFilterSet::new(),
            sort: None,
            formatter: Box::new(GroupKeyPolicy::new()),
            expansion: HashMap::new(),
            default_expanded: true,
            rows: Vec::new(),
            signals: RowSignals::new(),
            update_tx,
            update_rx,
        }
    }

    /// Creates a flattener over the given records.
    pub fn with_source<I>(records: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<R>>,
    {
        let mut flattener = Self::new();
        flattener.set_source(records);
        flattener
    }

    /// Creates an empty flattener from a configuration.
    pub fn from_config(config: &FlattenerConfig) -> Result<Self> {
        let mut flattener = Self::new();
        flattener.formatter = Box::new(config.group_key_policy()?);
        flattener.group_field = normalize_field(config.group_field.as_deref());
        flattener.sort = config.sort.clone();
        flattener.default_expanded = config.default_expanded;
        tracing::debug!(
            target: targets::FLATTENER,
            group_field = ?flattener.group_field,
            sort = ?flattener.sort,
            "flattener created from config"
        );
        Ok(flattener)
    }

    /// Sets the grouping field using builder pattern.
    pub fn with_group_field(mut self, field: &str) -> Self {
        self.on_group_field_changed(Some(field));
        self
    }

    /// Sets the sort using builder pattern.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.set_sort(Some(sort));
        self
    }

    /// Sets the group-key formatter using builder pattern.
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: GroupKeyFormatter + 'static,
    {
        self.set_formatter(formatter);
        self
    }

    /// Sets the state of never-seen groups using builder pattern.
    pub fn with_default_expanded(mut self, expanded: bool) -> Self {
        self.default_expanded = expanded;
        self
    }

    // =========================================================================
    // Source
    // =========================================================================

    /// Replaces the source collection and rebuilds.
    pub fn set_source<I>(&mut self, records: I)
    where
        I: IntoIterator,
        I::Item: Into<Arc<R>>,
    {
        self.source = records.into_iter().map(Into::into).collect();
        self.rebuild();
    }

    /// Rebuilds after the source records changed in place.
    pub fn on_source_changed(&mut self) {
        self.rebuild();
    }

    /// Returns a guard for changing the source with a single rebuild.
    ///
    /// ```
    /// use horizon_rowgroup::{FieldMap, GroupedRowFlattener};
    /// use std::sync::Arc;
    ///
    /// let mut flattener = GroupedRowFlattener::<FieldMap>::new();
    /// {
    ///     let mut source = flattener.batch();
    ///     source.push(Arc::new(FieldMap::new().with("Name", "a")));
    ///     source.push(Arc::new(FieldMap::new().with("Name", "b")));
    /// }
    /// assert_eq!(flattener.len(), 2);
    /// ```
    pub fn batch(&mut self) -> SourceBatch<'_, R> {
        SourceBatch::new(self)
    }

    /// Returns a handle other threads can queue source updates through.
    pub fn update_queue(&self) -> SourceQueue<R> {
        SourceQueue::new(self.update_tx.clone())
    }

    /// Applies every queued source update, then rebuilds once.
    ///
    /// Returns the number of updates applied. Nothing is rebuilt when the
    /// queue was empty.
    pub fn apply_pending_updates(&mut self) -> usize {
        let mut applied = 0;
        for update in self.update_rx.try_iter() {
            update.apply(&mut self.source);
            applied += 1;
        }
        if applied > 0 {
            tracing::debug!(target: targets::FLATTENER, applied, "applied queued source updates");
            self.rebuild();
        }
        applied
    }

    /// Returns the source records.
    pub fn source(&self) -> &[Arc<R>] {
        &self.source
    }

    pub(crate) fn source_vec(&self) -> &Vec<Arc<R>> {
        &self.source
    }

    pub(crate) fn source_vec_mut(&mut self) -> &mut Vec<Arc<R>> {
        &mut self.source
    }

    // =========================================================================
    // Filtering, sorting, grouping
    // =========================================================================

    /// Sets the accepted values of a field and rebuilds.
    ///
    /// An empty value set removes the field's filter.
    pub fn on_filter_changed<I, S>(&mut self, field: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.set(field, values);
        self.rebuild();
    }

    /// Removes the filter on `field`, or every filter for `None`, and
    /// rebuilds.
    pub fn on_filter_cleared(&mut self, field: Option<&str>) {
        match field {
            Some(field) => {
                self.filters.clear(field);
            }
            None => self.filters.clear_all(),
        }
        self.rebuild();
    }

    /// Builds the filter menu for a field over the whole source.
    ///
    /// See [`ActiveFilterSet::filter_items`].
    pub fn filter_items(&self, field: &str, search: Option<&str>) -> Vec<FilterItem> {
        self.filters
            .filter_items(self.source.iter().map(|r| &**r), field, search)
    }

    /// Returns the active filters.
    pub fn filters(&self) -> &ActiveFilterSet {
        &self.filters
    }

    /// Advances the sort on `field` and rebuilds.
    ///
    /// Repeated requests on the same field cycle Ascending, Descending and
    /// unsorted. Returns the new direction, or `None` when unsorted.
    pub fn on_sort_requested(&mut self, field: &str) -> Option<SortDirection> {
        self.sort = next_sort(self.sort.as_ref(), field);
        self.rebuild();
        self.sort.as_ref().map(|s| s.direction)
    }

    /// Sets the sort and rebuilds. `None` keeps source order.
    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
        self.rebuild();
    }

    /// Returns the current sort.
    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Sets the grouping field and rebuilds.
    ///
    /// `None` or a blank name turns grouping off.
    pub fn on_group_field_changed(&mut self, field: Option<&str>) {
        self.group_field = normalize_field(field);
        rowgroup_debug!(group_field = ?self.group_field, "group field changed");
        self.rebuild();
    }

    /// Returns the grouping field.
    pub fn group_field(&self) -> Option<&str> {
        self.group_field.as_deref()
    }

    /// Replaces the group-key formatter and rebuilds.
    pub fn set_formatter<F>(&mut self, formatter: F)
    where
        F: GroupKeyFormatter + 'static,
    {
        self.formatter = Box::new(formatter);
        self.rebuild();
    }

    /// Sets the state of groups seen for the first time.
    ///
    /// Groups already in the sequence keep their state.
    pub fn set_default_expanded(&mut self, expanded: bool) {
        self.default_expanded = expanded;
    }

    /// Returns the state of groups seen for the first time.
    pub fn default_expanded(&self) -> bool {
        self.default_expanded
    }

    // =========================================================================
    // Rebuild
    // =========================================================================

    /// Recomputes the whole row sequence.
    ///
    /// Emits `model_about_to_reset` and `model_reset` around the swap.
    pub fn rebuild(&mut self) {
        let _perf = PerfSpan::new("rebuild");
        let rows = self.build_rows();
        tracing::debug!(
            target: targets::FLATTENER,
            source = self.source.len(),
            rows = rows.len(),
            groups = self.expansion.len(),
            "rebuilt rows"
        );
        self.signals.emit_reset(|| self.rows = rows);
    }

    fn build_rows(&mut self) -> Vec<FlatRow<R>> {
        let filtered: Vec<Arc<R>> = self
            .source
            .iter()
            .filter(|record| self.filters.accepts::<R>(record))
            .cloned()
            .collect();

        let Some(field) = self.group_field.clone() else {
            self.expansion.clear();
            return self
                .apply_sort(filtered)
                .into_iter()
                .map(|record| FlatRow::data(record, 0))
                .collect();
        };

        let groups = self.partition(&field, filtered);
        let mut expansion = HashMap::with_capacity(groups.len());
        let mut rows = Vec::new();
        for (key, members) in groups {
            let expanded = self
                .expansion
                .get(&key)
                .copied()
                .unwrap_or(self.default_expanded);
            rows.push(FlatRow::header(key.clone(), expanded, members.len()));
            if expanded {
                rows.extend(
                    self.apply_sort(members)
                        .into_iter()
                        .map(|record| FlatRow::data(record, 1)),
                );
            }
            expansion.insert(key, expanded);
        }
        self.expansion = expansion;
        rows
    }

    /// Splits records into groups ordered by the formatter's sort key.
    ///
    /// Members keep their relative order; groups with equal sort keys keep
    /// the order in which they were first seen.
    fn partition(&self, field: &str, records: Vec<Arc<R>>) -> Vec<(String, Vec<Arc<R>>)> {
        let mut groups: Vec<(String, Vec<Arc<R>>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in records {
            let key = self.formatter.format_group_key(field, &record.field(field));
            match index.get(&key) {
                Some(&i) => groups[i].1.push(record),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push((key, vec![record]));
                }
            }
        }
        groups.sort_by_cached_key(|(key, _)| self.formatter.sort_key(field, key));
        groups
    }

    fn apply_sort(&self, records: Vec<Arc<R>>) -> Vec<Arc<R>> {
        match &self.sort {
            Some(spec) => sort_records(records, spec),
            None => records,
        }
    }

    /// Returns the current members of one group, filtered and sorted.
    fn group_members(&self, field: &str, key: &str) -> Vec<Arc<R>> {
        let members = self
            .source
            .iter()
            .filter(|record| self.filters.accepts::<R>(record))
            .filter(|record| self.formatter.format_group_key(field, &record.field(field)) == key)
            .cloned()
            .collect();
        self.apply_sort(members)
    }

    // =========================================================================
    // Expand / collapse
    // =========================================================================

    /// Toggles the group with the given key.
    ///
    /// Returns `false`, changing nothing, if no header has that key.
    pub fn toggle_group(&mut self, key: &str) -> bool {
        match self.header_position(key) {
            Some(index) => self.toggle_group_at(index),
            None => {
                tracing::trace!(target: targets::FLATTENER, key, "toggle ignored, no such group");
                false
            }
        }
    }

    /// Toggles the header at `index`.
    ///
    /// Returns `false`, changing nothing, if `index` is not a header row.
    pub fn toggle_group_at(&mut self, index: usize) -> bool {
        let expanded = match self.rows.get(index) {
            Some(row) if row.is_group_header() => row.is_expanded(),
            _ => return false,
        };
        if expanded {
            self.collapse_at(index);
        } else {
            self.expand_at(index);
        }
        true
    }

    /// Expands every collapsed group, first to last.
    pub fn expand_all(&mut self) {
        let mut index = 0;
        while index < self.rows.len() {
            let row = &self.rows[index];
            if row.is_group_header() && !row.is_expanded() {
                self.expand_at(index);
            }
            index += 1;
        }
    }

    /// Collapses every expanded group, last to first.
    pub fn collapse_all(&mut self) {
        let expanded: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_group_header() && row.is_expanded())
            .map(|(index, _)| index)
            .collect();
        for index in expanded.into_iter().rev() {
            self.collapse_at(index);
        }
    }

    fn expand_at(&mut self, index: usize) {
        let Some(key) = self.rows[index].group_key().map(str::to_string) else {
            return;
        };
        let members = match self.group_field.as_deref() {
            Some(field) => self.group_members(field, &key),
            None => Vec::new(),
        };
        tracing::trace!(target: targets::FLATTENER, key = %key, index, members = members.len(), "expanding group");

        self.expansion.insert(key.clone(), true);
        let header = &mut self.rows[index];
        header.set_expanded(true);
        header.set_item_count(members.len());
        self.signals.row_changed.emit((index, header.clone()));

        let depth = self.rows[index].depth() + 1;
        let new_rows: Vec<FlatRow<R>> = members
            .into_iter()
            .map(|record| FlatRow::data(record, depth))
            .collect();
        let at = index + 1;
        self.signals.emit_rows_inserted(at, new_rows, |rows| {
            self.rows.splice(at..at, rows.iter().cloned());
        });

        self.signals.group_toggled.emit((key, true));
    }

    fn collapse_at(&mut self, index: usize) {
        let Some(key) = self.rows[index].group_key().map(str::to_string) else {
            return;
        };
        let depth = self.rows[index].depth();
        let first = index + 1;
        let end = self.rows[first..]
            .iter()
            .position(|row| row.depth() <= depth)
            .map_or(self.rows.len(), |offset| first + offset);
        tracing::trace!(target: targets::FLATTENER, key = %key, index, removed = end - first, "collapsing group");

        self.expansion.insert(key.clone(), false);
        let header = &mut self.rows[index];
        header.set_expanded(false);
        self.signals.row_changed.emit((index, header.clone()));

        if end > first {
            self.signals.emit_rows_removed(first, end - 1, || {
                self.rows.drain(first..end);
            });
        }

        self.signals.group_toggled.emit((key, false));
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// Returns the row sequence.
    pub fn rows(&self) -> &[FlatRow<R>] {
        &self.rows
    }

    /// Returns the row at `index`.
    pub fn row(&self, index: usize) -> Option<&FlatRow<R>> {
        self.rows.get(index)
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the index of the header with the given key.
    pub fn header_position(&self, key: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.group_key() == Some(key))
    }

    /// Returns whether the group with the given key is expanded, or `None`
    /// if the sequence has no such group.
    pub fn is_group_expanded(&self, key: &str) -> Option<bool> {
        self.expansion.get(key).copied()
    }

    /// Returns the signals for observing the row sequence.
    pub fn signals(&self) -> &RowSignals<R> {
        &self.signals
    }
}

fn normalize_field(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}
