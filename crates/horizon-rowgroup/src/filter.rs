//! Per-field value filters.
//!
//! An [`ActiveFilterSet`] maps field names to the set of values accepted for
//! that field. Sets are closed-world: once a field has accepted values, only
//! those pass. A field without an entry is unconstrained.
//!
//! Values are compared by their display text after blank normalization, so a
//! null, empty or whitespace-only value is filtered as [`BLANK`].

use std::collections::{BTreeMap, BTreeSet, HashSet};

use horizon_rowgroup_core::logging::targets;

use crate::record::FieldAccessor;
use crate::value::FieldValue;

/// Filter value standing in for null, empty and whitespace-only values.
pub const BLANK: &str = "(Blank)";

/// Returns the text a value is filtered by.
pub fn normalize_filter_value(value: &FieldValue) -> String {
    let text = value.display_text();
    if text.trim().is_empty() {
        BLANK.to_string()
    } else {
        text
    }
}

/// One entry of a field's filter menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterItem {
    /// The normalized value.
    pub value: String,
    /// Whether the value is currently accepted.
    pub is_selected: bool,
}

/// The active filters, keyed by field name.
///
/// # Example
///
/// ```
/// use horizon_rowgroup::{ActiveFilterSet, FieldMap, BLANK};
///
/// let mut filters = ActiveFilterSet::new();
/// filters.set("Department", ["Eng", BLANK]);
///
/// assert!(filters.accepts(&FieldMap::new().with("Department", "Eng")));
/// assert!(filters.accepts(&FieldMap::new()));
/// assert!(!filters.accepts(&FieldMap::new().with("Department", "Sales")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFilterSet {
    filters: BTreeMap<String, HashSet<String>>,
}

impl ActiveFilterSet {
    /// Creates an empty filter set that accepts every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the accepted values for a field.
    ///
    /// An empty value set removes the field's filter.
    pub fn set<I, S>(&mut self, field: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let field = field.into();
        let values: HashSet<String> = values.into_iter().map(Into::into).collect();
        tracing::debug!(target: targets::FILTER, field = %field, accepted = values.len(), "filter set");
        if values.is_empty() {
            self.filters.remove(&field);
        } else {
            self.filters.insert(field, values);
        }
    }

    /// Removes the filter on a field. Returns `true` if there was one.
    pub fn clear(&mut self, field: &str) -> bool {
        let removed = self.filters.remove(field).is_some();
        if removed {
            tracing::debug!(target: targets::FILTER, field, "filter cleared");
        }
        removed
    }

    /// Removes every filter.
    pub fn clear_all(&mut self) {
        self.filters.clear();
    }

    /// Returns the accepted values for a field, if it is constrained.
    pub fn accepted(&self, field: &str) -> Option<&HashSet<String>> {
        self.filters.get(field)
    }

    /// Returns `true` if a field is constrained.
    pub fn is_active(&self, field: &str) -> bool {
        self.filters.contains_key(field)
    }

    /// Returns `true` if no field is constrained.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns the number of constrained fields.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Iterates over the constrained field names in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// Returns `true` if the record passes every filter.
    pub fn accepts<R: FieldAccessor + ?Sized>(&self, record: &R) -> bool {
        self.accepts_except(record, None)
    }

    /// Returns `true` if the record passes every filter except the one on
    /// `skip`.
    pub fn accepts_except<R: FieldAccessor + ?Sized>(&self, record: &R, skip: Option<&str>) -> bool {
        self.filters
            .iter()
            .filter(|(field, _)| Some(field.as_str()) != skip)
            .all(|(field, accepted)| {
                accepted.contains(&normalize_filter_value(&record.field(field)))
            })
    }

    /// Builds the filter menu for a field.
    ///
    /// Lists the distinct normalized values of `field` among the records that
    /// pass every *other* filter, narrowed to values containing `search`
    /// (case-insensitive). Entries are sorted case-insensitively. An entry is
    /// selected when a search is active, when the field is unconstrained, or
    /// when its value is already accepted.
    pub fn filter_items<'a, R, I>(&self, records: I, field: &str, search: Option<&str>) -> Vec<FilterItem>
    where
        R: FieldAccessor + ?Sized + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let values: BTreeSet<String> = records
            .into_iter()
            .filter(|record| self.accepts_except(*record, Some(field)))
            .map(|record| normalize_filter_value(&record.field(field)))
            .filter(|value| match &search {
                Some(needle) => value.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .collect();

        let accepted = self.accepted(field);
        let mut items: Vec<FilterItem> = values
            .into_iter()
            .map(|value| {
                let is_selected = search.is_some()
                    || accepted.is_none_or(|accepted| accepted.contains(&value));
                FilterItem { value, is_selected }
            })
            .collect();

        items.sort_by(|a, b| {
            a.value
                .to_lowercase()
                .cmp(&b.value.to_lowercase())
                .then_with(|| a.value.cmp(&b.value))
        });
        items
    }
}
