//! Single-field record sorting.

use std::cmp::Ordering;
use std::ops::Deref;

use horizon_rowgroup_core::rowgroup_trace;
use serde::{Deserialize, Serialize};

use crate::record::FieldAccessor;
use crate::value::FieldValue;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first, nulls first.
    #[default]
    Ascending,
    /// The exact reverse of ascending.
    Descending,
}

/// The field records are sorted by, and in which direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field name.
    pub field: String,
    /// Direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    /// Creates an ascending sort on `field`.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Creates a descending sort on `field`.
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Compares two field values for sorting.
///
/// Null sorts before any value. Values of the same variant use their natural
/// order; anything else (mixed variants, NaN) compares the display text
/// case-insensitively.
///
/// This rule is only transitive over keys that all take the same branch.
/// [`sort_records`] checks its keys first and picks one rule for the whole
/// collection.
pub fn compare_field_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a.is_none(), b.is_none()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }
    a.try_compare(b).unwrap_or_else(|| text_key(a).cmp(&text_key(b)))
}

/// The comparison used for one sort call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOrder {
    /// Every non-null key has the same variant and is orderable.
    Natural,
    /// Case-insensitive display text for every key.
    Text,
}

fn key_order<'a>(keys: impl IntoIterator<Item = &'a FieldValue>) -> KeyOrder {
    let mut present = keys.into_iter().filter(|key| key.is_some());
    let Some(first) = present.next() else {
        return KeyOrder::Natural;
    };
    // try_compare is None across variants and for NaN.
    if first.try_compare(first).is_some() && present.all(|key| first.try_compare(key).is_some()) {
        KeyOrder::Natural
    } else {
        KeyOrder::Text
    }
}

fn text_key(value: &FieldValue) -> String {
    value.display_text().to_lowercase()
}

/// Sorts records by the field named in `spec`.
///
/// When every non-null value has the same type the values keep their
/// natural order. A mix of types, or a NaN, sorts the whole collection by
/// case-insensitive display text. Nulls come first either way.
///
/// The ascending sort is stable; descending is the ascending result
/// reversed, so records with equal values also appear in reverse input
/// order.
pub fn sort_records<T, R>(records: Vec<T>, spec: &SortSpec) -> Vec<T>
where
    T: Deref<Target = R>,
    R: FieldAccessor + ?Sized,
{
    let mut keyed: Vec<(FieldValue, T)> = records
        .into_iter()
        .map(|record| (record.field(&spec.field), record))
        .collect();
    match key_order(keyed.iter().map(|(key, _)| key)) {
        KeyOrder::Natural => keyed.sort_by(|(a, _), (b, _)| compare_field_values(a, b)),
        KeyOrder::Text => {
            rowgroup_trace!(field = %spec.field, "mixed value types, sorting by text");
            keyed.sort_by_cached_key(|(key, _)| key.is_some().then(|| text_key(key)));
        }
    }
    if spec.direction == SortDirection::Descending {
        keyed.reverse();
    }
    keyed.into_iter().map(|(_, record)| record).collect()
}

/// Returns the sort that follows a header click on `field`.
///
/// Clicking the sorted field cycles Ascending, Descending, unsorted.
/// Clicking any other field starts at Ascending.
pub fn next_sort(current: Option<&SortSpec>, field: &str) -> Option<SortSpec> {
    match current {
        Some(spec) if spec.field == field => match spec.direction {
            SortDirection::Ascending => Some(SortSpec::descending(field)),
            SortDirection::Descending => None,
        },
        _ => Some(SortSpec::ascending(field)),
    }
}
