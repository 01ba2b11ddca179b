//! Typed field access for records.
//!
//! The engine never inspects a record directly. It asks the record for a
//! named field through [`FieldAccessor`], which each concrete record type
//! implements with a plain `match` on the field name.

use std::collections::HashMap;

use crate::value::FieldValue;

/// Read access to the named fields of a record.
///
/// Implementations return [`FieldValue::None`] for unknown field names; the
/// engine treats such a field as always null, so grouping by it produces a
/// single `(Unknown)` group and filtering on it only sees `(Blank)`.
///
/// # Example
///
/// ```
/// use horizon_rowgroup::{FieldAccessor, FieldValue};
///
/// struct Employee {
///     name: String,
///     department: String,
/// }
///
/// impl FieldAccessor for Employee {
///     fn field(&self, name: &str) -> FieldValue {
///         match name {
///             "Name" => self.name.as_str().into(),
///             "Department" => self.department.as_str().into(),
///             _ => FieldValue::None,
///         }
///     }
/// }
///
/// let e = Employee { name: "Ada".into(), department: "Eng".into() };
/// assert_eq!(e.field("Department").display_text(), "Eng");
/// assert!(e.field("Salary").is_none());
/// ```
pub trait FieldAccessor {
    /// Returns the value of the named field.
    fn field(&self, name: &str) -> FieldValue;
}

/// A record backed by a map of field names to values.
///
/// Useful for data that arrives without a concrete Rust type, such as rows
/// read from a CSV file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    fields: HashMap<String, FieldValue>,
}

impl FieldMap {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field using builder pattern.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field, returning the previous value if there was one.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Removes a field.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Returns the number of fields set.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the field names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl FieldAccessor for FieldMap {
    fn field(&self, name: &str) -> FieldValue {
        self.fields.get(name).cloned().unwrap_or_default()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_map_builder() {
        let record = FieldMap::new()
            .with("Name", "Report.docx")
            .with("Size", 2048i64);

        assert_eq!(record.len(), 2);
        assert_eq!(record.field("Name"), FieldValue::from("Report.docx"));
        assert_eq!(record.field("Size").as_int(), Some(2048));
    }

    #[test]
    fn test_unknown_field_is_none() {
        let record = FieldMap::new().with("Name", "x");
        assert!(record.field("Missing").is_none());
    }

    #[test]
    fn test_insert_and_remove() {
        let mut record = FieldMap::new();
        assert!(record.is_empty());
        assert!(record.insert("A", 1).is_none());
        assert_eq!(record.insert("A", 2), Some(FieldValue::Int(1)));
        assert_eq!(record.remove("A"), Some(FieldValue::Int(2)));
        assert!(record.is_empty());
    }

    #[test]
    fn test_from_iterator() {
        let record: FieldMap = [("Department", "Eng"), ("Name", "Ada")].into_iter().collect();
        let mut names: Vec<_> = record.names().collect();
        names.sort();
        assert_eq!(names, vec!["Department", "Name"]);
    }
}
