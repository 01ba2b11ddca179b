//! Typed field values read from records.
//!
//! Every record field is surfaced as a [`FieldValue`]. The variants cover the
//! value types the grouping engine knows how to bucket and order; anything
//! else should be converted to its display text by the record type before it
//! reaches the engine.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use horizon_rowgroup_core::logging::targets;

/// Display format used for date values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Display format used for date-time values.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single field value of a record.
///
/// `FieldValue::None` stands for a null, missing or malformed value. The
/// engine never distinguishes between those three cases.
///
/// # Example
///
/// ```
/// use horizon_rowgroup::FieldValue;
///
/// let name = FieldValue::from("Alice");
/// assert_eq!(name.display_text(), "Alice");
///
/// let size = FieldValue::from(2_000_000u64);
/// assert_eq!(size.as_int(), Some(2_000_000));
///
/// assert!(FieldValue::parse_date("not a date").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Null, missing or malformed.
    #[default]
    None,
    /// Text.
    String(String),
    /// Integer number (also used for byte counts).
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time of day.
    DateTime(NaiveDateTime),
}

impl FieldValue {
    /// Returns `true` if this is `FieldValue::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, FieldValue::None)
    }

    /// Returns `true` if this contains a value.
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Attempts to get the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the calendar date of a `Date` or `DateTime` value.
    ///
    /// The time of day of a `DateTime` is dropped.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            FieldValue::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// Returns the text shown for this value.
    ///
    /// `None` renders as the empty string.
    pub fn display_text(&self) -> String {
        match self {
            FieldValue::None => String::new(),
            FieldValue::String(s) => s.clone(),
            FieldValue::Int(n) => n.to_string(),
            FieldValue::Float(n) => n.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Date(d) => d.format(DATE_FORMAT).to_string(),
            FieldValue::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        }
    }

    /// Compares two values of the same variant.
    ///
    /// Returns `None` when either side is `None`, the variants differ, or the
    /// values have no defined order (a NaN float).
    pub fn try_compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::String(a), FieldValue::String(b)) => Some(a.cmp(b)),
            (FieldValue::Int(a), FieldValue::Int(b)) => Some(a.cmp(b)),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.partial_cmp(b),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => Some(a.cmp(b)),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Parses a `YYYY-MM-DD` date.
    ///
    /// Malformed input yields `FieldValue::None`; the failure is logged at
    /// debug level and never propagated.
    pub fn parse_date(text: &str) -> FieldValue {
        Self::from_result(NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map(FieldValue::Date))
    }

    /// Parses a `YYYY-MM-DD HH:MM:SS` date-time.
    ///
    /// Malformed input yields `FieldValue::None`.
    pub fn parse_datetime(text: &str) -> FieldValue {
        Self::from_result(
            NaiveDateTime::parse_from_str(text.trim(), DATETIME_FORMAT).map(FieldValue::DateTime),
        )
    }

    /// Converts the result of a fallible field read into a value.
    ///
    /// This is the access boundary for malformed data: errors become
    /// `FieldValue::None` so grouping and sorting treat the field as missing.
    pub fn from_result<T, E>(result: Result<T, E>) -> FieldValue
    where
        T: Into<FieldValue>,
        E: fmt::Display,
    {
        match result {
            Ok(value) => value.into(),
            Err(err) => {
                tracing::debug!(target: targets::RECORD, error = %err, "malformed field value treated as missing");
                FieldValue::None
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Int(n as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Int(n as i64)
    }
}

impl From<u64> for FieldValue {
    /// Byte counts beyond `i64::MAX` saturate.
    fn from(n: u64) -> Self {
        FieldValue::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Float(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(dt: NaiveDateTime) -> Self {
        FieldValue::DateTime(dt)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => FieldValue::None,
        }
    }
}
