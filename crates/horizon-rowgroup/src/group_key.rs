//! Group-key formatting and group ordering.
//!
//! A grouped rebuild partitions records by a *group key*: a label derived
//! from the grouping field's value. Groups are then ordered by a separate
//! *sort key* so that, for example, `Today` comes before `Last Month` and
//! `Tiny` before `Huge`, which plain alphabetical order would not give.
//!
//! [`GroupKeyFormatter`] is the pluggable seam; [`GroupKeyPolicy`] is the
//! standard implementation, dispatching on the [`FieldKind`] configured for
//! each field name.
//!
//! # Example
//!
//! ```
//! use horizon_rowgroup::{FieldValue, GroupKeyFormatter, GroupKeyPolicy};
//!
//! let policy = GroupKeyPolicy::new();
//!
//! assert_eq!(policy.format_group_key("Size", &FieldValue::from(500)), "Tiny (< 1 KB)");
//! assert_eq!(policy.format_group_key("FileType", &FieldValue::from(".pdf")), "Documents");
//! assert_eq!(policy.format_group_key("Name", &FieldValue::from("kiwi")), "J - L");
//! assert_eq!(policy.format_group_key("Department", &FieldValue::None), "(Unknown)");
//!
//! assert_eq!(policy.sort_key("Size", "Tiny (< 1 KB)"), "2_Tiny");
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use horizon_rowgroup_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::FieldValue;

/// Group key used for null or missing values.
pub const UNKNOWN: &str = "(Unknown)";

/// Group key for an empty file extension.
pub const NO_EXTENSION: &str = "No Extension";

/// Group key for names that do not start with an ASCII letter.
pub const OTHER_NAMES: &str = "# (Other)";

const KIB: i64 = 1024;
const MIB: i64 = 1024 * KIB;
const GIB: i64 = 1024 * MIB;

/// Size buckets: exclusive upper bound and label.
const SIZE_BUCKETS: &[(i64, &str)] = &[
    (KIB, "Tiny (< 1 KB)"),
    (100 * KIB, "Small (< 100 KB)"),
    (MIB, "Medium (< 1 MB)"),
    (10 * MIB, "Large (< 10 MB)"),
    (100 * MIB, "Very Large (< 100 MB)"),
    (GIB, "Huge (< 1 GB)"),
];

const SIZE_EMPTY: &str = "Empty";
const SIZE_GIGANTIC: &str = "Gigantic (> 1 GB)";

/// Size sort keys, matched by the leading word(s) of the label.
const SIZE_RANKS: &[(&str, &str)] = &[
    ("Empty", "1_Empty"),
    ("Tiny", "2_Tiny"),
    ("Small", "3_Small"),
    ("Medium", "4_Medium"),
    ("Large", "5_Large"),
    ("Very Large", "6_Very Large"),
    ("Huge", "7_Huge"),
    ("Gigantic", "8_Gigantic"),
];

/// Relative date buckets in display order.
const DATE_RANKS: &[(&str, &str)] = &[
    ("Today", "1_Today"),
    ("Yesterday", "2_Yesterday"),
    ("This Week", "3_This Week"),
    ("Last Week", "4_Last Week"),
    ("This Month", "5_This Month"),
    ("Last Month", "6_Last Month"),
];

const FILE_CATEGORIES: &[(&str, &[&str])] = &[
    ("Documents", &["DOC", "DOCX", "PDF", "TXT", "RTF", "ODT"]),
    ("Spreadsheets", &["XLS", "XLSX", "CSV", "ODS"]),
    ("Presentations", &["PPT", "PPTX", "ODP"]),
    (
        "Images",
        &["JPG", "JPEG", "PNG", "GIF", "BMP", "SVG", "WEBP", "ICO"],
    ),
    ("Videos", &["MP4", "AVI", "MKV", "MOV", "WMV", "FLV", "WEBM"]),
    ("Audio", &["MP3", "WAV", "FLAC", "AAC", "OGG", "WMA", "M4A"]),
    ("Archives", &["ZIP", "RAR", "7Z", "TAR", "GZ", "BZ2"]),
    (
        "Code Files",
        &["CS", "XAML", "XML", "JSON", "JS", "TS", "PY", "JAVA", "CPP", "H"],
    ),
    ("Applications", &["EXE", "DLL", "MSI", "APP"]),
];

const NAME_BUCKETS: &[(char, char, &str)] = &[
    ('A', 'C', "A - C"),
    ('D', 'F', "D - F"),
    ('G', 'I', "G - I"),
    ('J', 'L', "J - L"),
    ('M', 'O', "M - O"),
    ('P', 'R', "P - R"),
    ('S', 'U', "S - U"),
    ('V', 'X', "V - X"),
    ('Y', 'Z', "Y - Z"),
];

/// How a field's values are turned into group keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Relative date buckets (`Today`, `Last Week`, `March 2024`, `2019`).
    Date,
    /// Byte-count buckets (`Empty`, `Tiny (< 1 KB)`, ...).
    Size,
    /// File extension categories (`Documents`, `Images`, ...).
    #[serde(alias = "filetype")]
    FileType,
    /// First-letter runs (`A - C`, `D - F`, ...).
    Name,
    /// The value's display text.
    #[default]
    Plain,
}

impl FieldKind {
    /// Returns the configuration name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Date => "date",
            FieldKind::Size => "size",
            FieldKind::FileType => "file_type",
            FieldKind::Name => "name",
            FieldKind::Plain => "plain",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(FieldKind::Date),
            "size" => Ok(FieldKind::Size),
            "file_type" | "filetype" => Ok(FieldKind::FileType),
            "name" => Ok(FieldKind::Name),
            "plain" => Ok(FieldKind::Plain),
            _ => Err(Error::unknown_field_kind(s)),
        }
    }
}

/// How date buckets older than `Last Month` are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearRank {
    /// Buckets whose label contains the digit `2` rank before all others,
    /// then plain label order. Matches older releases; note that the digit
    /// may appear anywhere, so `1992` ranks with the 2000s.
    #[default]
    ContainsTwo,
    /// Month-year buckets newest first, then year buckets newest first.
    Numeric,
}

impl YearRank {
    /// Returns the configuration name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            YearRank::ContainsTwo => "contains_two",
            YearRank::Numeric => "numeric",
        }
    }
}

impl FromStr for YearRank {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contains_two" => Ok(YearRank::ContainsTwo),
            "numeric" => Ok(YearRank::Numeric),
            _ => Err(Error::unknown_year_rank(s)),
        }
    }
}

/// Derives group keys and group sort keys from field values.
///
/// Implementations must be deterministic: the same field and value always
/// give the same key within one rebuild.
pub trait GroupKeyFormatter: Send + Sync {
    /// Returns the group key (and header label) for a value of `field`.
    fn format_group_key(&self, field: &str, value: &FieldValue) -> String;

    /// Returns the string groups of `field` are ordered by, ascending.
    fn sort_key(&self, field: &str, group_key: &str) -> String;
}

/// The standard group-key policy.
#[derive(Debug, Clone)]
pub struct GroupKeyPolicy {
    field_kinds: Vec<(String, FieldKind)>,
    reference_date: Option<NaiveDate>,
    year_rank: YearRank,
}

impl Default for GroupKeyPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupKeyPolicy {
    /// Creates a policy with the default field kinds.
    ///
    /// `DateModified` and `Dob` are dates, `Size` is a byte count, `FileType`
    /// is a file extension and `Name` is a name. Every other field is plain.
    pub fn new() -> Self {
        Self::plain()
            .with_field_kind("DateModified", FieldKind::Date)
            .with_field_kind("Dob", FieldKind::Date)
            .with_field_kind("Size", FieldKind::Size)
            .with_field_kind("FileType", FieldKind::FileType)
            .with_field_kind("Name", FieldKind::Name)
    }

    /// Creates a policy in which every field is plain.
    pub fn plain() -> Self {
        Self {
            field_kinds: Vec::new(),
            reference_date: None,
            year_rank: YearRank::default(),
        }
    }

    /// Sets the kind of a field using builder pattern.
    pub fn with_field_kind(mut self, field: impl Into<String>, kind: FieldKind) -> Self {
        self.set_field_kind(field, kind);
        self
    }

    /// Sets a fixed reference date for date buckets using builder pattern.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Sets the year ordering mode using builder pattern.
    pub fn with_year_rank(mut self, year_rank: YearRank) -> Self {
        self.year_rank = year_rank;
        self
    }

    /// Sets the kind of a field.
    pub fn set_field_kind(&mut self, field: impl Into<String>, kind: FieldKind) {
        let field = field.into();
        match self.field_kinds.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = kind,
            None => self.field_kinds.push((field, kind)),
        }
    }

    /// Sets or clears the fixed reference date.
    ///
    /// Without one, date buckets are computed relative to today's local date.
    pub fn set_reference_date(&mut self, date: Option<NaiveDate>) {
        self.reference_date = date;
    }

    /// Sets the year ordering mode.
    pub fn set_year_rank(&mut self, year_rank: YearRank) {
        self.year_rank = year_rank;
    }

    /// Returns the kind configured for `field`.
    pub fn field_kind(&self, field: &str) -> FieldKind {
        self.field_kinds
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, kind)| *kind)
            .unwrap_or_default()
    }

    /// Returns the date relative buckets are computed from.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Returns the year ordering mode.
    pub fn year_rank(&self) -> YearRank {
        self.year_rank
    }

    fn date_sort_key(&self, group_key: &str) -> String {
        if let Some((_, rank)) = DATE_RANKS.iter().find(|(label, _)| *label == group_key) {
            return (*rank).to_string();
        }
        match self.year_rank {
            YearRank::ContainsTwo => {
                if group_key.contains('2') {
                    format!("7_{group_key}")
                } else {
                    format!("8_{group_key}")
                }
            }
            YearRank::Numeric => numeric_year_sort_key(group_key),
        }
    }
}

impl GroupKeyFormatter for GroupKeyPolicy {
    fn format_group_key(&self, field: &str, value: &FieldValue) -> String {
        if value.is_none() {
            return UNKNOWN.to_string();
        }

        let kind = self.field_kind(field);
        let formatted = match kind {
            FieldKind::Date => value
                .as_date()
                .map(|date| date_bucket(date, self.reference_date())),
            FieldKind::Size => value
                .as_int()
                .and_then(|bytes| size_bucket(bytes).map(str::to_string)),
            FieldKind::FileType => value.as_str().map(file_type_category),
            FieldKind::Name => value.as_str().map(|name| name_bucket(name).to_string()),
            FieldKind::Plain => None,
        };

        match formatted {
            Some(key) => key,
            None => {
                if kind != FieldKind::Plain {
                    tracing::trace!(
                        target: targets::RECORD,
                        field,
                        kind = %kind,
                        "value does not match field kind, using display text"
                    );
                }
                plain_key(value)
            }
        }
    }

    fn sort_key(&self, field: &str, group_key: &str) -> String {
        match self.field_kind(field) {
            FieldKind::Date => self.date_sort_key(group_key),
            FieldKind::Size => SIZE_RANKS
                .iter()
                .find(|(label, _)| group_key.starts_with(label))
                .map(|(_, rank)| (*rank).to_string())
                .unwrap_or_else(|| group_key.to_string()),
            _ => group_key.to_string(),
        }
    }
}

/// Returns the relative bucket of `date` as seen from `reference`.
///
/// Dates after the reference date fall into `This Week`.
pub fn date_bucket(date: NaiveDate, reference: NaiveDate) -> String {
    let days = (reference - date).num_days();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => "This Week".to_string(),
        d if d < 14 => "Last Week".to_string(),
        d if d < 30 => "This Month".to_string(),
        d if d < 60 => "Last Month".to_string(),
        d if d < 365 => date.format("%B %Y").to_string(),
        _ => date.format("%Y").to_string(),
    }
}

/// Returns the size bucket label for a byte count.
///
/// Negative counts have no bucket; [`GroupKeyPolicy`] groups them under
/// their plain display text (`-5`) instead of a size label.
pub fn size_bucket(bytes: i64) -> Option<&'static str> {
    if bytes < 0 {
        return None;
    }
    if bytes == 0 {
        return Some(SIZE_EMPTY);
    }
    let label = SIZE_BUCKETS
        .iter()
        .find(|(limit, _)| bytes < *limit)
        .map(|(_, label)| *label)
        .unwrap_or(SIZE_GIGANTIC);
    Some(label)
}

/// Returns the category of a file extension.
///
/// The extension may carry a leading dot and any case.
pub fn file_type_category(extension: &str) -> String {
    let ext = extension.trim().trim_start_matches('.').to_uppercase();
    if ext.is_empty() {
        return NO_EXTENSION.to_string();
    }
    FILE_CATEGORIES
        .iter()
        .find(|(_, exts)| exts.contains(&ext.as_str()))
        .map(|(category, _)| (*category).to_string())
        .unwrap_or_else(|| format!(".{ext} Files"))
}

/// Returns the alphabetic run a name falls into.
pub fn name_bucket(name: &str) -> &'static str {
    let Some(first) = name.chars().next() else {
        return OTHER_NAMES;
    };
    let first = first.to_ascii_uppercase();
    NAME_BUCKETS
        .iter()
        .find(|(lo, hi, _)| (*lo..=*hi).contains(&first))
        .map(|(_, _, label)| *label)
        .unwrap_or(OTHER_NAMES)
}

fn plain_key(value: &FieldValue) -> String {
    let text = value.display_text();
    if text.trim().is_empty() {
        UNKNOWN.to_string()
    } else {
        text
    }
}

/// Sort key for month-year and year buckets, newest first.
///
/// Inverted year and month numbers keep ascending string order newest first.
fn numeric_year_sort_key(group_key: &str) -> String {
    if let Ok(year) = group_key.trim().parse::<i32>() {
        return format!("8_{:05}_{group_key}", 99_999 - year.clamp(0, 99_999));
    }
    let month_year = NaiveDate::parse_from_str(&format!("1 {group_key}"), "%d %B %Y");
    match month_year {
        Ok(date) => format!(
            "7_{:05}_{:02}_{group_key}",
            99_999 - date.year().clamp(0, 99_999),
            12 - date.month()
        ),
        Err(_) => format!("9_{group_key}"),
    }
}
