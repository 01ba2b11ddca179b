//! File browser example.
//!
//! Groups a small file listing by type, size, date and name, and prints the
//! flattened rows after each change.
//!
//! Run with: cargo run -p horizon-rowgroup --example file_browser
//!
//! Set `RUST_LOG=horizon_rowgroup=trace` to see rebuild and toggle logs.

use chrono::{Duration, Local, NaiveDateTime};
use horizon_rowgroup::{FieldAccessor, FieldValue, FlatRow, GroupedRowFlattener, SortSpec};
use tracing_subscriber::EnvFilter;

struct FileEntry {
    name: String,
    size: u64,
    modified: NaiveDateTime,
}

impl FileEntry {
    fn new(name: &str, size: u64, days_ago: i64) -> Self {
        Self {
            name: name.to_string(),
            size,
            modified: Local::now().naive_local() - Duration::days(days_ago),
        }
    }

    fn extension(&self) -> &str {
        match self.name.rfind('.') {
            Some(dot) => &self.name[dot..],
            None => "",
        }
    }
}

impl FieldAccessor for FileEntry {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "Name" => self.name.as_str().into(),
            "FileType" => self.extension().into(),
            "Size" => self.size.into(),
            "DateModified" => self.modified.into(),
            _ => FieldValue::None,
        }
    }
}

fn listing() -> Vec<FileEntry> {
    vec![
        FileEntry::new("Quarterly Report.docx", 48_213, 0),
        FileEntry::new("budget.xlsx", 120_044, 1),
        FileEntry::new("holiday.jpg", 3_407_872, 9),
        FileEntry::new("notes.txt", 812, 3),
        FileEntry::new("setup.exe", 74_448_896, 45),
        FileEntry::new("archive.zip", 1_610_612_736, 200),
        FileEntry::new("empty.log", 0, 20),
        FileEntry::new("Makefile", 2_301, 900),
        FileEntry::new("theme.mp3", 6_291_456, 400),
        FileEntry::new("main.rs", 15_002, 2),
    ]
}

fn print_rows(title: &str, rows: &[FlatRow<FileEntry>]) {
    println!("== {title} ==");
    for row in rows {
        match row.group_key() {
            Some(key) => {
                let marker = if row.is_expanded() { "v" } else { ">" };
                println!("{marker} {key} ({} items)", row.item_count());
            }
            None => {
                if let Some(file) = row.record() {
                    let indent = "    ".repeat(row.depth());
                    println!("{indent}{:<24} {:>12}", file.name, file.size);
                }
            }
        }
    }
    println!();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("horizon_rowgroup=info")),
        )
        .init();

    let mut flattener = GroupedRowFlattener::with_source(listing())
        .with_sort(SortSpec::ascending("Name"))
        .with_group_field("FileType");

    flattener.signals().rows_inserted.connect(|(first, last, _)| {
        tracing::info!(first, last, "rows inserted");
    });
    flattener.signals().rows_removed.connect(|&(first, last)| {
        tracing::info!(first, last, "rows removed");
    });

    print_rows("Grouped by file type", flattener.rows());

    flattener.toggle_group("Documents");
    print_rows("Documents collapsed", flattener.rows());

    flattener.on_group_field_changed(Some("Size"));
    print_rows("Grouped by size", flattener.rows());

    flattener.on_group_field_changed(Some("DateModified"));
    flattener.collapse_all();
    flattener.toggle_group("Today");
    print_rows("Grouped by date, only today expanded", flattener.rows());

    flattener.expand_all();
    flattener.on_group_field_changed(Some("Name"));
    flattener.on_sort_requested("Size");
    print_rows("Grouped by name, sorted by size", flattener.rows());

    println!("== Size filter menu ==");
    for item in flattener.filter_items("Size", None) {
        let check = if item.is_selected { "[x]" } else { "[ ]" };
        println!("{check} {}", item.value);
    }

    flattener.on_filter_changed("Name", ["notes.txt", "main.rs"]);
    flattener.on_group_field_changed(None);
    print_rows("Ungrouped, filtered by name", flattener.rows());
}
