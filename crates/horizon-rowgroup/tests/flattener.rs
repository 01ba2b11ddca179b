//! Integration tests for the grouped row flattener.

use std::sync::Arc;

use chrono::NaiveDate;
use horizon_rowgroup::{
    BLANK, FieldAccessor, FieldKind, FieldMap, FieldValue, FlatRow, GroupKeyFormatter,
    GroupKeyPolicy, GroupedRowFlattener, SortDirection, SortSpec,
};
use parking_lot::Mutex;

struct Employee {
    name: String,
    department: Mutex<String>,
    hired: String,
}

impl Employee {
    fn new(name: &str, department: &str) -> Self {
        Self {
            name: name.to_string(),
            department: Mutex::new(department.to_string()),
            hired: String::new(),
        }
    }

    fn hired(mut self, date: &str) -> Self {
        self.hired = date.to_string();
        self
    }
}

impl FieldAccessor for Employee {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "Name" => self.name.as_str().into(),
            "Department" => self.department.lock().as_str().into(),
            "Hired" => FieldValue::parse_date(&self.hired),
            _ => FieldValue::None,
        }
    }
}

fn staff() -> Vec<Employee> {
    vec![
        Employee::new("Sam", "Sales"),
        Employee::new("Sue", "Sales"),
        Employee::new("Eve", "Eng"),
        Employee::new("Ada", "Eng"),
        Employee::new("Bob", "Eng"),
    ]
}

fn by_department(records: Vec<Employee>) -> GroupedRowFlattener<Employee> {
    GroupedRowFlattener::with_source(records)
        .with_group_field("Department")
        .with_sort(SortSpec::ascending("Name"))
}

fn labels<R: FieldAccessor>(rows: &[FlatRow<R>]) -> Vec<String> {
    rows.iter()
        .map(|row| match row.group_key() {
            Some(key) if row.is_expanded() => format!("[{key}]"),
            Some(key) => format!("[{key}]+"),
            None => row.record().unwrap().field("Name").display_text(),
        })
        .collect()
}

fn assert_contiguous<R>(rows: &[FlatRow<R>]) {
    for (i, row) in rows.iter().enumerate() {
        if !row.is_group_header() {
            continue;
        }
        let depth = row.depth();
        for child in rows[i + 1..].iter().take_while(|r| r.depth() > depth) {
            assert_eq!(child.depth(), depth + 1);
            assert!(!child.is_group_header());
        }
    }
}

#[test]
fn test_rebuild_is_idempotent() {
    let mut flattener = by_department(staff());
    flattener.toggle_group("Sales");
    let before: Vec<_> = flattener.rows().to_vec();
    flattener.rebuild();
    assert_eq!(flattener.rows(), before.as_slice());
    flattener.rebuild();
    assert_eq!(flattener.rows(), before.as_slice());
}

#[test]
fn test_contiguity_holds_through_toggles() {
    let mut flattener = by_department(staff());
    assert_contiguous(flattener.rows());
    flattener.toggle_group("Eng");
    assert_contiguous(flattener.rows());
    flattener.expand_all();
    assert_contiguous(flattener.rows());
    flattener.toggle_group("Sales");
    assert_contiguous(flattener.rows());
}

#[test]
fn test_expansion_persists_when_source_grows() {
    let mut flattener = by_department(staff());
    flattener.toggle_group("Sales");

    flattener.batch().push(Arc::new(Employee::new("Cat", "Eng")));

    assert_eq!(flattener.is_group_expanded("Eng"), Some(true));
    assert_eq!(flattener.is_group_expanded("Sales"), Some(false));
    assert_eq!(labels(flattener.rows()), vec!["[Eng]", "Ada", "Bob", "Cat", "Eve", "[Sales]+"]);
}

#[test]
fn test_filter_correctness() {
    let mut records = staff();
    records.push(Employee::new("Nia", ""));
    let mut flattener = by_department(records);
    flattener.on_filter_changed("Department", ["Sales", BLANK]);

    let shown: Vec<_> = flattener
        .rows()
        .iter()
        .filter_map(|row| row.record().cloned())
        .collect();
    for record in flattener.source() {
        let dept = record.field("Department").display_text();
        let expected = dept == "Sales" || dept.is_empty();
        let present = shown.iter().any(|r| Arc::ptr_eq(r, record));
        assert_eq!(present, expected, "record {}", record.name);
    }
    assert_eq!(labels(flattener.rows()), vec!["[(Unknown)]", "Nia", "[Sales]", "Sam", "Sue"]);
}

#[test]
fn test_expand_all_then_collapse_all() {
    let mut flattener = by_department(staff());
    flattener.toggle_group("Eng");
    let headers_before: Vec<_> = flattener
        .rows()
        .iter()
        .filter_map(|r| r.group_key().map(str::to_string))
        .collect();

    flattener.expand_all();
    assert_eq!(flattener.len(), 7);
    flattener.collapse_all();

    let rows = flattener.rows();
    assert!(rows.iter().all(|r| r.is_group_header() && !r.is_expanded()));
    let headers_after: Vec<_> = rows
        .iter()
        .filter_map(|r| r.group_key().map(str::to_string))
        .collect();
    assert_eq!(headers_after, headers_before);
}

#[test]
fn test_department_scenario() {
    let mut flattener = by_department(staff());
    assert_eq!(
        labels(flattener.rows()),
        vec!["[Eng]", "Ada", "Bob", "Eve", "[Sales]", "Sam", "Sue"]
    );

    let sales_rows: Vec<_> = flattener.rows()[4..].to_vec();
    let removed = Arc::new(Mutex::new(Vec::new()));
    let removed_clone = removed.clone();
    flattener
        .signals()
        .rows_removed
        .connect(move |&range| removed_clone.lock().push(range));

    flattener.toggle_group("Eng");

    assert_eq!(*removed.lock(), vec![(1, 3)]);
    assert_eq!(flattener.len(), 4);
    assert_eq!(&flattener.rows()[1..], sales_rows.as_slice());
}

#[test]
fn test_size_scenario() {
    let policy = GroupKeyPolicy::new();
    let key = |bytes: i64| policy.format_group_key("Size", &FieldValue::from(bytes));
    assert_eq!(key(0), "Empty");
    assert_eq!(key(500), "Tiny (< 1 KB)");
    assert_eq!(key(2_000_000), "Medium (< 1 MB)");
}

#[test]
fn test_stale_toggle_inserts_nothing() {
    let mut flattener = by_department(staff());
    flattener.toggle_group("Sales");

    // Move every Sales record out of the group without telling the flattener.
    for record in flattener.source() {
        let mut dept = record.department.lock();
        if *dept == "Sales" {
            *dept = "Ops".to_string();
        }
    }

    let inserted = Arc::new(Mutex::new(0));
    let inserted_clone = inserted.clone();
    flattener
        .signals()
        .rows_inserted
        .connect(move |_| *inserted_clone.lock() += 1);

    assert!(flattener.toggle_group("Sales"));
    assert_eq!(*inserted.lock(), 0);
    assert_eq!(labels(flattener.rows()), vec!["[Eng]", "Ada", "Bob", "Eve", "[Sales]"]);
    assert_eq!(flattener.row(4).unwrap().item_count(), 0);

    flattener.on_source_changed();
    assert_eq!(flattener.header_position("Sales"), None);
    assert!(flattener.header_position("Ops").is_some());
}

#[test]
fn test_collapse_all_removes_last_group_first() {
    let mut flattener = by_department(staff());
    let ranges = Arc::new(Mutex::new(Vec::new()));
    let ranges_clone = ranges.clone();
    flattener
        .signals()
        .rows_about_to_be_removed
        .connect(move |&range| ranges_clone.lock().push(range));

    flattener.collapse_all();
    assert_eq!(*ranges.lock(), vec![(5, 6), (1, 3)]);
}

#[test]
fn test_expand_all_inserts_first_group_first() {
    let mut flattener = by_department(staff());
    flattener.collapse_all();

    let ranges = Arc::new(Mutex::new(Vec::new()));
    let ranges_clone = ranges.clone();
    flattener
        .signals()
        .rows_inserted
        .connect(move |(first, last, _)| ranges_clone.lock().push((*first, *last)));

    flattener.expand_all();
    assert_eq!(*ranges.lock(), vec![(1, 3), (5, 6)]);
}

#[test]
fn test_malformed_dates_group_as_unknown() {
    let records = vec![
        Employee::new("Ada", "Eng").hired("2024-06-15"),
        Employee::new("Bob", "Eng").hired("15/06/2024"),
        Employee::new("Cy", "Eng"),
    ];
    let policy = GroupKeyPolicy::new()
        .with_field_kind("Hired", FieldKind::Date)
        .with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
    let flattener = GroupedRowFlattener::with_source(records)
        .with_formatter(policy)
        .with_group_field("Hired")
        .with_sort(SortSpec::ascending("Name"));

    assert_eq!(labels(flattener.rows()), vec!["[Today]", "Ada", "[(Unknown)]", "Bob", "Cy"]);
}

#[test]
fn test_unknown_group_field_is_single_unknown_group() {
    let flattener = GroupedRowFlattener::with_source(staff()).with_group_field("Salary");
    assert_eq!(flattener.len(), 6);
    assert_eq!(flattener.row(0).unwrap().group_key(), Some("(Unknown)"));
    assert_eq!(flattener.row(0).unwrap().item_count(), 5);
}

#[test]
fn test_shared_across_threads_behind_mutex() {
    let flattener = Arc::new(Mutex::new(by_department(staff())));

    let worker = {
        let flattener = flattener.clone();
        std::thread::spawn(move || {
            flattener.lock().toggle_group("Eng");
        })
    };
    worker.join().unwrap();

    assert_eq!(flattener.lock().is_group_expanded("Eng"), Some(false));
}

#[test]
fn test_background_loader_batches_into_one_rebuild() {
    let mut flattener = by_department(Vec::new());
    let resets = Arc::new(Mutex::new(0));
    let resets_clone = resets.clone();
    flattener
        .signals()
        .model_reset
        .connect(move |_| *resets_clone.lock() += 1);

    let queue = flattener.update_queue();
    let loader = std::thread::spawn(move || {
        for employee in staff() {
            queue.push(employee);
        }
    });
    loader.join().unwrap();

    assert!(flattener.is_empty());
    assert_eq!(flattener.apply_pending_updates(), 5);
    assert_eq!(*resets.lock(), 1);
    assert_eq!(flattener.len(), 7);
}

#[test]
fn test_mixed_type_sort_field_rebuilds() {
    let records: Vec<FieldMap> = (0..2_000i64)
        .map(|n| {
            let code = (n * 7_919) % 2_003;
            let value = if n % 2 == 0 {
                FieldValue::from(code)
            } else {
                FieldValue::from(code.to_string())
            };
            FieldMap::new()
                .with("Code", value)
                .with("Team", if n % 3 == 0 { "Red" } else { "Blue" })
        })
        .collect();

    let mut flattener = GroupedRowFlattener::with_source(records).with_sort(SortSpec::ascending("Code"));
    assert_eq!(flattener.len(), 2_000);

    flattener.on_group_field_changed(Some("Team"));
    assert_eq!(flattener.len(), 2_002);
    assert_contiguous(flattener.rows());

    assert_eq!(flattener.on_sort_requested("Code"), Some(SortDirection::Descending));
    assert_eq!(flattener.len(), 2_002);
}
