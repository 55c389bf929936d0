//! End-to-end validation scenarios: the error tree, its ordering, redaction
//! of cell values, streaming, error limits and parallel scans.

use pretty_assertions::assert_eq;
use tabular_core::{CellRule, ColumnRule, DuplicatePolicy, Field, Layout, LayoutBuilder};
use tabular_validator::{
    DataSet, ErrorTree, FileMetadata, ValidationOptions, Validator, Violation, INCOMPLETE_RULE,
};

fn basic_layout() -> Layout {
    Layout::new([
        ("col1", Field::text(8)),
        ("col2", Field::choice(["x", "y", "z"])),
        ("col3", Field::integer(1)),
    ])
    .unwrap()
}

fn with_header(rows: &[&[&str]]) -> DataSet {
    let mut dataset = DataSet::empty()
        .with_header(["col1", "col2", "col3"])
        .with_metadata(FileMetadata::new("data.csv"));
    for row in rows {
        dataset.add_row(row.iter().copied());
    }
    dataset
}

fn validate(layout: &Layout, dataset: &DataSet) -> ErrorTree {
    Validator::new(layout).validate(dataset)
}

#[test]
fn test_conformant_rows_give_empty_tree() {
    let layout = basic_layout();
    let tree = validate(&layout, &with_header(&[&["abc", "x", "1"], &["def", "y", "0"]]));

    assert!(tree.is_empty());
    assert!(tree.complete);
    assert_eq!(tree.violation_count(), 0);
    assert_eq!(tree.render(), "");
}

#[test]
fn test_choice_violation_is_located() {
    let layout = basic_layout();
    let tree = validate(&layout, &with_header(&[&["ghi", "a", "1"]]));

    assert_eq!(
        tree.violations(),
        vec![Violation::Cell {
            row: 2,
            column: 2,
            name: "col2".to_string(),
            rule: "Choice".to_string(),
            explanation: "must be one of ['x','y','z']".to_string(),
        }]
    );
}

#[test]
fn test_negative_integer_reports_format_rule() {
    let layout = basic_layout();
    let tree = validate(&layout, &with_header(&[&["abc", "x", "-1"]]));

    let violations = tree.violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule(), "IntegerFormat");
    assert!(matches!(violations[0], Violation::Cell { row: 2, column: 3, .. }));
    assert!(!tree.render().contains("-1"));
}

#[test]
fn test_empty_non_nullable_choice_reports_only_not_null() {
    let layout = basic_layout();
    let tree = validate(&layout, &with_header(&[&["abc", "", "1"]]));

    let rules: Vec<_> = tree.violations().iter().map(|v| v.rule().to_string()).collect();
    assert_eq!(rules, vec!["NotNull"]);
}

#[test]
fn test_short_row_is_structural_only() {
    let layout = basic_layout();
    let tree = validate(&layout, &with_header(&[&["abc", "zzz"]]));

    assert_eq!(
        tree.violations(),
        vec![Violation::Structural {
            row: 2,
            rule: "RowLength".to_string(),
            explanation: "row length must be equal to 3, not less".to_string(),
        }]
    );
    assert!(tree.rows[0].cells.is_empty());
}

#[test]
fn test_max_digit_explanation_is_fixed() {
    let layout = Layout::new([("n", Field::integer(1))]).unwrap();
    let first = validate(&layout, &DataSet::from_rows(vec![vec!["10".to_string()]]));
    let second = validate(&layout, &DataSet::from_rows(vec![vec!["9999".to_string()]]));

    assert_eq!(first.violation_count(), 1);
    assert_eq!(first.violations()[0].rule(), "MaxDigit");
    assert_eq!(
        first.violations()[0].explanation(),
        second.violations()[0].explanation()
    );
}

#[test]
fn test_rendered_output_never_contains_cell_values() {
    let layout = LayoutBuilder::new()
        .column("secret", Field::text(4).rule(CellRule::ascii_only()))
        .column("code", Field::regex("[A-Z]{3}"))
        .column("amount", Field::currency(4))
        .build()
        .unwrap();
    let values = ["päßwörd-hunter2", "abc123", "12345.678"];
    let dataset = DataSet::from_rows(vec![values.iter().map(|v| v.to_string()).collect()]);
    let tree = validate(&layout, &dataset);

    let rendered = tree.render();
    let json = serde_json::to_string(&tree).unwrap();
    assert!(tree.violation_count() >= 4);
    for value in values {
        assert!(!rendered.contains(value), "render leaked {value}");
        assert!(!json.contains(value), "json leaked {value}");
    }
}

#[test]
fn test_validation_is_idempotent() {
    let layout = basic_layout();
    let dataset = with_header(&[&["ghi", "a", "10"], &["toolongvalue", "x"], &["", "", ""]]);
    let validator = Validator::new(&layout);

    let first = validator.validate(&dataset);
    let second = validator.validate(&dataset);
    assert_eq!(first, second);
    assert_eq!(first.render(), second.render());
}

#[test]
fn test_violation_ordering() {
    let layout = LayoutBuilder::new()
        .column("a", Field::text(2).rule(CellRule::ascii_only()))
        .column("b", Field::integer(1).unique())
        .build()
        .unwrap();
    let dataset = DataSet::from_rows(vec![
        vec!["ok".into(), "1".into()],
        vec!["äöü".into(), "1".into()],
        vec!["x".into()],
    ]);
    let tree = validate(&layout, &dataset);

    let expected = [
        " - File: <unnamed>",
        "   - Row: 1",
        "     - Cell: 1,2 (b)",
        "       - Unique: values must be unique",
        "   - Row: 2",
        "     - Cell: 2,1 (a)",
        "       - MaxChar: must be no more than 2 characters",
        "       - AsciiChar: must have only ASCII characters",
        "     - Cell: 2,2 (b)",
        "       - Unique: values must be unique",
        "   - Row: 3",
        "     - RowLength: row length must be equal to 2, not less",
    ]
    .join("\n");
    assert_eq!(tree.render(), expected);
}

#[test]
fn test_column_rules_follow_cell_rules_in_a_cell() {
    let layout = Layout::new([("id", Field::integer(1).unique())]).unwrap();
    let dataset = DataSet::from_rows(vec![vec!["12".into()], vec!["12".into()]]);
    let tree = validate(&layout, &dataset);

    let rules: Vec<_> = tree.rows[0].cells[0]
        .violations
        .iter()
        .map(|v| v.rule.as_str())
        .collect();
    assert_eq!(rules, vec!["MaxDigit", "Unique"]);
}

#[test]
fn test_duplicate_policies() {
    let rows: Vec<Vec<String>> = ["a", "b", "a", "", "", "a"]
        .iter()
        .map(|v| vec![v.to_string()])
        .collect();

    let every = Layout::new([("k", Field::text(1).nullable(true).unique())]).unwrap();
    let tree = validate(&every, &DataSet::from_rows(rows.clone()));
    let flagged: Vec<_> = tree.rows.iter().map(|r| r.row).collect();
    assert_eq!(flagged, vec![1, 3, 6]);

    let repeats = Layout::new([(
        "k",
        Field::text(1)
            .nullable(true)
            .unique_with(DuplicatePolicy::RepeatsOnly),
    )])
    .unwrap();
    let tree = validate(&repeats, &DataSet::from_rows(rows));
    let flagged: Vec<_> = tree.rows.iter().map(|r| r.row).collect();
    assert_eq!(flagged, vec![3, 6]);
}

#[test]
fn test_whole_column_rule_goes_to_column_bucket() {
    let layout = Layout::new([
        ("id", Field::integer(3)),
        (
            "flag",
            Field::choice(["Y", "N"]).rule(ColumnRule::custom("must contain at least one 'Y'", |v| {
                v.iter().any(|s| s == "Y")
            })),
        ),
    ])
    .unwrap();
    let dataset = DataSet::from_rows(vec![
        vec!["1".into(), "N".into()],
        vec!["2".into(), "N".into()],
    ]);
    let tree = validate(&layout, &dataset);

    assert!(tree.rows.is_empty());
    assert_eq!(
        tree.violations(),
        vec![Violation::Column {
            column: 2,
            name: "flag".to_string(),
            rule: "Custom".to_string(),
            explanation: "must contain at least one 'Y'".to_string(),
        }]
    );
}

#[test]
fn test_greater_than_column_reads_the_same_row() {
    let layout = Layout::new([
        ("start", Field::integer(4)),
        ("end", Field::integer(4).rule(CellRule::greater_than_column("start"))),
    ])
    .unwrap();
    let dataset = DataSet::from_rows(vec![
        vec!["10".into(), "20".into()],
        vec!["30".into(), "20".into()],
    ]);
    let tree = validate(&layout, &dataset);

    let violations = tree.violations();
    assert_eq!(violations.len(), 1);
    assert!(matches!(violations[0], Violation::Cell { row: 2, column: 2, .. }));
    assert_eq!(violations[0].rule(), "GreaterThanColumn");
}

#[test]
fn test_bad_header_is_recorded_and_scan_continues() {
    let layout = basic_layout();
    let mut dataset = DataSet::empty().with_header(["col2", "col1", "col3"]);
    dataset.add_row(["abc", "q", "1"]);
    let tree = validate(&layout, &dataset);

    let header = tree.header.as_ref().unwrap();
    assert_eq!(header.row, 1);
    assert_eq!(header.violations[0].rule, "ColumnOrder");
    assert_eq!(tree.rows.len(), 1);
    assert_eq!(tree.rows[0].row, 2);
}

#[test]
fn test_skip_header_keeps_row_numbers() {
    let layout = basic_layout();
    let mut dataset = DataSet::empty().with_header(["whatever"]);
    dataset.add_row(["abc", "q", "1"]);
    let tree = Validator::new(&layout)
        .with_options(ValidationOptions::new().skip_header(true))
        .validate(&dataset);

    assert!(tree.header.is_none());
    assert_eq!(tree.rows[0].row, 2);
}

#[test]
fn test_empty_rows() {
    let layout = basic_layout();
    let dataset = with_header(&[&["abc", "x", "1"], &["", "", ""], &["abc", "x", "1"]]);

    let strict = validate(&layout, &dataset);
    assert_eq!(strict.rows.len(), 1);
    assert_eq!(strict.rows[0].row, 3);

    let lenient = Validator::new(&layout)
        .with_options(ValidationOptions::new().empty_row_ok(true))
        .validate(&dataset);
    assert!(lenient.is_empty());
}

#[test]
fn test_file_rules() {
    let layout = LayoutBuilder::new()
        .column("id", Field::integer(3))
        .file_name_pattern(r"ids_\d{4}\.csv")
        .min_rows(2)
        .max_rows(3)
        .build()
        .unwrap();
    let dataset = DataSet::from_rows(vec![vec!["1".into()]])
        .with_metadata(FileMetadata::new("ids_2020.csv.bak"));
    let tree = validate(&layout, &dataset);

    let rules: Vec<_> = tree.file_errors.iter().map(|v| v.rule.as_str()).collect();
    assert_eq!(rules, vec!["FileNamePattern", "MinRows"]);
    assert!(tree.render().starts_with(" - File: ids_2020.csv.bak\n   - FileNamePattern:"));
}

#[test]
fn test_max_errors_halts_and_flags() {
    let layout = Layout::new([("n", Field::integer(1).unique())]).unwrap();
    let rows: Vec<Vec<String>> = ["a", "b", "1", "c", "1"]
        .iter()
        .map(|v| vec![v.to_string()])
        .collect();
    let tree = Validator::new(&layout)
        .with_options(ValidationOptions::new().max_errors(2))
        .validate(&DataSet::from_rows(rows));

    assert!(!tree.complete);
    assert!(!tree.is_empty());
    let flagged: Vec<_> = tree.rows.iter().map(|r| r.row).collect();
    assert_eq!(flagged, vec![1, 2]);
    assert_eq!(tree.file_errors.last().unwrap().rule, INCOMPLETE_RULE);
    assert!(tree.columns.is_empty());
}

#[test]
fn test_zero_max_errors_means_no_limit() {
    let layout = Layout::new([("n", Field::integer(1))]).unwrap();
    let rows: Vec<Vec<String>> = ["a", "b", "c"]
        .iter()
        .map(|v| vec![v.to_string()])
        .collect();
    let tree = Validator::new(&layout)
        .with_options(ValidationOptions::new().max_errors(0))
        .validate(&DataSet::from_rows(rows));

    assert!(tree.complete);
    let flagged: Vec<_> = tree.rows.iter().map(|r| r.row).collect();
    assert_eq!(flagged, vec![1, 2, 3]);
}

#[test]
fn test_whitespace_row_is_not_blank() {
    let layout = basic_layout();
    let dataset = with_header(&[&["abc", "x", "1"], &[" ", "", ""]]);
    let tree = Validator::new(&layout)
        .with_options(ValidationOptions::new().empty_row_ok(true))
        .validate(&dataset);

    assert_eq!(tree.rows.len(), 1);
    assert_eq!(tree.rows[0].row, 3);
}

#[test]
fn test_abandoned_run_is_flagged() {
    let layout = LayoutBuilder::new()
        .column("n", Field::integer(1))
        .min_rows(10)
        .build()
        .unwrap();
    let mut run = Validator::new(&layout).start();
    assert!(run.push_row(&["1"]).is_continue());
    run.abandon();
    let tree = run.finish(&FileMetadata::unnamed());

    assert!(!tree.complete);
    let rules: Vec<_> = tree.file_errors.iter().map(|v| v.rule.as_str()).collect();
    assert_eq!(rules, vec![INCOMPLETE_RULE]);
}

#[test]
fn test_validate_rows_streams_any_iterator() {
    let layout = basic_layout();
    let rows = (0..5).map(|i| vec![format!("r{i}"), "x".to_string(), (i % 10).to_string()]);
    let header: Vec<String> = ["col1", "col2", "col3"].map(String::from).to_vec();
    let tree = Validator::new(&layout).validate_rows(
        &FileMetadata::new("stream.csv"),
        Some(header.as_slice()),
        rows,
    );
    assert!(tree.is_empty());
}

#[test]
fn test_parallel_matches_sequential() {
    let layout = LayoutBuilder::new()
        .column("id", Field::integer(4).unique())
        .column("status", Field::choice(["open", "closed"]).case_insensitive())
        .column("note", Field::text(5).nullable(true))
        .max_rows(50)
        .build()
        .unwrap();

    let mut dataset = DataSet::empty()
        .with_header(["id", "status", "note"])
        .with_metadata(FileMetadata::new("orders.csv"));
    for i in 0..97 {
        let id = (i % 40).to_string();
        let status = if i % 7 == 0 { "pending" } else { "OPEN" };
        if i % 11 == 0 {
            dataset.add_row([id.as_str(), status]);
        } else {
            dataset.add_row([id.as_str(), status, "notes!"]);
        }
    }

    let validator = Validator::new(&layout);
    let sequential = validator.validate(&dataset);
    for workers in [1, 2, 3, 8, 200] {
        assert_eq!(validator.validate_parallel(&dataset, workers), sequential);
    }

    let limited = validator.with_options(ValidationOptions::new().max_errors(5));
    assert_eq!(
        limited.validate_parallel(&dataset, 4),
        limited.validate(&dataset)
    );
}

#[test]
fn test_json_report_shape() {
    let layout = basic_layout();
    let tree = validate(&layout, &with_header(&[&["ghi", "a", "1"]]));
    let json = serde_json::to_value(&tree).unwrap();

    assert_eq!(json["file"], "data.csv");
    assert_eq!(json["complete"], true);
    assert_eq!(json["rows"][0]["row"], 2);
    assert_eq!(json["rows"][0]["cells"][0]["column"], 2);
    assert_eq!(json["rows"][0]["cells"][0]["violations"][0]["rule"], "Choice");
}
