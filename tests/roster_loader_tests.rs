//! Roster loading: summary-block filtering, numeric coercion and fatal structural errors.

use std::fs;

use headcount::data::roster::{
    load_roster, load_roster_with_report, parse_roster, parse_roster_with_report, LoadError,
    DEFAULT_ROSTER_PATH,
};

const HEADER: &str = "employee_id,name,role,department,location,comp_usd\n";

fn ids(roster: &headcount::data::Roster) -> Vec<&str> {
    roster.iter().map(|r| r.employee_id.as_str()).collect()
}

#[test]
fn load_keeps_only_employees_with_numeric_comp() {
    let csv = format!(
        "{HEADER}E1,Ada,Engineer,R&D,NYC,50000\nSUMMARY,,,,,avg=50000\nE2,Bo,Analyst,Finance,SF,not_a_number\n"
    );
    let roster = parse_roster(csv.as_bytes()).expect("roster should parse");

    assert_eq!(ids(&roster), vec!["E1"]);
    let ada = &roster.records()[0];
    assert_eq!(ada.name, "Ada");
    assert_eq!(ada.role, "Engineer");
    assert_eq!(ada.department, "R&D");
    assert_eq!(ada.location, "NYC");
    assert_eq!(ada.comp_usd, 50_000);
}

#[test]
fn trailing_summary_block_is_ignored_and_counted() {
    let csv = format!(
        "{HEADER}E1,Ada,Engineer,R&D,NYC,100\nE2,Bo,Analyst,Finance,SF,200\nSummary Statistics,,,,,\nMetric,,,,,Value\nTotal compensation,,,,,300\nAverage compensation,,,,,150\n"
    );
    let (roster, report) = parse_roster_with_report(csv.as_bytes()).expect("roster should parse");

    assert_eq!(ids(&roster), vec!["E1", "E2"]);
    assert_eq!(report.employees_kept, 2);
    assert_eq!(report.skipped_non_employee, 4);
    assert_eq!(report.skipped_invalid_comp, 0);
    assert_eq!(report.rows_read, 6);
}

#[test]
fn ragged_summary_rows_do_not_fail_the_load() {
    let csv = format!("{HEADER}E1,Ada,Engineer,R&D,NYC,100\nSummary Statistics\nNotes,a,b,c,d,e,f,g\n");
    let roster = parse_roster(csv.as_bytes()).expect("ragged rows should be tolerated");
    assert_eq!(ids(&roster), vec!["E1"]);
}

#[test]
fn employee_id_prefix_is_case_sensitive() {
    let csv = format!("{HEADER}e1,lower,,,,100\nE2,upper,,,,200\n,blank,,,,300\n");
    let roster = parse_roster(csv.as_bytes()).expect("roster should parse");
    assert_eq!(ids(&roster), vec!["E2"]);
}

#[test]
fn fractional_comp_is_truncated_and_blank_comp_dropped() {
    let csv = format!("{HEADER}E1,Ada,,,,99999.99\nE2,Bo,,,, 120000 \nE3,Cy,,,,\nE4,Di,,,,$90,000\n");
    let (roster, report) = parse_roster_with_report(csv.as_bytes()).expect("roster should parse");

    let comps: Vec<i64> = roster.iter().map(|r| r.comp_usd).collect();
    assert_eq!(ids(&roster), vec!["E1", "E2"]);
    assert_eq!(comps, vec![99_999, 120_000]);
    assert_eq!(report.skipped_invalid_comp, 2);
}

#[test]
fn source_order_is_preserved() {
    let csv = format!("{HEADER}E3,C,,,,300\nE1,A,,,,100\nE2,B,,,,200\n");
    let roster = parse_roster(csv.as_bytes()).expect("roster should parse");
    assert_eq!(ids(&roster), vec!["E3", "E1", "E2"]);
}

#[test]
fn missing_comp_column_is_fatal() {
    let csv = "employee_id,name,role,department,location,salary\nE1,Ada,,,,100\n";
    let err = parse_roster(csv.as_bytes()).expect_err("missing comp_usd should fail");
    assert!(matches!(err, LoadError::MissingColumn("comp_usd")));
    assert!(err.to_string().contains("missing required column"));
}

#[test]
fn missing_employee_id_column_is_fatal() {
    let csv = "id,name,comp_usd\nE1,Ada,100\n";
    let err = parse_roster(csv.as_bytes()).expect_err("missing employee_id should fail");
    assert!(matches!(err, LoadError::MissingColumn("employee_id")));
}

#[test]
fn empty_source_is_missing_columns() {
    let err = parse_roster("".as_bytes()).expect_err("empty input has no header");
    assert!(matches!(err, LoadError::MissingColumn(_)));
}

#[test]
fn header_only_source_is_an_empty_roster() {
    let roster = parse_roster(HEADER.as_bytes()).expect("header-only should parse");
    assert!(roster.is_empty());
}

#[test]
fn byte_order_mark_and_column_order_are_tolerated() {
    let csv = "\u{feff}employee_id,comp_usd,name\nE1,100,Ada\n";
    let roster = parse_roster(csv.as_bytes()).expect("BOM header should parse");
    assert_eq!(roster.records()[0].name, "Ada");
    assert_eq!(roster.records()[0].comp_usd, 100);
    assert_eq!(roster.records()[0].role, "");
}

#[test]
fn unreadable_path_is_a_read_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_roster(dir.path().join("absent.csv")).expect_err("missing file");
    assert!(matches!(err, LoadError::Read { .. }));
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn load_reads_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("roster.csv");
    fs::write(&path, format!("{HEADER}E1,Ada,,,,100\nE2,Bo,,,,200\n")).expect("write fixture");

    let (roster, report) = load_roster_with_report(&path).expect("load");
    assert_eq!(roster.len(), 2);
    assert_eq!(report.employees_kept, 2);
}

#[test]
fn bundled_sample_roster_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_ROSTER_PATH);
    let (roster, report) = load_roster_with_report(&path).expect("sample roster should load");
    assert_eq!(roster.len(), 15);
    assert!(report.skipped_non_employee > 0, "sample has a summary block");
    assert!(roster.iter().all(|r| r.employee_id.starts_with('E')));
}
