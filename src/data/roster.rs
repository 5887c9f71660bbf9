//! Roster loader: reads the employee CSV, keeps rows whose `employee_id` starts with `E`
//! and whose `comp_usd` is a number. The source file appends a "Summary Statistics" block
//! under the same columns; those rows carry no employee id and are dropped here.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_ROSTER_PATH: &str = "data_room/people/employee_roster.csv";

/// Columns shown for (and exported from) a selection, in display order.
pub const DISPLAY_COLUMNS: [&str; 6] = [
    "employee_id",
    "name",
    "role",
    "department",
    "location",
    "comp_usd",
];

const EMPLOYEE_ID_COLUMN: &str = "employee_id";
const COMP_COLUMN: &str = "comp_usd";
const EMPLOYEE_ID_PREFIX: char = 'E';
const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: String,
    pub name: String,
    pub role: String,
    pub department: String,
    pub location: String,
    /// Whole dollars; fractional source values are truncated toward zero.
    pub comp_usd: i64,
}

impl EmployeeRecord {
    pub fn new(employee_id: impl Into<String>, name: impl Into<String>, comp_usd: i64) -> Self {
        EmployeeRecord {
            employee_id: employee_id.into(),
            name: name.into(),
            role: String::new(),
            department: String::new(),
            location: String::new(),
            comp_usd,
        }
    }

    /// Field values in [DISPLAY_COLUMNS] order.
    pub fn display_fields(&self) -> [String; 6] {
        [
            self.employee_id.clone(),
            self.name.clone(),
            self.role.clone(),
            self.department.clone(),
            self.location.clone(),
            self.comp_usd.to_string(),
        ]
    }
}

/// Validated, read-only employee list. Order is source order; scenarios re-sort it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    records: Vec<EmployeeRecord>,
}

impl Roster {
    /// Build a roster from already-typed records. Records whose id does not start with `E`
    /// are dropped so the roster invariant holds for hand-built rosters too.
    pub fn from_records(records: Vec<EmployeeRecord>) -> Self {
        let records = records
            .into_iter()
            .filter(|r| r.employee_id.starts_with(EMPLOYEE_ID_PREFIX))
            .collect();
        Roster { records }
    }

    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EmployeeRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a EmployeeRecord;
    type IntoIter = std::slice::Iter<'a, EmployeeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Row accounting for one load. Skipped rows are never errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub employees_kept: usize,
    pub skipped_non_employee: usize,
    pub skipped_invalid_comp: usize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read roster {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse roster CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Header positions. Only `employee_id` and `comp_usd` are required.
struct ColumnIndex {
    employee_id: usize,
    comp_usd: usize,
    name: Option<usize>,
    role: Option<usize>,
    department: Option<usize>,
    location: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches(UTF8_BOM) == name)
        };
        let comp_usd = find(COMP_COLUMN).ok_or(LoadError::MissingColumn(COMP_COLUMN))?;
        let employee_id =
            find(EMPLOYEE_ID_COLUMN).ok_or(LoadError::MissingColumn(EMPLOYEE_ID_COLUMN))?;
        Ok(ColumnIndex {
            employee_id,
            comp_usd,
            name: find("name"),
            role: find("role"),
            department: find("department"),
            location: find("location"),
        })
    }
}

fn text_cell(row: &csv::StringRecord, col: Option<usize>) -> String {
    col.and_then(|i| row.get(i)).unwrap_or("").to_string()
}

/// Numeric coercion for `comp_usd`. Non-numeric, non-finite and out-of-range values yield
/// None; finite values are truncated toward zero.
fn coerce_comp(raw: &str) -> Option<i64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let whole = value.trunc();
    // i64::MAX as f64 rounds up to 2^63, hence the exclusive upper bound.
    if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
        return None;
    }
    Some(whole as i64)
}

/// Parse a roster from any CSV source and report how many rows were skipped.
pub fn parse_roster_with_report<R: Read>(source: R) -> Result<(Roster, LoadReport), LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(source);
    let columns = ColumnIndex::from_headers(reader.headers()?)?;

    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        report.rows_read += 1;
        let line = row.position().map_or(0, |p| p.line());

        let employee_id = row.get(columns.employee_id).unwrap_or("");
        if !employee_id.starts_with(EMPLOYEE_ID_PREFIX) {
            report.skipped_non_employee += 1;
            debug!(line, employee_id, "skipping non-employee row");
            continue;
        }

        let raw_comp = row.get(columns.comp_usd).unwrap_or("");
        let Some(comp_usd) = coerce_comp(raw_comp) else {
            report.skipped_invalid_comp += 1;
            debug!(line, employee_id, comp_usd = raw_comp, "skipping row with non-numeric comp_usd");
            continue;
        };

        records.push(EmployeeRecord {
            employee_id: employee_id.to_string(),
            name: text_cell(&row, columns.name),
            role: text_cell(&row, columns.role),
            department: text_cell(&row, columns.department),
            location: text_cell(&row, columns.location),
            comp_usd,
        });
    }

    report.employees_kept = records.len();
    Ok((Roster { records }, report))
}

pub fn parse_roster<R: Read>(source: R) -> Result<Roster, LoadError> {
    parse_roster_with_report(source).map(|(roster, _)| roster)
}

/// Load a roster file. Fails only when the file cannot be read or lacks a required column.
pub fn load_roster_with_report(path: impl AsRef<Path>) -> Result<(Roster, LoadReport), LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_roster_with_report(file)
}

pub fn load_roster(path: impl AsRef<Path>) -> Result<Roster, LoadError> {
    load_roster_with_report(path).map(|(roster, _)| roster)
}
