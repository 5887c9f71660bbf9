//! CSV download of a selection and dollar formatting for summary output.

use std::io::Write;

use thiserror::Error;

use crate::data::roster::{EmployeeRecord, DISPLAY_COLUMNS};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Write the header and one row per record, in selection order. The header is written
/// even when there are no records.
pub fn write_selected_csv<W: Write>(records: &[EmployeeRecord], out: W) -> Result<W, ExportError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(DISPLAY_COLUMNS)?;
    for record in records {
        writer.write_record(record.display_fields())?;
    }
    writer.into_inner().map_err(|err| ExportError::Io(err.into_error()))
}

pub fn selected_csv_string(records: &[EmployeeRecord]) -> Result<String, ExportError> {
    let bytes = write_selected_csv(records, Vec::new())?;
    Ok(String::from_utf8(bytes)?)
}

/// Whole-dollar amount with thousands separators: `$1,234,567`, `-$950`.
pub fn format_usd(amount: i128) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
