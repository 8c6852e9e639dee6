//! Participants list import. Spreadsheet or CSV in, three-column table out.

use calamine::{open_workbook_auto, DataType, Reader};
use std::path::Path;

use crate::error::{ReportError, Result};
use crate::types::{AttendanceRow, AttendanceTable};

/// Columns every participants list must carry (matched case-insensitively).
pub const REQUIRED_COLUMNS: [&str; 2] = ["name", "application_id"];

/// Read a participants list and normalize it. Any failure rejects the whole file.
pub fn import_attendance(path: &Path) -> Result<AttendanceTable> {
    if !path.exists() {
        return Err(ReportError::Attendance("File not found.".to_string()));
    }
    let (headers, rows) = if is_csv(path) {
        read_csv(path)?
    } else {
        read_workbook(path)?
    };
    let table = normalize(&headers, rows)?;
    log::info!(
        "Imported {} participants from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// First record is the header row.
fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| ReportError::Attendance(format!("Could not open CSV file: {}", e)))?;
    read_csv_records(reader)
}

fn read_csv_records<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let headers = reader
        .headers()
        .map_err(|e| ReportError::Attendance(format!("Invalid CSV header: {}", e)))?
        .iter()
        .map(String::from)
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReportError::Attendance(format!("Invalid CSV row: {}", e)))?;
        rows.push(record.iter().map(String::from).collect());
    }
    Ok((headers, rows))
}

/// First sheet, first row as headers.
fn read_workbook(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ReportError::Attendance(format!("Could not open Excel file: {}", e)))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ReportError::Attendance("Workbook has no sheets.".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ReportError::Attendance(format!("Sheet not found: {}", e)))?;

    let mut rows = range.rows().map(|row| {
        row.iter()
            .map(|c| c.as_string().unwrap_or_default())
            .collect::<Vec<String>>()
    });
    let headers = rows.next().unwrap_or_default();
    Ok((headers, rows.collect()))
}

/// Re-key to lower-cased column names, keep `name` and `application_id`, number rows from 1.
pub fn normalize(headers: &[String], rows: Vec<Vec<String>>) -> Result<AttendanceTable> {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let position = |col: &str| lowered.iter().position(|h| h == col);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| position(col).is_none())
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        log::warn!("Rejected participants list, missing columns: {:?}", missing);
        return Err(ReportError::MissingColumns(missing));
    }
    let (Some(name_idx), Some(id_idx)) = (position("name"), position("application_id")) else {
        return Err(ReportError::MissingColumns(
            REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        ));
    };

    let cell = |row: &[String], idx: usize| row.get(idx).map(|s| s.trim().to_string()).unwrap_or_default();
    let out = rows
        .iter()
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .enumerate()
        .map(|(i, row)| AttendanceRow {
            sr_no: i + 1,
            name: cell(row, name_idx),
            application_id: cell(row, id_idx),
        })
        .collect();
    Ok(AttendanceTable { rows: out })
}
