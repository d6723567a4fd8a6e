//! Bulk import of students and teachers from tabular sources.
//!
//! A batch is validated as a whole first (required columns mapped, no unknown
//! fields), then processed row by row inside one transaction. Rows that fail
//! validation or coercion are reported and skipped; a store failure aborts the
//! batch and rolls back every row.

use crate::consistency::{validate_new_student, validate_new_teacher, validate_student_patch};
use crate::error::{RecordError, Result};
use crate::model::{NewStudent, NewTeacher, StudentPatch};
use crate::store::{students, teachers};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const STUDENT_FIELDS: [&str; 16] = [
    "student_id",
    "last_name",
    "first_name",
    "gender",
    "birth_date",
    "birth_judgment",
    "birth_certificate_type",
    "registration_year",
    "birth_certificate_number",
    "birth_place",
    "academic_year",
    "section",
    "class_number",
    "study_system",
    "registration_number",
    "registration_date",
];
pub const STUDENT_REQUIRED: [&str; 5] = ["student_id", "last_name", "first_name", "gender", "birth_date"];

pub const TEACHER_FIELDS: [&str; 9] = [
    "last_name",
    "first_name",
    "gender",
    "birth_date",
    "specialization",
    "phone_number",
    "email",
    "address",
    "hire_date",
];
pub const TEACHER_REQUIRED: [&str; 3] = ["last_name", "first_name", "gender"];

/// Header row plus data rows, as read from a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularSource {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Mapped field names plus one field -> raw cell map per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportBatch {
    pub columns: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowFailure {
    /// 1-based position of the row in the batch.
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub failures: Vec<RowFailure>,
}

enum RowOutcome {
    Inserted,
    Updated,
}

// ---------------------------------------------------------------------------
// CSV sources

#[derive(Default)]
struct CsvRecord {
    cells: Vec<String>,
    buf: String,
    // Blank lines have no cells and no quotes.
    touched: bool,
}

impl CsvRecord {
    fn end_cell(&mut self) {
        self.cells.push(std::mem::take(&mut self.buf));
    }

    fn finish(mut self, out: &mut Vec<Vec<String>>) {
        if self.touched || !self.buf.trim().is_empty() || !self.cells.is_empty() {
            self.end_cell();
            out.push(self.cells);
        }
    }
}

// Records end at unquoted line breaks; quoted cells may span lines.
fn parse_csv_records(text: &str) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    let mut record = CsvRecord::default();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                record.buf.push('"');
                chars.next();
            }
            '"' => {
                in_quotes = !in_quotes;
                record.touched = true;
            }
            ',' if !in_quotes => record.end_cell(),
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => std::mem::take(&mut record).finish(&mut out),
            _ => record.buf.push(ch),
        }
    }
    record.finish(&mut out);
    out
}

/// Splits CSV text into a header row and data rows. Blank lines are ignored.
pub fn parse_csv(text: &str) -> TabularSource {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = parse_csv_records(text).into_iter();
    let headers = match records.next() {
        Some(h) => h.into_iter().map(|s| s.trim().to_string()).collect(),
        None => return TabularSource::default(),
    };
    TabularSource {
        headers,
        rows: records.collect(),
    }
}

pub fn read_csv_source(path: &Path) -> Result<TabularSource> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        return Err(RecordError::invalid("unsupported file type"));
    }
    let text = std::fs::read_to_string(path)?;
    let source = parse_csv(&text);
    tracing::debug!(
        path = %path.display(),
        columns = source.headers.len(),
        rows = source.rows.len(),
        "read tabular source"
    );
    Ok(source)
}

/// Renames source columns to field names. `mapping` is field -> header; entries
/// whose header is not in the source are dropped.
pub fn apply_mapping(source: &TabularSource, mapping: &BTreeMap<String, String>) -> ImportBatch {
    let resolved: Vec<(&String, usize)> = mapping
        .iter()
        .filter_map(|(field, header)| {
            source
                .headers
                .iter()
                .position(|h| h == header.trim())
                .map(|idx| (field, idx))
        })
        .collect();

    let rows = source
        .rows
        .iter()
        .map(|cells| {
            resolved
                .iter()
                .filter_map(|(field, idx)| cells.get(*idx).map(|v| ((*field).clone(), v.clone())))
                .collect()
        })
        .collect();

    ImportBatch {
        columns: resolved.iter().map(|(field, _)| (*field).clone()).collect(),
        rows,
    }
}

// ---------------------------------------------------------------------------
// Cell coercion

const DATE_INPUT_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

fn parse_date_cell(field: &str, raw: &str) -> Result<NaiveDate> {
    let day_part = raw
        .trim()
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or("");
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day_part, fmt).ok())
        .ok_or_else(|| RecordError::invalid(format!("invalid date for {}: {}", field, raw.trim())))
}

fn parse_int_cell(field: &str, raw: &str) -> Result<i64> {
    let t = raw.trim();
    if let Ok(v) = t.parse::<i64>() {
        return Ok(v);
    }
    match t.parse::<f64>() {
        // i64::MAX as f64 rounds up to 2^63, which is already out of range.
        Ok(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(RecordError::invalid(format!("invalid number for {}: {}", field, t))),
    }
}

/// Non-blank cells of a row, trimmed.
fn present_cells(row: &BTreeMap<String, String>) -> BTreeMap<&str, &str> {
    row.iter()
        .map(|(k, v)| (k.as_str(), v.trim()))
        .filter(|(_, v)| !v.is_empty())
        .collect()
}

fn text(cells: &BTreeMap<&str, &str>, field: &str) -> Option<String> {
    cells.get(field).map(|v| v.to_string())
}

fn date(cells: &BTreeMap<&str, &str>, field: &str) -> Result<Option<NaiveDate>> {
    cells.get(field).map(|v| parse_date_cell(field, v)).transpose()
}

fn int(cells: &BTreeMap<&str, &str>, field: &str) -> Result<Option<i64>> {
    cells.get(field).map(|v| parse_int_cell(field, v)).transpose()
}

fn check_columns(batch: &ImportBatch, known: &[&str], required: &[&str]) -> Result<()> {
    if let Some(unknown) = batch.columns.iter().find(|c| !known.contains(&c.as_str())) {
        return Err(RecordError::invalid(format!("unknown field: {}", unknown)));
    }
    if let Some(missing) = required
        .iter()
        .find(|r| !batch.columns.iter().any(|c| c == *r))
    {
        return Err(RecordError::invalid(format!(
            "missing required column: {}",
            missing
        )));
    }
    Ok(())
}

fn missing_required(cells: &BTreeMap<&str, &str>, required: &[&str]) -> Option<String> {
    required
        .iter()
        .find(|f| !cells.contains_key(**f))
        .map(|f| format!("{} is required", f))
}

// ---------------------------------------------------------------------------
// Row processing

fn run_batch<F>(conn: &Connection, batch: &ImportBatch, entity: &str, mut row_fn: F) -> Result<ImportSummary>
where
    F: FnMut(&Connection, &BTreeMap<&str, &str>) -> Result<RowOutcome>,
{
    let tx = conn.unchecked_transaction()?;
    let mut summary = ImportSummary::default();
    for (idx, row) in batch.rows.iter().enumerate() {
        let cells = present_cells(row);
        match row_fn(&*tx, &cells) {
            Ok(RowOutcome::Inserted) => {
                summary.succeeded += 1;
                summary.inserted += 1;
            }
            Ok(RowOutcome::Updated) => {
                summary.succeeded += 1;
                summary.updated += 1;
            }
            Err(e @ (RecordError::Store(_) | RecordError::Io(_))) => {
                tracing::error!(entity, row = idx + 1, error = %e, "import aborted");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(entity, row = idx + 1, reason = %e, "import row skipped");
                summary.failed += 1;
                summary.failures.push(RowFailure {
                    row: idx + 1,
                    reason: e.to_string(),
                });
            }
        }
    }
    tx.commit()?;
    tracing::info!(
        entity,
        succeeded = summary.succeeded,
        failed = summary.failed,
        inserted = summary.inserted,
        updated = summary.updated,
        "import finished"
    );
    Ok(summary)
}

fn student_patch_from(cells: &BTreeMap<&str, &str>) -> Result<StudentPatch> {
    Ok(StudentPatch {
        last_name: text(cells, "last_name"),
        first_name: text(cells, "first_name"),
        gender: text(cells, "gender"),
        birth_date: date(cells, "birth_date")?,
        birth_judgment: text(cells, "birth_judgment").map(Some),
        birth_certificate_type: text(cells, "birth_certificate_type").map(Some),
        registration_year: int(cells, "registration_year")?.map(Some),
        birth_certificate_number: text(cells, "birth_certificate_number").map(Some),
        birth_place: text(cells, "birth_place").map(Some),
        academic_year: text(cells, "academic_year").map(Some),
        section: text(cells, "section").map(Some),
        class_number: text(cells, "class_number").map(Some),
        study_system: text(cells, "study_system").map(Some),
        registration_number: int(cells, "registration_number")?.map(Some),
        registration_date: date(cells, "registration_date")?.map(Some),
    })
}

fn import_student_row(conn: &Connection, cells: &BTreeMap<&str, &str>) -> Result<RowOutcome> {
    let student_id = cells
        .get("student_id")
        .ok_or_else(|| RecordError::invalid("student_id is required"))?;

    if students::exists(conn, student_id)? {
        let patch = student_patch_from(cells)?;
        validate_student_patch(&patch)?;
        students::update(conn, student_id, &patch)?;
        return Ok(RowOutcome::Updated);
    }

    if let Some(reason) = missing_required(cells, &STUDENT_REQUIRED) {
        return Err(RecordError::invalid(reason));
    }
    let birth_date = date(cells, "birth_date")?
        .ok_or_else(|| RecordError::invalid("birth_date is required"))?;
    let mut new = NewStudent::new(
        *student_id,
        cells["last_name"],
        cells["first_name"],
        cells["gender"],
        birth_date,
    );
    new.birth_judgment = text(cells, "birth_judgment");
    new.birth_certificate_type = text(cells, "birth_certificate_type");
    new.registration_year = int(cells, "registration_year")?;
    new.birth_certificate_number = text(cells, "birth_certificate_number");
    new.birth_place = text(cells, "birth_place");
    new.academic_year = text(cells, "academic_year");
    new.section = text(cells, "section");
    new.class_number = text(cells, "class_number");
    new.study_system = text(cells, "study_system");
    new.registration_number = int(cells, "registration_number")?;
    new.registration_date = date(cells, "registration_date")?;
    validate_new_student(&new)?;
    students::create(conn, &new)?;
    Ok(RowOutcome::Inserted)
}

/// Upserts students by identifier.
pub fn import_students(conn: &Connection, batch: &ImportBatch) -> Result<ImportSummary> {
    check_columns(batch, &STUDENT_FIELDS, &STUDENT_REQUIRED)?;
    run_batch(conn, batch, "students", import_student_row)
}

fn import_teacher_row(conn: &Connection, cells: &BTreeMap<&str, &str>) -> Result<RowOutcome> {
    if let Some(reason) = missing_required(cells, &TEACHER_REQUIRED) {
        return Err(RecordError::invalid(reason));
    }
    let new = NewTeacher {
        last_name: cells["last_name"].to_string(),
        first_name: cells["first_name"].to_string(),
        gender: cells["gender"].to_string(),
        birth_date: date(cells, "birth_date")?,
        specialization: text(cells, "specialization"),
        phone_number: text(cells, "phone_number"),
        email: text(cells, "email"),
        address: text(cells, "address"),
        hire_date: date(cells, "hire_date")?,
    };
    validate_new_teacher(&new)?;
    teachers::create(conn, &new)?;
    Ok(RowOutcome::Inserted)
}

/// Every complete row becomes a new teacher.
pub fn import_teachers(conn: &Connection, batch: &ImportBatch) -> Result<ImportSummary> {
    check_columns(batch, &TEACHER_FIELDS, &TEACHER_REQUIRED)?;
    run_batch(conn, batch, "teachers", import_teacher_row)
}
