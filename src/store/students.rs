use super::{date_at, delete_row, opt_date_at, row_exists, Assignments};
use crate::error::{RecordError, Result};
use crate::model::{date_text, NewStudent, Student, StudentPatch};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row};

pub(crate) const SELECT: &str = "SELECT
    s.student_id, s.last_name, s.first_name, s.gender, s.birth_date,
    s.birth_judgment, s.birth_certificate_type, s.registration_year,
    s.birth_certificate_number, s.birth_place, s.academic_year, s.section,
    s.class_number, s.study_system, s.registration_number, s.registration_date,
    s.created_at, s.updated_at
  FROM students s";

pub(crate) fn from_row(r: &Row) -> rusqlite::Result<Student> {
    Ok(Student {
        student_id: r.get(0)?,
        last_name: r.get(1)?,
        first_name: r.get(2)?,
        gender: r.get(3)?,
        birth_date: date_at(r, 4)?,
        birth_judgment: r.get(5)?,
        birth_certificate_type: r.get(6)?,
        registration_year: r.get(7)?,
        birth_certificate_number: r.get(8)?,
        birth_place: r.get(9)?,
        academic_year: r.get(10)?,
        section: r.get(11)?,
        class_number: r.get(12)?,
        study_system: r.get(13)?,
        registration_number: r.get(14)?,
        registration_date: opt_date_at(r, 15)?,
        created_at: r.get(16)?,
        updated_at: r.get(17)?,
    })
}

/// Inserts a student under its externally assigned identifier.
pub fn create(conn: &Connection, s: &NewStudent) -> Result<Student> {
    if exists(conn, &s.student_id)? {
        return Err(RecordError::DuplicateKey("student already exists".into()));
    }
    conn.execute(
        "INSERT INTO students(
           student_id, last_name, first_name, gender, birth_date,
           birth_judgment, birth_certificate_type, registration_year,
           birth_certificate_number, birth_place, academic_year, section,
           class_number, study_system, registration_number, registration_date
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            s.student_id,
            s.last_name,
            s.first_name,
            s.gender,
            date_text(s.birth_date),
            s.birth_judgment,
            s.birth_certificate_type,
            s.registration_year,
            s.birth_certificate_number,
            s.birth_place,
            s.academic_year,
            s.section,
            s.class_number,
            s.study_system,
            s.registration_number,
            s.registration_date.map(date_text),
        ],
    )?;
    get(conn, &s.student_id)?.ok_or_else(|| RecordError::not_found("student"))
}

pub fn get(conn: &Connection, student_id: &str) -> Result<Option<Student>> {
    let sql = format!("{} WHERE s.student_id = ?", SELECT);
    Ok(conn.query_row(&sql, [student_id], from_row).optional()?)
}

pub fn exists(conn: &Connection, student_id: &str) -> Result<bool> {
    Ok(row_exists(
        conn,
        "students",
        "student_id",
        Value::Text(student_id.to_string()),
    )?)
}

pub fn update(conn: &Connection, student_id: &str, patch: &StudentPatch) -> Result<bool> {
    let mut a = Assignments::default();
    a.set("last_name", patch.last_name.clone());
    a.set("first_name", patch.first_name.clone());
    a.set("gender", patch.gender.clone());
    a.set_date("birth_date", patch.birth_date);
    a.set_nullable("birth_judgment", patch.birth_judgment.clone());
    a.set_nullable("birth_certificate_type", patch.birth_certificate_type.clone());
    a.set_nullable("registration_year", patch.registration_year);
    a.set_nullable("birth_certificate_number", patch.birth_certificate_number.clone());
    a.set_nullable("birth_place", patch.birth_place.clone());
    a.set_nullable("academic_year", patch.academic_year.clone());
    a.set_nullable("section", patch.section.clone());
    a.set_nullable("class_number", patch.class_number.clone());
    a.set_nullable("study_system", patch.study_system.clone());
    a.set_nullable("registration_number", patch.registration_number);
    a.set_nullable_date("registration_date", patch.registration_date);
    Ok(a.apply(
        conn,
        "students",
        "student_id",
        Value::Text(student_id.to_string()),
    )?)
}

/// Removes only the student row. Dependents are handled by the consistency engine.
pub fn delete(conn: &Connection, student_id: &str) -> Result<bool> {
    Ok(delete_row(
        conn,
        "students",
        "student_id",
        Value::Text(student_id.to_string()),
    )?)
}

pub fn list_all(conn: &Connection) -> Result<Vec<Student>> {
    let sql = format!("{} ORDER BY s.student_id", SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
