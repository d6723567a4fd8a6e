use super::{date_at, delete_row, Assignments};
use crate::error::{RecordError, Result};
use crate::model::{date_text, CertificatePatch, MedicalCertificate, NewCertificate};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row};

pub(crate) const SELECT: &str = "SELECT
    c.certificate_id, c.student_id, c.start_date, c.end_date, c.receipt_date,
    c.school_doctor_verified, c.parent_delivered, c.notes,
    c.created_at, c.updated_at
  FROM medical_certificates c";

pub(crate) fn from_row(r: &Row) -> rusqlite::Result<MedicalCertificate> {
    Ok(MedicalCertificate {
        certificate_id: r.get(0)?,
        student_id: r.get(1)?,
        start_date: date_at(r, 2)?,
        end_date: date_at(r, 3)?,
        receipt_date: date_at(r, 4)?,
        school_doctor_verified: r.get(5)?,
        parent_delivered: r.get(6)?,
        notes: r.get(7)?,
        created_at: r.get(8)?,
        updated_at: r.get(9)?,
    })
}

pub fn create(conn: &Connection, c: &NewCertificate) -> Result<MedicalCertificate> {
    conn.execute(
        "INSERT INTO medical_certificates(
           student_id, start_date, end_date, receipt_date,
           school_doctor_verified, parent_delivered, notes
         ) VALUES(?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            c.student_id,
            date_text(c.start_date),
            date_text(c.end_date),
            date_text(c.receipt_date),
            c.school_doctor_verified,
            c.parent_delivered,
            c.notes,
        ],
    )?;
    let id = conn.last_insert_rowid();
    get(conn, id)?.ok_or_else(|| RecordError::not_found("medical certificate"))
}

pub fn get(conn: &Connection, certificate_id: i64) -> Result<Option<MedicalCertificate>> {
    let sql = format!("{} WHERE c.certificate_id = ?", SELECT);
    Ok(conn.query_row(&sql, [certificate_id], from_row).optional()?)
}

pub fn update(conn: &Connection, certificate_id: i64, patch: &CertificatePatch) -> Result<bool> {
    let mut a = Assignments::default();
    a.set_date("start_date", patch.start_date);
    a.set_date("end_date", patch.end_date);
    a.set_date("receipt_date", patch.receipt_date);
    a.set("school_doctor_verified", patch.school_doctor_verified);
    a.set("parent_delivered", patch.parent_delivered);
    a.set_nullable("notes", patch.notes.clone());
    Ok(a.apply(
        conn,
        "medical_certificates",
        "certificate_id",
        Value::Integer(certificate_id),
    )?)
}

pub fn delete(conn: &Connection, certificate_id: i64) -> Result<bool> {
    Ok(delete_row(
        conn,
        "medical_certificates",
        "certificate_id",
        Value::Integer(certificate_id),
    )?)
}

pub fn delete_for_student(conn: &Connection, student_id: &str) -> Result<usize> {
    Ok(conn.execute(
        "DELETE FROM medical_certificates WHERE student_id = ?",
        [student_id],
    )?)
}

pub fn list_all(conn: &Connection) -> Result<Vec<MedicalCertificate>> {
    let sql = format!("{} ORDER BY c.certificate_id", SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
