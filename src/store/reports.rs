use super::{date_at, delete_row, time_at, Assignments};
use crate::error::{RecordError, Result};
use crate::model::{date_text, time_text, BehaviorReport, NewReport, ReportPatch};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row};

pub(crate) const SELECT: &str = "SELECT
    r.report_id, r.student_id, r.reporter_name, r.reporter_role, r.specialization,
    r.report_date, r.report_time, r.description, r.created_at, r.updated_at
  FROM behavior_reports r";

pub(crate) fn from_row(r: &Row) -> rusqlite::Result<BehaviorReport> {
    Ok(BehaviorReport {
        report_id: r.get(0)?,
        student_id: r.get(1)?,
        reporter_name: r.get(2)?,
        reporter_role: r.get(3)?,
        specialization: r.get(4)?,
        report_date: date_at(r, 5)?,
        report_time: time_at(r, 6)?,
        description: r.get(7)?,
        created_at: r.get(8)?,
        updated_at: r.get(9)?,
    })
}

pub fn create(conn: &Connection, report: &NewReport) -> Result<BehaviorReport> {
    conn.execute(
        "INSERT INTO behavior_reports(
           student_id, reporter_name, reporter_role, specialization,
           report_date, report_time, description
         ) VALUES(?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            report.student_id,
            report.reporter_name,
            report.reporter_role,
            report.specialization,
            date_text(report.report_date),
            time_text(report.report_time),
            report.description,
        ],
    )?;
    let id = conn.last_insert_rowid();
    get(conn, id)?.ok_or_else(|| RecordError::not_found("behavior report"))
}

pub fn get(conn: &Connection, report_id: i64) -> Result<Option<BehaviorReport>> {
    let sql = format!("{} WHERE r.report_id = ?", SELECT);
    Ok(conn.query_row(&sql, [report_id], from_row).optional()?)
}

pub fn update(conn: &Connection, report_id: i64, patch: &ReportPatch) -> Result<bool> {
    let mut a = Assignments::default();
    a.set("reporter_name", patch.reporter_name.clone());
    a.set("reporter_role", patch.reporter_role.clone());
    a.set_nullable("specialization", patch.specialization.clone());
    a.set_date("report_date", patch.report_date);
    a.set_time("report_time", patch.report_time);
    a.set_nullable("description", patch.description.clone());
    Ok(a.apply(
        conn,
        "behavior_reports",
        "report_id",
        Value::Integer(report_id),
    )?)
}

pub fn delete(conn: &Connection, report_id: i64) -> Result<bool> {
    Ok(delete_row(
        conn,
        "behavior_reports",
        "report_id",
        Value::Integer(report_id),
    )?)
}

pub fn delete_for_student(conn: &Connection, student_id: &str) -> Result<usize> {
    Ok(conn.execute(
        "DELETE FROM behavior_reports WHERE student_id = ?",
        [student_id],
    )?)
}

pub fn list_all(conn: &Connection) -> Result<Vec<BehaviorReport>> {
    let sql = format!("{} ORDER BY r.report_id", SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
