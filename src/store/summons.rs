use super::{date_at, delete_row, time_at, Assignments};
use crate::error::{RecordError, Result};
use crate::model::{date_text, time_text, NewSummon, ParentSummon, SummonPatch};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row};

pub(crate) const SELECT: &str = "SELECT
    p.summon_id, p.student_id, p.parent_name, p.summoner_name, p.summon_date,
    p.summon_time, p.attended, p.report_id, p.notes, p.created_at, p.updated_at
  FROM parent_summons p";

pub(crate) fn from_row(r: &Row) -> rusqlite::Result<ParentSummon> {
    Ok(ParentSummon {
        summon_id: r.get(0)?,
        student_id: r.get(1)?,
        parent_name: r.get(2)?,
        summoner_name: r.get(3)?,
        summon_date: date_at(r, 4)?,
        summon_time: time_at(r, 5)?,
        attended: r.get(6)?,
        report_id: r.get(7)?,
        notes: r.get(8)?,
        created_at: r.get(9)?,
        updated_at: r.get(10)?,
    })
}

pub fn create(conn: &Connection, s: &NewSummon) -> Result<ParentSummon> {
    conn.execute(
        "INSERT INTO parent_summons(
           student_id, parent_name, summoner_name, summon_date, summon_time,
           attended, report_id, notes
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            s.student_id,
            s.parent_name,
            s.summoner_name,
            date_text(s.summon_date),
            time_text(s.summon_time),
            s.attended,
            s.report_id,
            s.notes,
        ],
    )?;
    let id = conn.last_insert_rowid();
    get(conn, id)?.ok_or_else(|| RecordError::not_found("parent summon"))
}

pub fn get(conn: &Connection, summon_id: i64) -> Result<Option<ParentSummon>> {
    let sql = format!("{} WHERE p.summon_id = ?", SELECT);
    Ok(conn.query_row(&sql, [summon_id], from_row).optional()?)
}

/// The summon spawned by a report.
pub fn find_by_report(conn: &Connection, report_id: i64) -> Result<Option<ParentSummon>> {
    let sql = format!(
        "{} WHERE p.report_id = ? ORDER BY p.summon_id LIMIT 1",
        SELECT
    );
    Ok(conn.query_row(&sql, [report_id], from_row).optional()?)
}

pub fn update(conn: &Connection, summon_id: i64, patch: &SummonPatch) -> Result<bool> {
    let mut a = Assignments::default();
    a.set("parent_name", patch.parent_name.clone());
    a.set("summoner_name", patch.summoner_name.clone());
    a.set_date("summon_date", patch.summon_date);
    a.set_time("summon_time", patch.summon_time);
    a.set("attended", patch.attended);
    a.set_nullable("notes", patch.notes.clone());
    a.set_nullable("report_id", patch.report_id);
    Ok(a.apply(
        conn,
        "parent_summons",
        "summon_id",
        Value::Integer(summon_id),
    )?)
}

pub fn delete(conn: &Connection, summon_id: i64) -> Result<bool> {
    Ok(delete_row(
        conn,
        "parent_summons",
        "summon_id",
        Value::Integer(summon_id),
    )?)
}

pub fn delete_for_report(conn: &Connection, report_id: i64) -> Result<usize> {
    Ok(conn.execute(
        "DELETE FROM parent_summons WHERE report_id = ?",
        [report_id],
    )?)
}

pub fn delete_for_student(conn: &Connection, student_id: &str) -> Result<usize> {
    Ok(conn.execute(
        "DELETE FROM parent_summons WHERE student_id = ?",
        [student_id],
    )?)
}

pub fn list_all(conn: &Connection) -> Result<Vec<ParentSummon>> {
    let sql = format!("{} ORDER BY p.summon_id", SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
