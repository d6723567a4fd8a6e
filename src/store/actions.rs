use crate::error::Result;
use crate::model::Action;
use rusqlite::{Connection, OptionalExtension, Row};

fn from_row(r: &Row) -> rusqlite::Result<Action> {
    Ok(Action {
        action_id: r.get(0)?,
        action_name: r.get(1)?,
    })
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Action>> {
    Ok(conn
        .query_row(
            "SELECT action_id, action_name FROM actions WHERE action_name = ?",
            [name],
            from_row,
        )
        .optional()?)
}

/// Returns the catalog entry for `name`, registering it first when unseen.
/// The boolean is true when this call created the entry.
pub fn find_or_create(conn: &Connection, name: &str) -> Result<(Action, bool)> {
    if let Some(existing) = find_by_name(conn, name)? {
        return Ok((existing, false));
    }
    conn.execute("INSERT INTO actions(action_name) VALUES(?)", [name])?;
    Ok((
        Action {
            action_id: conn.last_insert_rowid(),
            action_name: name.to_string(),
        },
        true,
    ))
}

pub fn list_all(conn: &Connection) -> Result<Vec<Action>> {
    let mut stmt = conn.prepare("SELECT action_id, action_name FROM actions ORDER BY action_id")?;
    let rows = stmt
        .query_map([], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Duplicate pairs are ignored.
pub fn attach(conn: &Connection, report_id: i64, action_id: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO report_actions(report_id, action_id) VALUES(?, ?)",
        [report_id, action_id],
    )?;
    Ok(())
}

pub fn clear_for_report(conn: &Connection, report_id: i64) -> Result<usize> {
    Ok(conn.execute(
        "DELETE FROM report_actions WHERE report_id = ?",
        [report_id],
    )?)
}

pub fn clear_for_student(conn: &Connection, student_id: &str) -> Result<usize> {
    Ok(conn.execute(
        "DELETE FROM report_actions
         WHERE report_id IN (SELECT report_id FROM behavior_reports WHERE student_id = ?)",
        [student_id],
    )?)
}

pub fn names_for_report(conn: &Connection, report_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT a.action_name
         FROM report_actions ra
         JOIN actions a ON a.action_id = ra.action_id
         WHERE ra.report_id = ?
         ORDER BY a.action_id",
    )?;
    let rows = stmt
        .query_map([report_id], |r| r.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
