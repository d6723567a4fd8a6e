use super::{delete_row, opt_date_at, Assignments};
use crate::error::{RecordError, Result};
use crate::model::{date_text, NewTeacher, Teacher, TeacherPatch};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row};

pub(crate) const SELECT: &str = "SELECT
    t.teacher_id, t.last_name, t.first_name, t.gender, t.birth_date,
    t.specialization, t.phone_number, t.email, t.address, t.hire_date,
    t.created_at, t.updated_at
  FROM teachers t";

pub(crate) fn from_row(r: &Row) -> rusqlite::Result<Teacher> {
    Ok(Teacher {
        teacher_id: r.get(0)?,
        last_name: r.get(1)?,
        first_name: r.get(2)?,
        gender: r.get(3)?,
        birth_date: opt_date_at(r, 4)?,
        specialization: r.get(5)?,
        phone_number: r.get(6)?,
        email: r.get(7)?,
        address: r.get(8)?,
        hire_date: opt_date_at(r, 9)?,
        created_at: r.get(10)?,
        updated_at: r.get(11)?,
    })
}

pub fn create(conn: &Connection, t: &NewTeacher) -> Result<Teacher> {
    conn.execute(
        "INSERT INTO teachers(
           last_name, first_name, gender, birth_date, specialization,
           phone_number, email, address, hire_date
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            t.last_name,
            t.first_name,
            t.gender,
            t.birth_date.map(date_text),
            t.specialization,
            t.phone_number,
            t.email,
            t.address,
            t.hire_date.map(date_text),
        ],
    )?;
    let id = conn.last_insert_rowid();
    get(conn, id)?.ok_or_else(|| RecordError::not_found("teacher"))
}

pub fn get(conn: &Connection, teacher_id: i64) -> Result<Option<Teacher>> {
    let sql = format!("{} WHERE t.teacher_id = ?", SELECT);
    Ok(conn.query_row(&sql, [teacher_id], from_row).optional()?)
}

pub fn update(conn: &Connection, teacher_id: i64, patch: &TeacherPatch) -> Result<bool> {
    let mut a = Assignments::default();
    a.set("last_name", patch.last_name.clone());
    a.set("first_name", patch.first_name.clone());
    a.set("gender", patch.gender.clone());
    a.set_nullable_date("birth_date", patch.birth_date);
    a.set_nullable("specialization", patch.specialization.clone());
    a.set_nullable("phone_number", patch.phone_number.clone());
    a.set_nullable("email", patch.email.clone());
    a.set_nullable("address", patch.address.clone());
    a.set_nullable_date("hire_date", patch.hire_date);
    Ok(a.apply(conn, "teachers", "teacher_id", Value::Integer(teacher_id))?)
}

pub fn delete(conn: &Connection, teacher_id: i64) -> Result<bool> {
    Ok(delete_row(
        conn,
        "teachers",
        "teacher_id",
        Value::Integer(teacher_id),
    )?)
}

pub fn list_all(conn: &Connection) -> Result<Vec<Teacher>> {
    let sql = format!("{} ORDER BY t.teacher_id", SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
