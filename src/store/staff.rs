use super::{delete_row, opt_date_at, Assignments};
use crate::error::{RecordError, Result};
use crate::model::{date_text, NewStaffMember, StaffMember, StaffPatch};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row};

pub(crate) const SELECT: &str = "SELECT
    w.staff_id, w.last_name, w.first_name, w.gender, w.birth_date,
    w.job_title, w.phone_number, w.email, w.address, w.hire_date,
    w.created_at, w.updated_at
  FROM staff w";

pub(crate) fn from_row(r: &Row) -> rusqlite::Result<StaffMember> {
    Ok(StaffMember {
        staff_id: r.get(0)?,
        last_name: r.get(1)?,
        first_name: r.get(2)?,
        gender: r.get(3)?,
        birth_date: opt_date_at(r, 4)?,
        job_title: r.get(5)?,
        phone_number: r.get(6)?,
        email: r.get(7)?,
        address: r.get(8)?,
        hire_date: opt_date_at(r, 9)?,
        created_at: r.get(10)?,
        updated_at: r.get(11)?,
    })
}

pub fn create(conn: &Connection, m: &NewStaffMember) -> Result<StaffMember> {
    conn.execute(
        "INSERT INTO staff(
           last_name, first_name, gender, birth_date, job_title,
           phone_number, email, address, hire_date
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            m.last_name,
            m.first_name,
            m.gender,
            m.birth_date.map(date_text),
            m.job_title,
            m.phone_number,
            m.email,
            m.address,
            m.hire_date.map(date_text),
        ],
    )?;
    let id = conn.last_insert_rowid();
    get(conn, id)?.ok_or_else(|| RecordError::not_found("staff member"))
}

pub fn get(conn: &Connection, staff_id: i64) -> Result<Option<StaffMember>> {
    let sql = format!("{} WHERE w.staff_id = ?", SELECT);
    Ok(conn.query_row(&sql, [staff_id], from_row).optional()?)
}

pub fn update(conn: &Connection, staff_id: i64, patch: &StaffPatch) -> Result<bool> {
    let mut a = Assignments::default();
    a.set("last_name", patch.last_name.clone());
    a.set("first_name", patch.first_name.clone());
    a.set("gender", patch.gender.clone());
    a.set("job_title", patch.job_title.clone());
    a.set_nullable_date("birth_date", patch.birth_date);
    a.set_nullable("phone_number", patch.phone_number.clone());
    a.set_nullable("email", patch.email.clone());
    a.set_nullable("address", patch.address.clone());
    a.set_nullable_date("hire_date", patch.hire_date);
    Ok(a.apply(conn, "staff", "staff_id", Value::Integer(staff_id))?)
}

pub fn delete(conn: &Connection, staff_id: i64) -> Result<bool> {
    Ok(delete_row(conn, "staff", "staff_id", Value::Integer(staff_id))?)
}

pub fn list_all(conn: &Connection) -> Result<Vec<StaffMember>> {
    let sql = format!("{} ORDER BY w.staff_id", SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
