//! Persistence primitives: one module per table, plus the partial-update
//! builder they share.

pub mod actions;
pub mod certificates;
pub mod reports;
pub mod staff;
pub mod students;
pub mod summons;
pub mod teachers;

use crate::model::{date_text, time_text, DATE_FORMAT, TIME_FORMAT};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};

const NOW_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%SZ','now')";

/// Collects `column = ?` pairs for a partial update. Only supplied patch fields
/// end up here; `updated_at` is appended by [`Assignments::apply`].
#[derive(Default)]
pub(crate) struct Assignments {
    columns: Vec<&'static str>,
    values: Vec<Value>,
}

impl Assignments {
    pub fn set<T: Into<Value>>(&mut self, column: &'static str, value: Option<T>) {
        if let Some(v) = value {
            self.columns.push(column);
            self.values.push(v.into());
        }
    }

    pub fn set_nullable<T: Into<Value>>(&mut self, column: &'static str, value: Option<Option<T>>) {
        if let Some(v) = value {
            self.columns.push(column);
            self.values.push(v.map(Into::into).unwrap_or(Value::Null));
        }
    }

    pub fn set_date(&mut self, column: &'static str, value: Option<NaiveDate>) {
        self.set(column, value.map(date_text));
    }

    pub fn set_nullable_date(&mut self, column: &'static str, value: Option<Option<NaiveDate>>) {
        self.set_nullable(column, value.map(|d| d.map(date_text)));
    }

    pub fn set_time(&mut self, column: &'static str, value: Option<NaiveTime>) {
        self.set(column, value.map(time_text));
    }

    /// Returns whether the keyed row exists. An empty assignment set only checks
    /// existence and leaves `updated_at` alone.
    pub fn apply(
        self,
        conn: &Connection,
        table: &str,
        key_column: &str,
        key: Value,
    ) -> rusqlite::Result<bool> {
        if self.columns.is_empty() {
            return row_exists(conn, table, key_column, key);
        }

        let mut set_parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} = ?", c))
            .collect();
        set_parts.push(format!("updated_at = {}", NOW_SQL));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            table,
            set_parts.join(", "),
            key_column
        );
        let mut bind_values = self.values;
        bind_values.push(key);
        let changed = conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed > 0)
    }
}

pub(crate) fn row_exists(
    conn: &Connection,
    table: &str,
    key_column: &str,
    key: Value,
) -> rusqlite::Result<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE {} = ?", table, key_column);
    conn.query_row(&sql, [key], |r| r.get::<_, i64>(0))
        .optional()
        .map(|v| v.is_some())
}

pub(crate) fn delete_row(
    conn: &Connection,
    table: &str,
    key_column: &str,
    key: Value,
) -> rusqlite::Result<bool> {
    let sql = format!("DELETE FROM {} WHERE {} = ?", table, key_column);
    Ok(conn.execute(&sql, [key])? > 0)
}

fn conversion_failure(idx: usize, e: chrono::ParseError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

pub(crate) fn date_at(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| conversion_failure(idx, e))
}

pub(crate) fn opt_date_at(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(s) if !s.trim().is_empty() => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|e| conversion_failure(idx, e)),
        _ => Ok(None),
    }
}

pub(crate) fn time_at(row: &Row, idx: usize) -> rusqlite::Result<NaiveTime> {
    let raw: String = row.get(idx)?;
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT).map_err(|e| conversion_failure(idx, e))
}
