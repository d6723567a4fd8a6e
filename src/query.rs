//! Read-side lookups: substring search, per-student lists, date filters and the
//! joined views that carry the student's display name.
//!
//! Substring matching uses `instr`, so it is case-sensitive.

use crate::error::Result;
use crate::model::{
    date_text, Action, BehaviorReport, CertificateView, MedicalCertificate, ParentSummon,
    ReportView, StaffMember, Student, SummonView, Teacher,
};
use crate::store::{actions, certificates, reports, staff, students, summons, teachers};
use chrono::NaiveDate;
use rusqlite::{Connection, Params, Row};
use std::collections::HashMap;

fn collect<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    from_row: fn(&Row) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// People

pub fn search_students(conn: &Connection, term: &str) -> Result<Vec<Student>> {
    let sql = format!(
        "{} WHERE instr(s.first_name, ?1) > 0 OR instr(s.last_name, ?1) > 0
         ORDER BY s.student_id",
        students::SELECT
    );
    collect(conn, &sql, [term], students::from_row)
}

pub fn search_teachers(conn: &Connection, term: &str) -> Result<Vec<Teacher>> {
    let sql = format!(
        "{} WHERE instr(t.first_name, ?1) > 0
            OR instr(t.last_name, ?1) > 0
            OR instr(COALESCE(t.specialization, ''), ?1) > 0
         ORDER BY t.teacher_id",
        teachers::SELECT
    );
    collect(conn, &sql, [term], teachers::from_row)
}

pub fn search_staff(conn: &Connection, term: &str) -> Result<Vec<StaffMember>> {
    let sql = format!(
        "{} WHERE instr(w.first_name, ?1) > 0
            OR instr(w.last_name, ?1) > 0
            OR instr(w.job_title, ?1) > 0
         ORDER BY w.staff_id",
        staff::SELECT
    );
    collect(conn, &sql, [term], staff::from_row)
}

// ---------------------------------------------------------------------------
// Per-student and name-based lookups

const STUDENT_NAME_MATCH: &str =
    "JOIN students s ON s.student_id = {alias}.student_id
     WHERE instr(s.first_name, ?1) > 0 OR instr(s.last_name, ?1) > 0";

fn by_student_name_sql(select: &str, alias: &str, order_column: &str) -> String {
    format!(
        "{} {} ORDER BY {}.{}",
        select,
        STUDENT_NAME_MATCH.replace("{alias}", alias),
        alias,
        order_column
    )
}

pub fn certificates_for_student(conn: &Connection, student_id: &str) -> Result<Vec<MedicalCertificate>> {
    let sql = format!(
        "{} WHERE c.student_id = ? ORDER BY c.certificate_id",
        certificates::SELECT
    );
    collect(conn, &sql, [student_id], certificates::from_row)
}

pub fn certificates_by_student_name(conn: &Connection, term: &str) -> Result<Vec<MedicalCertificate>> {
    let sql = by_student_name_sql(certificates::SELECT, "c", "certificate_id");
    collect(conn, &sql, [term], certificates::from_row)
}

pub fn reports_for_student(conn: &Connection, student_id: &str) -> Result<Vec<BehaviorReport>> {
    let sql = format!(
        "{} WHERE r.student_id = ? ORDER BY r.report_id",
        reports::SELECT
    );
    collect(conn, &sql, [student_id], reports::from_row)
}

pub fn reports_by_student_name(conn: &Connection, term: &str) -> Result<Vec<BehaviorReport>> {
    let sql = by_student_name_sql(reports::SELECT, "r", "report_id");
    collect(conn, &sql, [term], reports::from_row)
}

pub fn summons_for_student(conn: &Connection, student_id: &str) -> Result<Vec<ParentSummon>> {
    let sql = format!(
        "{} WHERE p.student_id = ? ORDER BY p.summon_id",
        summons::SELECT
    );
    collect(conn, &sql, [student_id], summons::from_row)
}

pub fn summons_by_student_name(conn: &Connection, term: &str) -> Result<Vec<ParentSummon>> {
    let sql = by_student_name_sql(summons::SELECT, "p", "summon_id");
    collect(conn, &sql, [term], summons::from_row)
}

// ---------------------------------------------------------------------------
// Date and status filters

/// Certificates whose validity window contains `day`, both ends inclusive.
pub fn certificates_active_on(conn: &Connection, day: NaiveDate) -> Result<Vec<MedicalCertificate>> {
    let sql = format!(
        "{} WHERE c.start_date <= ?1 AND c.end_date >= ?1 ORDER BY c.certificate_id",
        certificates::SELECT
    );
    collect(conn, &sql, [date_text(day)], certificates::from_row)
}

pub fn summons_on_date(conn: &Connection, day: NaiveDate) -> Result<Vec<ParentSummon>> {
    let sql = format!(
        "{} WHERE p.summon_date = ? ORDER BY p.summon_id",
        summons::SELECT
    );
    collect(conn, &sql, [date_text(day)], summons::from_row)
}

pub fn pending_summons(conn: &Connection) -> Result<Vec<ParentSummon>> {
    let sql = format!("{} WHERE p.attended = 0 ORDER BY p.summon_id", summons::SELECT);
    collect(conn, &sql, rusqlite::params![], summons::from_row)
}

pub fn summon_for_report(conn: &Connection, report_id: i64) -> Result<Option<ParentSummon>> {
    summons::find_by_report(conn, report_id)
}

pub fn report_actions(conn: &Connection, report_id: i64) -> Result<Vec<String>> {
    actions::names_for_report(conn, report_id)
}

pub fn list_actions(conn: &Connection) -> Result<Vec<Action>> {
    actions::list_all(conn)
}

// ---------------------------------------------------------------------------
// Joined views

fn student_names(conn: &Connection) -> Result<HashMap<String, String>> {
    let mut stmt = conn.prepare("SELECT student_id, first_name, last_name FROM students")?;
    let rows = stmt.query_map([], |r| {
        let id: String = r.get(0)?;
        let first: String = r.get(1)?;
        let last: String = r.get(2)?;
        Ok((id, format!("{} {}", first, last)))
    })?;
    let mut out = HashMap::new();
    for row in rows {
        let (id, name) = row?;
        out.insert(id, name);
    }
    Ok(out)
}

fn student_name(conn: &Connection, student_id: &str) -> Result<Option<String>> {
    Ok(students::get(conn, student_id)?.map(|s| s.full_name()))
}

pub fn certificate_with_student(conn: &Connection, certificate_id: i64) -> Result<Option<CertificateView>> {
    let Some(certificate) = certificates::get(conn, certificate_id)? else {
        return Ok(None);
    };
    Ok(student_name(conn, &certificate.student_id)?.map(|student_name| CertificateView {
        certificate,
        student_name,
    }))
}

pub fn certificates_with_student(conn: &Connection) -> Result<Vec<CertificateView>> {
    let names = student_names(conn)?;
    Ok(certificates::list_all(conn)?
        .into_iter()
        .filter_map(|certificate| {
            let student_name = names.get(&certificate.student_id)?.clone();
            Some(CertificateView {
                certificate,
                student_name,
            })
        })
        .collect())
}

fn report_view(conn: &Connection, report: BehaviorReport, student_name: String) -> Result<ReportView> {
    let actions = actions::names_for_report(conn, report.report_id)?;
    let summon = summons::find_by_report(conn, report.report_id)?;
    Ok(ReportView {
        report,
        student_name,
        actions,
        summon,
    })
}

pub fn report_with_student(conn: &Connection, report_id: i64) -> Result<Option<ReportView>> {
    let Some(report) = reports::get(conn, report_id)? else {
        return Ok(None);
    };
    match student_name(conn, &report.student_id)? {
        Some(name) => Ok(Some(report_view(conn, report, name)?)),
        None => Ok(None),
    }
}

pub fn reports_with_student(conn: &Connection) -> Result<Vec<ReportView>> {
    let names = student_names(conn)?;
    let mut out = Vec::new();
    for report in reports::list_all(conn)? {
        if let Some(name) = names.get(&report.student_id) {
            out.push(report_view(conn, report, name.clone())?);
        }
    }
    Ok(out)
}

pub fn summon_with_student(conn: &Connection, summon_id: i64) -> Result<Option<SummonView>> {
    let Some(summon) = summons::get(conn, summon_id)? else {
        return Ok(None);
    };
    Ok(student_name(conn, &summon.student_id)?.map(|student_name| SummonView {
        summon,
        student_name,
    }))
}

pub fn summons_with_student(conn: &Connection) -> Result<Vec<SummonView>> {
    let names = student_names(conn)?;
    Ok(summons::list_all(conn)?
        .into_iter()
        .filter_map(|summon| {
            let student_name = names.get(&summon.student_id)?.clone();
            Some(SummonView {
                summon,
                student_name,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency;
    use crate::db;
    use crate::model::{NewCertificate, NewReport, NewStudent, NewSummon, NewTeacher};
    use chrono::NaiveTime;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open memory db");
        db::init_schema(&conn).expect("init schema");
        conn
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn seed(conn: &Connection) {
        for (id, last, first) in [("S1", "Amrani", "Lina"), ("S2", "Benali", "Karim")] {
            consistency::create_student(conn, &NewStudent::new(id, last, first, "F", ymd(2011, 1, 1)))
                .expect("student");
        }
    }

    fn summon(conn: &Connection, student_id: &str, day: NaiveDate, attended: bool) -> ParentSummon {
        consistency::create_summon(
            conn,
            &NewSummon {
                student_id: student_id.into(),
                parent_name: "X".into(),
                summoner_name: "Y".into(),
                summon_date: day,
                summon_time: NaiveTime::from_hms_opt(9, 0, 0).expect("time"),
                attended,
                notes: None,
                report_id: None,
            },
        )
        .expect("summon")
    }

    #[test]
    fn student_search_is_case_sensitive_substring() {
        let conn = conn();
        seed(&conn);
        let hits = search_students(&conn, "Ben").expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].student_id, "S2");
        assert!(search_students(&conn, "ben").expect("search").is_empty());
        assert_eq!(search_students(&conn, "a").expect("search").len(), 2);
    }

    #[test]
    fn teacher_search_covers_specialization() {
        let conn = conn();
        consistency::create_teacher(
            &conn,
            &NewTeacher {
                last_name: "Haddad".into(),
                first_name: "Omar".into(),
                gender: "M".into(),
                specialization: Some("Physics".into()),
                ..Default::default()
            },
        )
        .expect("teacher");
        assert_eq!(search_teachers(&conn, "Phys").expect("search").len(), 1);
        assert!(search_teachers(&conn, "phys").expect("search").is_empty());
    }

    #[test]
    fn certificate_window_is_inclusive() {
        let conn = conn();
        seed(&conn);
        consistency::create_certificate(
            &conn,
            &NewCertificate {
                student_id: "S1".into(),
                start_date: ymd(2023, 10, 1),
                end_date: ymd(2023, 10, 5),
                receipt_date: ymd(2023, 10, 1),
                school_doctor_verified: false,
                parent_delivered: false,
                notes: None,
            },
        )
        .expect("certificate");

        for (day, expected) in [
            (ymd(2023, 10, 3), 1),
            (ymd(2023, 10, 5), 1),
            (ymd(2023, 10, 1), 1),
            (ymd(2023, 10, 6), 0),
            (ymd(2023, 9, 30), 0),
        ] {
            assert_eq!(
                certificates_active_on(&conn, day).expect("active").len(),
                expected,
                "day {}",
                day
            );
        }
    }

    #[test]
    fn pending_returns_exactly_unattended_summons() {
        let conn = conn();
        seed(&conn);
        let open = summon(&conn, "S1", ymd(2023, 10, 2), false);
        summon(&conn, "S2", ymd(2023, 10, 2), true);
        let later = summon(&conn, "S2", ymd(2023, 10, 9), false);

        let pending: Vec<i64> = pending_summons(&conn)
            .expect("pending")
            .into_iter()
            .map(|s| s.summon_id)
            .collect();
        assert_eq!(pending, vec![open.summon_id, later.summon_id]);
        assert_eq!(summons_on_date(&conn, ymd(2023, 10, 2)).expect("on date").len(), 2);
    }

    #[test]
    fn name_lookups_union_every_matching_student() {
        let conn = conn();
        seed(&conn);
        summon(&conn, "S1", ymd(2023, 10, 2), false);
        summon(&conn, "S2", ymd(2023, 10, 3), false);
        summon(&conn, "S2", ymd(2023, 10, 4), false);

        assert_eq!(summons_by_student_name(&conn, "a").expect("by name").len(), 3);
        assert_eq!(summons_by_student_name(&conn, "Karim").expect("by name").len(), 2);
        assert_eq!(summons_for_student(&conn, "S1").expect("for student").len(), 1);
    }

    #[test]
    fn report_view_carries_name_actions_and_summon() {
        let conn = conn();
        seed(&conn);
        let saved = consistency::create_report(
            &conn,
            &NewReport {
                student_id: "S1".into(),
                reporter_name: "Mr. Haddad".into(),
                reporter_role: "teacher".into(),
                specialization: None,
                report_date: ymd(2023, 10, 2),
                report_time: NaiveTime::from_hms_opt(10, 0, 0).expect("time"),
                description: None,
            },
            &["oral warning".to_string()],
            None,
        )
        .expect("report");

        let view = report_with_student(&conn, saved.report.report_id)
            .expect("view")
            .expect("present");
        assert_eq!(view.student_name, "Lina Amrani");
        assert_eq!(view.actions, vec!["oral warning".to_string()]);
        assert!(view.summon.is_none());
        assert_eq!(reports_with_student(&conn).expect("views").len(), 1);

        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(json["reportId"], saved.report.report_id);
        assert_eq!(json["studentName"], "Lina Amrani");
    }

    #[test]
    fn views_skip_records_whose_student_is_missing() {
        let conn = conn();
        seed(&conn);
        let kept = summon(&conn, "S1", ymd(2023, 10, 2), false);
        let orphan = summon(&conn, "S2", ymd(2023, 10, 2), false);
        conn.execute_batch("PRAGMA foreign_keys = OFF; DELETE FROM students WHERE student_id = 'S2';")
            .expect("remove student behind the engine's back");

        let views = summons_with_student(&conn).expect("views");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].summon.summon_id, kept.summon_id);
        assert!(summon_with_student(&conn, orphan.summon_id)
            .expect("lookup")
            .is_none());
    }
}
