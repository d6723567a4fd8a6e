//! Mutations that keep the record graph consistent.
//!
//! Every public function opens its own transaction on the workspace connection.
//! Dropping an uncommitted transaction rolls it back, so an early `?` return
//! leaves no partial writes behind.

use crate::error::{RecordError, Result};
use crate::model::{
    Action, BehaviorReport, CertificatePatch, MedicalCertificate, NewCertificate, NewReport,
    NewStaffMember, NewStudent, NewSummon, NewTeacher, ParentSummon, ReportPatch, StaffMember,
    StaffPatch, Student, StudentPatch, SummonPatch, SummonPayload, Teacher, TeacherPatch,
};
use crate::store::{actions, certificates, reports, staff, students, summons, teachers};
use rusqlite::Connection;
use serde::Serialize;

pub(crate) fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RecordError::invalid(format!("{} is required", field)));
    }
    Ok(())
}

fn require_if_set(value: &Option<String>, field: &str) -> Result<()> {
    match value {
        Some(v) => require(v, field),
        None => Ok(()),
    }
}

pub(crate) fn validate_new_student(s: &NewStudent) -> Result<()> {
    require(&s.student_id, "student_id")?;
    require(&s.last_name, "last_name")?;
    require(&s.first_name, "first_name")?;
    require(&s.gender, "gender")
}

pub(crate) fn validate_student_patch(p: &StudentPatch) -> Result<()> {
    require_if_set(&p.last_name, "last_name")?;
    require_if_set(&p.first_name, "first_name")?;
    require_if_set(&p.gender, "gender")
}

pub(crate) fn validate_new_teacher(t: &NewTeacher) -> Result<()> {
    require(&t.last_name, "last_name")?;
    require(&t.first_name, "first_name")?;
    require(&t.gender, "gender")
}

fn ensure_student(conn: &Connection, student_id: &str) -> Result<()> {
    if !students::exists(conn, student_id)? {
        return Err(RecordError::invalid("student not found"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Students

pub fn create_student(conn: &Connection, new: &NewStudent) -> Result<Student> {
    validate_new_student(new)?;
    let tx = conn.unchecked_transaction()?;
    let student = students::create(&tx, new)?;
    tx.commit()?;
    tracing::info!(student_id = %student.student_id, "student created");
    Ok(student)
}

pub fn update_student(conn: &Connection, student_id: &str, patch: &StudentPatch) -> Result<Student> {
    validate_student_patch(patch)?;
    let tx = conn.unchecked_transaction()?;
    if !students::update(&tx, student_id, patch)? {
        return Err(RecordError::not_found("student"));
    }
    let student = students::get(&tx, student_id)?.ok_or_else(|| RecordError::not_found("student"))?;
    tx.commit()?;
    tracing::info!(student_id, "student updated");
    Ok(student)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRemoval {
    pub certificates: usize,
    pub reports: usize,
    pub summons: usize,
    pub report_actions: usize,
}

/// Removes a student and everything it owns, in dependency order.
pub fn delete_student(conn: &Connection, student_id: &str) -> Result<StudentRemoval> {
    let tx = conn.unchecked_transaction()?;
    if !students::exists(&tx, student_id)? {
        return Err(RecordError::not_found("student"));
    }

    let removal = StudentRemoval {
        report_actions: actions::clear_for_student(&tx, student_id)?,
        summons: summons::delete_for_student(&tx, student_id)?,
        reports: reports::delete_for_student(&tx, student_id)?,
        certificates: certificates::delete_for_student(&tx, student_id)?,
    };
    if !students::delete(&tx, student_id)? {
        return Err(RecordError::not_found("student"));
    }
    tx.commit()?;

    tracing::info!(
        student_id,
        certificates = removal.certificates,
        reports = removal.reports,
        summons = removal.summons,
        "student deleted with dependents"
    );
    Ok(removal)
}

// ---------------------------------------------------------------------------
// Teachers and staff

pub fn create_teacher(conn: &Connection, new: &NewTeacher) -> Result<Teacher> {
    validate_new_teacher(new)?;
    let tx = conn.unchecked_transaction()?;
    let teacher = teachers::create(&tx, new)?;
    tx.commit()?;
    tracing::info!(teacher_id = teacher.teacher_id, "teacher created");
    Ok(teacher)
}

pub fn update_teacher(conn: &Connection, teacher_id: i64, patch: &TeacherPatch) -> Result<Teacher> {
    require_if_set(&patch.last_name, "last_name")?;
    require_if_set(&patch.first_name, "first_name")?;
    require_if_set(&patch.gender, "gender")?;
    let tx = conn.unchecked_transaction()?;
    if !teachers::update(&tx, teacher_id, patch)? {
        return Err(RecordError::not_found("teacher"));
    }
    let teacher = teachers::get(&tx, teacher_id)?.ok_or_else(|| RecordError::not_found("teacher"))?;
    tx.commit()?;
    tracing::info!(teacher_id, "teacher updated");
    Ok(teacher)
}

pub fn delete_teacher(conn: &Connection, teacher_id: i64) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    if !teachers::delete(&tx, teacher_id)? {
        return Err(RecordError::not_found("teacher"));
    }
    tx.commit()?;
    tracing::info!(teacher_id, "teacher deleted");
    Ok(())
}

pub fn create_staff(conn: &Connection, new: &NewStaffMember) -> Result<StaffMember> {
    require(&new.last_name, "last_name")?;
    require(&new.first_name, "first_name")?;
    require(&new.gender, "gender")?;
    require(&new.job_title, "job_title")?;
    let tx = conn.unchecked_transaction()?;
    let member = staff::create(&tx, new)?;
    tx.commit()?;
    tracing::info!(staff_id = member.staff_id, "staff member created");
    Ok(member)
}

pub fn update_staff(conn: &Connection, staff_id: i64, patch: &StaffPatch) -> Result<StaffMember> {
    require_if_set(&patch.last_name, "last_name")?;
    require_if_set(&patch.first_name, "first_name")?;
    require_if_set(&patch.gender, "gender")?;
    require_if_set(&patch.job_title, "job_title")?;
    let tx = conn.unchecked_transaction()?;
    if !staff::update(&tx, staff_id, patch)? {
        return Err(RecordError::not_found("staff member"));
    }
    let member = staff::get(&tx, staff_id)?.ok_or_else(|| RecordError::not_found("staff member"))?;
    tx.commit()?;
    tracing::info!(staff_id, "staff member updated");
    Ok(member)
}

pub fn delete_staff(conn: &Connection, staff_id: i64) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    if !staff::delete(&tx, staff_id)? {
        return Err(RecordError::not_found("staff member"));
    }
    tx.commit()?;
    tracing::info!(staff_id, "staff member deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Medical certificates

fn check_validity_window(c_start: chrono::NaiveDate, c_end: chrono::NaiveDate) -> Result<()> {
    if c_end < c_start {
        return Err(RecordError::invalid("end_date must not precede start_date"));
    }
    Ok(())
}

pub fn create_certificate(conn: &Connection, new: &NewCertificate) -> Result<MedicalCertificate> {
    check_validity_window(new.start_date, new.end_date)?;
    let tx = conn.unchecked_transaction()?;
    ensure_student(&tx, &new.student_id)?;
    let cert = certificates::create(&tx, new)?;
    tx.commit()?;
    tracing::info!(
        certificate_id = cert.certificate_id,
        student_id = %cert.student_id,
        "medical certificate created"
    );
    Ok(cert)
}

pub fn update_certificate(
    conn: &Connection,
    certificate_id: i64,
    patch: &CertificatePatch,
) -> Result<MedicalCertificate> {
    let tx = conn.unchecked_transaction()?;
    let current = certificates::get(&tx, certificate_id)?
        .ok_or_else(|| RecordError::not_found("medical certificate"))?;
    check_validity_window(
        patch.start_date.unwrap_or(current.start_date),
        patch.end_date.unwrap_or(current.end_date),
    )?;
    certificates::update(&tx, certificate_id, patch)?;
    let cert = certificates::get(&tx, certificate_id)?
        .ok_or_else(|| RecordError::not_found("medical certificate"))?;
    tx.commit()?;
    tracing::info!(certificate_id, "medical certificate updated");
    Ok(cert)
}

pub fn delete_certificate(conn: &Connection, certificate_id: i64) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    if !certificates::delete(&tx, certificate_id)? {
        return Err(RecordError::not_found("medical certificate"));
    }
    tx.commit()?;
    tracing::info!(certificate_id, "medical certificate deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Action catalog and behavior reports

/// Looks an action up by name and registers it when it is not in the catalog yet.
pub fn find_or_create_action(conn: &Connection, name: &str) -> Result<Action> {
    let name = name.trim();
    require(name, "action name")?;
    let tx = conn.unchecked_transaction()?;
    let (action, created) = actions::find_or_create(&tx, name)?;
    tx.commit()?;
    if created {
        tracing::info!(action = %action.action_name, "action registered in catalog");
    }
    Ok(action)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReport {
    #[serde(flatten)]
    pub report: BehaviorReport,
    pub actions: Vec<String>,
    pub summon: Option<ParentSummon>,
}

fn normalized_action_names(names: &[String]) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let n = name.trim();
        require(n, "action name")?;
        if !out.iter().any(|seen| seen == n) {
            out.push(n.to_string());
        }
    }
    Ok(out)
}

fn validate_summon_payload(payload: &SummonPayload) -> Result<()> {
    require(&payload.parent_name, "parent_name")?;
    require(&payload.summoner_name, "summoner_name")
}

// Full replace: prior associations are dropped before the new set is attached.
fn replace_report_actions(conn: &Connection, report_id: i64, names: &[String]) -> Result<Vec<String>> {
    actions::clear_for_report(conn, report_id)?;
    for name in names {
        let (action, created) = actions::find_or_create(conn, name)?;
        if created {
            tracing::info!(action = %action.action_name, "action registered in catalog");
        }
        actions::attach(conn, report_id, action.action_id)?;
    }
    actions::names_for_report(conn, report_id)
}

fn upsert_report_summon(
    conn: &Connection,
    report: &BehaviorReport,
    payload: &SummonPayload,
) -> Result<ParentSummon> {
    match summons::find_by_report(conn, report.report_id)? {
        Some(existing) => {
            let patch = SummonPatch {
                parent_name: Some(payload.parent_name.clone()),
                summoner_name: Some(payload.summoner_name.clone()),
                summon_date: Some(payload.summon_date),
                summon_time: Some(payload.summon_time),
                attended: payload.attended,
                notes: payload.notes.clone().map(Some),
                report_id: None,
            };
            summons::update(conn, existing.summon_id, &patch)?;
            summons::get(conn, existing.summon_id)?
                .ok_or_else(|| RecordError::not_found("parent summon"))
        }
        None => summons::create(
            conn,
            &NewSummon {
                student_id: report.student_id.clone(),
                parent_name: payload.parent_name.clone(),
                summoner_name: payload.summoner_name.clone(),
                summon_date: payload.summon_date,
                summon_time: payload.summon_time,
                attended: payload.attended.unwrap_or(false),
                notes: payload.notes.clone(),
                report_id: Some(report.report_id),
            },
        ),
    }
}

pub fn create_report(
    conn: &Connection,
    new: &NewReport,
    action_names: &[String],
    summon: Option<&SummonPayload>,
) -> Result<SavedReport> {
    require(&new.reporter_name, "reporter_name")?;
    require(&new.reporter_role, "reporter_role")?;
    let names = normalized_action_names(action_names)?;
    if let Some(payload) = summon {
        validate_summon_payload(payload)?;
    }

    let tx = conn.unchecked_transaction()?;
    ensure_student(&tx, &new.student_id)?;
    let report = reports::create(&tx, new)?;
    let actions = replace_report_actions(&tx, report.report_id, &names)?;
    let summon = match summon {
        Some(payload) => Some(upsert_report_summon(&tx, &report, payload)?),
        None => None,
    };
    tx.commit()?;

    tracing::info!(
        report_id = report.report_id,
        student_id = %report.student_id,
        actions = actions.len(),
        with_summon = summon.is_some(),
        "behavior report created"
    );
    Ok(SavedReport {
        report,
        actions,
        summon,
    })
}

pub fn update_report(
    conn: &Connection,
    report_id: i64,
    patch: &ReportPatch,
    action_names: &[String],
    summon: Option<&SummonPayload>,
) -> Result<SavedReport> {
    require_if_set(&patch.reporter_name, "reporter_name")?;
    require_if_set(&patch.reporter_role, "reporter_role")?;
    let names = normalized_action_names(action_names)?;
    if let Some(payload) = summon {
        validate_summon_payload(payload)?;
    }

    let tx = conn.unchecked_transaction()?;
    if !reports::update(&tx, report_id, patch)? {
        return Err(RecordError::not_found("behavior report"));
    }
    let report = reports::get(&tx, report_id)?
        .ok_or_else(|| RecordError::not_found("behavior report"))?;
    let actions = replace_report_actions(&tx, report_id, &names)?;
    let summon = match summon {
        Some(payload) => Some(upsert_report_summon(&tx, &report, payload)?),
        None => summons::find_by_report(&tx, report_id)?,
    };
    tx.commit()?;

    tracing::info!(report_id, actions = actions.len(), "behavior report updated");
    Ok(SavedReport {
        report,
        actions,
        summon,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRemoval {
    pub report_actions: usize,
    pub summons: usize,
}

/// Deletes a report, its action associations and the summons it spawned.
pub fn delete_report(conn: &Connection, report_id: i64) -> Result<ReportRemoval> {
    let tx = conn.unchecked_transaction()?;
    if reports::get(&tx, report_id)?.is_none() {
        return Err(RecordError::not_found("behavior report"));
    }
    let removal = ReportRemoval {
        report_actions: actions::clear_for_report(&tx, report_id)?,
        summons: summons::delete_for_report(&tx, report_id)?,
    };
    reports::delete(&tx, report_id)?;
    tx.commit()?;

    tracing::info!(report_id, summons = removal.summons, "behavior report deleted");
    Ok(removal)
}

// ---------------------------------------------------------------------------
// Parent summons

// A report owns at most one summon; `summon_id` is the summon being linked, if
// it already exists.
fn ensure_report_for_student(
    conn: &Connection,
    report_id: i64,
    student_id: &str,
    summon_id: Option<i64>,
) -> Result<()> {
    let report = reports::get(conn, report_id)?
        .ok_or_else(|| RecordError::invalid("report not found"))?;
    if report.student_id != student_id {
        return Err(RecordError::invalid("report belongs to another student"));
    }
    if let Some(existing) = summons::find_by_report(conn, report_id)? {
        if Some(existing.summon_id) != summon_id {
            return Err(RecordError::invalid("report already has a summon"));
        }
    }
    Ok(())
}

pub fn create_summon(conn: &Connection, new: &NewSummon) -> Result<ParentSummon> {
    require(&new.parent_name, "parent_name")?;
    require(&new.summoner_name, "summoner_name")?;
    let tx = conn.unchecked_transaction()?;
    ensure_student(&tx, &new.student_id)?;
    if let Some(report_id) = new.report_id {
        ensure_report_for_student(&tx, report_id, &new.student_id, None)?;
    }
    let summon = summons::create(&tx, new)?;
    tx.commit()?;
    tracing::info!(
        summon_id = summon.summon_id,
        student_id = %summon.student_id,
        "parent summon created"
    );
    Ok(summon)
}

pub fn update_summon(conn: &Connection, summon_id: i64, patch: &SummonPatch) -> Result<ParentSummon> {
    require_if_set(&patch.parent_name, "parent_name")?;
    require_if_set(&patch.summoner_name, "summoner_name")?;
    let tx = conn.unchecked_transaction()?;
    let current = summons::get(&tx, summon_id)?
        .ok_or_else(|| RecordError::not_found("parent summon"))?;
    if let Some(Some(report_id)) = patch.report_id {
        ensure_report_for_student(&tx, report_id, &current.student_id, Some(summon_id))?;
    }
    summons::update(&tx, summon_id, patch)?;
    let summon = summons::get(&tx, summon_id)?
        .ok_or_else(|| RecordError::not_found("parent summon"))?;
    tx.commit()?;
    tracing::info!(summon_id, attended = summon.attended, "parent summon updated");
    Ok(summon)
}

pub fn delete_summon(conn: &Connection, summon_id: i64) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    if !summons::delete(&tx, summon_id)? {
        return Err(RecordError::not_found("parent summon"));
    }
    tx.commit()?;
    tracing::info!(summon_id, "parent summon deleted");
    Ok(())
}
