use crate::consistency;
use crate::error::RecordError;
use crate::ipc::helpers::{
    db_conn, found, get_required_i64, get_required_str, listed, parse_optional_param, parse_param,
    respond, saved, HandlerErr, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{NewReport, ReportPatch, SummonPayload};
use crate::query;
use crate::store::reports;
use serde_json::json;

fn report_extras(req: &Request) -> Result<(Option<Vec<String>>, Option<SummonPayload>), HandlerErr> {
    let actions: Option<Vec<String>> = parse_optional_param(&req.params, "actions")?;
    let summon: Option<SummonPayload> = parse_optional_param(&req.params, "summon")?;
    Ok((actions, summon))
}

fn handle_reports_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    listed("reports", &reports::list_all(conn)?)
}

fn handle_reports_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let report_id = get_required_i64(&req.params, "reportId")?;
    found("report", reports::get(conn, report_id)?, "behavior report")
}

fn handle_reports_list_for_student(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let student_id = get_required_str(&req.params, "studentId")?;
    listed("reports", &query::reports_for_student(conn, &student_id)?)
}

fn handle_reports_search_by_student_name(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let term = get_required_str(&req.params, "term")?;
    listed("reports", &query::reports_by_student_name(conn, &term)?)
}

fn handle_reports_actions(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let report_id = get_required_i64(&req.params, "reportId")?;
    if reports::get(conn, report_id)?.is_none() {
        return Err(RecordError::not_found("behavior report").into());
    }
    let actions = query::report_actions(conn, report_id)?;
    Ok(json!({ "reportId": report_id, "actions": actions }))
}

fn handle_reports_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let new: NewReport = parse_param(&req.params, "report")?;
    let (actions, summon) = report_extras(req)?;
    let actions = actions.unwrap_or_default();
    let saved_report = consistency::create_report(conn, &new, &actions, summon.as_ref())?;
    saved("report", &saved_report, "behavior report created")
}

fn handle_reports_update(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let report_id = get_required_i64(&req.params, "reportId")?;
    let patch: ReportPatch = parse_optional_param(&req.params, "patch")?.unwrap_or_default();
    let (actions, summon) = report_extras(req)?;
    // Without `actions` the current set is resubmitted unchanged.
    let actions = match actions {
        Some(a) => a,
        None => query::report_actions(conn, report_id)?,
    };
    let saved_report = consistency::update_report(conn, report_id, &patch, &actions, summon.as_ref())?;
    saved("report", &saved_report, "behavior report updated")
}

fn handle_reports_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let report_id = get_required_i64(&req.params, "reportId")?;
    let removed = consistency::delete_report(conn, report_id)?;
    Ok(json!({
        "reportId": report_id,
        "removed": removed,
        "message": "behavior report deleted"
    }))
}

fn handle_reports_get_with_student(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let report_id = get_required_i64(&req.params, "reportId")?;
    found(
        "report",
        query::report_with_student(conn, report_id)?,
        "behavior report",
    )
}

fn handle_reports_list_with_student(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    listed("reports", &query::reports_with_student(conn)?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "reports.list" => handle_reports_list(state, req),
        "reports.get" => handle_reports_get(state, req),
        "reports.listForStudent" => handle_reports_list_for_student(state, req),
        "reports.searchByStudentName" => handle_reports_search_by_student_name(state, req),
        "reports.actions" => handle_reports_actions(state, req),
        "reports.create" => handle_reports_create(state, req),
        "reports.update" => handle_reports_update(state, req),
        "reports.delete" => handle_reports_delete(state, req),
        "reports.getWithStudent" => handle_reports_get_with_student(state, req),
        "reports.listWithStudent" => handle_reports_list_with_student(state, req),
        _ => return None,
    };
    Some(respond(req, res))
}
