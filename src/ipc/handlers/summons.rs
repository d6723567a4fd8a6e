use crate::consistency;
use crate::ipc::helpers::{
    db_conn, found, get_required_date, get_required_i64, get_required_str, listed, parse_param,
    reject_empty_patch, respond, saved, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{NewSummon, SummonPatch};
use crate::query;
use crate::store::summons;
use serde_json::json;

fn handle_summons_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    listed("summons", &summons::list_all(conn)?)
}

fn handle_summons_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let summon_id = get_required_i64(&req.params, "summonId")?;
    found("summon", summons::get(conn, summon_id)?, "parent summon")
}

// A report without a summon is not an error here.
fn handle_summons_for_report(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let report_id = get_required_i64(&req.params, "reportId")?;
    let summon = query::summon_for_report(conn, report_id)?;
    Ok(json!({ "reportId": report_id, "summon": summon }))
}

fn handle_summons_list_for_student(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let student_id = get_required_str(&req.params, "studentId")?;
    listed("summons", &query::summons_for_student(conn, &student_id)?)
}

fn handle_summons_search_by_student_name(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let term = get_required_str(&req.params, "term")?;
    listed("summons", &query::summons_by_student_name(conn, &term)?)
}

fn handle_summons_on_date(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let day = get_required_date(&req.params, "date")?;
    listed("summons", &query::summons_on_date(conn, day)?)
}

fn handle_summons_pending(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    listed("summons", &query::pending_summons(conn)?)
}

fn handle_summons_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let new: NewSummon = parse_param(&req.params, "summon")?;
    let summon = consistency::create_summon(conn, &new)?;
    saved("summon", &summon, "parent summon created")
}

fn handle_summons_update(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let summon_id = get_required_i64(&req.params, "summonId")?;
    let patch: SummonPatch = parse_param(&req.params, "patch")?;
    reject_empty_patch(patch.is_empty())?;
    let summon = consistency::update_summon(conn, summon_id, &patch)?;
    saved("summon", &summon, "parent summon updated")
}

fn handle_summons_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let summon_id = get_required_i64(&req.params, "summonId")?;
    consistency::delete_summon(conn, summon_id)?;
    Ok(json!({ "summonId": summon_id, "message": "parent summon deleted" }))
}

fn handle_summons_get_with_student(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let summon_id = get_required_i64(&req.params, "summonId")?;
    found(
        "summon",
        query::summon_with_student(conn, summon_id)?,
        "parent summon",
    )
}

fn handle_summons_list_with_student(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    listed("summons", &query::summons_with_student(conn)?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "summons.list" => handle_summons_list(state, req),
        "summons.get" => handle_summons_get(state, req),
        "summons.forReport" => handle_summons_for_report(state, req),
        "summons.listForStudent" => handle_summons_list_for_student(state, req),
        "summons.searchByStudentName" => handle_summons_search_by_student_name(state, req),
        "summons.onDate" => handle_summons_on_date(state, req),
        "summons.pending" => handle_summons_pending(state, req),
        "summons.create" => handle_summons_create(state, req),
        "summons.update" => handle_summons_update(state, req),
        "summons.delete" => handle_summons_delete(state, req),
        "summons.getWithStudent" => handle_summons_get_with_student(state, req),
        "summons.listWithStudent" => handle_summons_list_with_student(state, req),
        _ => return None,
    };
    Some(respond(req, res))
}
