use crate::consistency;
use crate::ipc::helpers::{
    db_conn, found, get_required_i64, get_required_str, listed, parse_param, reject_empty_patch,
    respond, saved, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{NewStaffMember, StaffPatch};
use crate::query;
use crate::store::staff;
use serde_json::json;

fn handle_staff_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    listed("staff", &staff::list_all(conn)?)
}

fn handle_staff_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let staff_id = get_required_i64(&req.params, "staffId")?;
    found("member", staff::get(conn, staff_id)?, "staff member")
}

fn handle_staff_search(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let term = get_required_str(&req.params, "term")?;
    listed("staff", &query::search_staff(conn, &term)?)
}

fn handle_staff_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let new: NewStaffMember = parse_param(&req.params, "member")?;
    let member = consistency::create_staff(conn, &new)?;
    saved("member", &member, "staff member created")
}

fn handle_staff_update(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let staff_id = get_required_i64(&req.params, "staffId")?;
    let patch: StaffPatch = parse_param(&req.params, "patch")?;
    reject_empty_patch(patch.is_empty())?;
    let member = consistency::update_staff(conn, staff_id, &patch)?;
    saved("member", &member, "staff member updated")
}

fn handle_staff_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let staff_id = get_required_i64(&req.params, "staffId")?;
    consistency::delete_staff(conn, staff_id)?;
    Ok(json!({ "staffId": staff_id, "message": "staff member deleted" }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "staff.list" => handle_staff_list(state, req),
        "staff.get" => handle_staff_get(state, req),
        "staff.search" => handle_staff_search(state, req),
        "staff.create" => handle_staff_create(state, req),
        "staff.update" => handle_staff_update(state, req),
        "staff.delete" => handle_staff_delete(state, req),
        _ => return None,
    };
    Some(respond(req, res))
}
