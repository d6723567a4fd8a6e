use crate::consistency;
use crate::ipc::helpers::{
    db_conn, found, get_required_i64, get_required_str, listed, parse_param, reject_empty_patch,
    respond, saved, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{NewTeacher, TeacherPatch};
use crate::query;
use crate::store::teachers;
use serde_json::json;

fn handle_teachers_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    listed("teachers", &teachers::list_all(conn)?)
}

fn handle_teachers_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let teacher_id = get_required_i64(&req.params, "teacherId")?;
    found("teacher", teachers::get(conn, teacher_id)?, "teacher")
}

fn handle_teachers_search(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let term = get_required_str(&req.params, "term")?;
    listed("teachers", &query::search_teachers(conn, &term)?)
}

fn handle_teachers_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let new: NewTeacher = parse_param(&req.params, "teacher")?;
    let teacher = consistency::create_teacher(conn, &new)?;
    saved("teacher", &teacher, "teacher created")
}

fn handle_teachers_update(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let teacher_id = get_required_i64(&req.params, "teacherId")?;
    let patch: TeacherPatch = parse_param(&req.params, "patch")?;
    reject_empty_patch(patch.is_empty())?;
    let teacher = consistency::update_teacher(conn, teacher_id, &patch)?;
    saved("teacher", &teacher, "teacher updated")
}

fn handle_teachers_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let teacher_id = get_required_i64(&req.params, "teacherId")?;
    consistency::delete_teacher(conn, teacher_id)?;
    Ok(json!({ "teacherId": teacher_id, "message": "teacher deleted" }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "teachers.list" => handle_teachers_list(state, req),
        "teachers.get" => handle_teachers_get(state, req),
        "teachers.search" => handle_teachers_search(state, req),
        "teachers.create" => handle_teachers_create(state, req),
        "teachers.update" => handle_teachers_update(state, req),
        "teachers.delete" => handle_teachers_delete(state, req),
        _ => return None,
    };
    Some(respond(req, res))
}
