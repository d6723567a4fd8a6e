use crate::consistency;
use crate::ipc::helpers::{
    db_conn, found, get_required_str, listed, parse_param, reject_empty_patch, respond, saved,
    HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{NewStudent, StudentPatch};
use crate::query;
use crate::store::students;
use serde_json::json;

fn handle_students_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    listed("students", &students::list_all(conn)?)
}

fn handle_students_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let student_id = get_required_str(&req.params, "studentId")?;
    found("student", students::get(conn, &student_id)?, "student")
}

fn handle_students_search(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let term = get_required_str(&req.params, "term")?;
    listed("students", &query::search_students(conn, &term)?)
}

fn handle_students_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let new: NewStudent = parse_param(&req.params, "student")?;
    let student = consistency::create_student(conn, &new)?;
    saved("student", &student, "student created")
}

fn handle_students_update(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let student_id = get_required_str(&req.params, "studentId")?;
    let patch: StudentPatch = parse_param(&req.params, "patch")?;
    reject_empty_patch(patch.is_empty())?;
    let student = consistency::update_student(conn, &student_id, &patch)?;
    saved("student", &student, "student updated")
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let student_id = get_required_str(&req.params, "studentId")?;
    let removed = consistency::delete_student(conn, &student_id)?;
    Ok(json!({
        "studentId": student_id,
        "removed": removed,
        "message": "student deleted"
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "students.list" => handle_students_list(state, req),
        "students.get" => handle_students_get(state, req),
        "students.search" => handle_students_search(state, req),
        "students.create" => handle_students_create(state, req),
        "students.update" => handle_students_update(state, req),
        "students.delete" => handle_students_delete(state, req),
        _ => return None,
    };
    Some(respond(req, res))
}
