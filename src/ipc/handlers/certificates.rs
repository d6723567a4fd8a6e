use crate::consistency;
use crate::ipc::helpers::{
    db_conn, found, get_required_date, get_required_i64, get_required_str, listed, parse_param,
    reject_empty_patch, respond, saved, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{CertificatePatch, NewCertificate};
use crate::query;
use crate::store::certificates;
use serde_json::json;

fn handle_certificates_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    listed("certificates", &certificates::list_all(conn)?)
}

fn handle_certificates_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let certificate_id = get_required_i64(&req.params, "certificateId")?;
    found(
        "certificate",
        certificates::get(conn, certificate_id)?,
        "medical certificate",
    )
}

fn handle_certificates_list_for_student(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let student_id = get_required_str(&req.params, "studentId")?;
    listed(
        "certificates",
        &query::certificates_for_student(conn, &student_id)?,
    )
}

fn handle_certificates_search_by_student_name(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let term = get_required_str(&req.params, "term")?;
    listed(
        "certificates",
        &query::certificates_by_student_name(conn, &term)?,
    )
}

fn handle_certificates_active_on(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let day = get_required_date(&req.params, "date")?;
    listed("certificates", &query::certificates_active_on(conn, day)?)
}

fn handle_certificates_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let new: NewCertificate = parse_param(&req.params, "certificate")?;
    let cert = consistency::create_certificate(conn, &new)?;
    saved("certificate", &cert, "medical certificate created")
}

fn handle_certificates_update(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let certificate_id = get_required_i64(&req.params, "certificateId")?;
    let patch: CertificatePatch = parse_param(&req.params, "patch")?;
    reject_empty_patch(patch.is_empty())?;
    let cert = consistency::update_certificate(conn, certificate_id, &patch)?;
    saved("certificate", &cert, "medical certificate updated")
}

fn handle_certificates_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let certificate_id = get_required_i64(&req.params, "certificateId")?;
    consistency::delete_certificate(conn, certificate_id)?;
    Ok(json!({
        "certificateId": certificate_id,
        "message": "medical certificate deleted"
    }))
}

fn handle_certificates_get_with_student(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let certificate_id = get_required_i64(&req.params, "certificateId")?;
    found(
        "certificate",
        query::certificate_with_student(conn, certificate_id)?,
        "medical certificate",
    )
}

fn handle_certificates_list_with_student(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    listed("certificates", &query::certificates_with_student(conn)?)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "certificates.list" => handle_certificates_list(state, req),
        "certificates.get" => handle_certificates_get(state, req),
        "certificates.listForStudent" => handle_certificates_list_for_student(state, req),
        "certificates.searchByStudentName" => {
            handle_certificates_search_by_student_name(state, req)
        }
        "certificates.activeOn" => handle_certificates_active_on(state, req),
        "certificates.create" => handle_certificates_create(state, req),
        "certificates.update" => handle_certificates_update(state, req),
        "certificates.delete" => handle_certificates_delete(state, req),
        "certificates.getWithStudent" => handle_certificates_get_with_student(state, req),
        "certificates.listWithStudent" => handle_certificates_list_with_student(state, req),
        _ => return None,
    };
    Some(respond(req, res))
}
