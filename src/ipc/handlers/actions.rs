use crate::consistency;
use crate::ipc::helpers::{db_conn, get_required_str, listed, respond, saved, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::query;

fn handle_actions_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    listed("actions", &query::list_actions(conn)?)
}

fn handle_actions_ensure(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = db_conn(state)?;
    let name = get_required_str(&req.params, "name")?;
    let action = consistency::find_or_create_action(conn, &name)?;
    saved("action", &action, "action available")
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "actions.list" => handle_actions_list(state, req),
        "actions.ensure" => handle_actions_ensure(state, req),
        _ => return None,
    };
    Some(respond(req, res))
}
