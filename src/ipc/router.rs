use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;

type Family = fn(&mut AppState, &Request) -> Option<serde_json::Value>;

const FAMILIES: [Family; 10] = [
    handlers::core::try_handle,
    handlers::students::try_handle,
    handlers::teachers::try_handle,
    handlers::staff::try_handle,
    handlers::certificates::try_handle,
    handlers::reports::try_handle,
    handlers::actions::try_handle,
    handlers::summons::try_handle,
    handlers::import::try_handle,
    handlers::backup::try_handle,
];

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    let resp = FAMILIES
        .iter()
        .find_map(|family| family(state, &req))
        .unwrap_or_else(|| {
            err(
                &req.id,
                "not_implemented",
                format!("unknown method: {}", req.method),
                None,
            )
        });

    if resp.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = resp
            .pointer("/error/code")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let message = resp
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        tracing::warn!(id = %req.id, method = %req.method, code, message, "request failed");
    } else {
        tracing::debug!(id = %req.id, method = %req.method, "request handled");
    }
    resp
}
