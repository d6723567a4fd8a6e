use crate::error::RecordError;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<RecordError> for HandlerErr {
    fn from(e: RecordError) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
            details: None,
        }
    }
}

pub type HandlerResult = Result<serde_json::Value, HandlerErr>;

pub fn respond(req: &Request, res: HandlerResult) -> serde_json::Value {
    match res {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    }
}

pub fn db_conn(state: &AppState) -> Result<&Connection, HandlerErr> {
    state.db.as_ref().ok_or_else(|| HandlerErr {
        code: "no_workspace",
        message: "select a workspace first".to_string(),
        details: None,
    })
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_required_i64(params: &serde_json::Value, key: &str) -> Result<i64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_required_date(params: &serde_json::Value, key: &str) -> Result<NaiveDate, HandlerErr> {
    let raw = get_required_str(params, key)?;
    NaiveDate::parse_from_str(&raw, crate::model::DATE_FORMAT)
        .map_err(|_| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)))
}

/// Deserializes `params[key]` into a typed payload.
pub fn parse_param<T: DeserializeOwned>(params: &serde_json::Value, key: &str) -> Result<T, HandlerErr> {
    let Some(raw) = params.get(key) else {
        return Err(HandlerErr::bad_params(format!("missing {}", key)));
    };
    serde_json::from_value(raw.clone())
        .map_err(|e| HandlerErr::bad_params(format!("invalid {}: {}", key, e)))
}

pub fn parse_optional_param<T: DeserializeOwned>(
    params: &serde_json::Value,
    key: &str,
) -> Result<Option<T>, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(_) => parse_param(params, key).map(Some),
    }
}

pub fn reject_empty_patch(is_empty: bool) -> Result<(), HandlerErr> {
    if is_empty {
        return Err(HandlerErr::bad_params("patch must include at least one field"));
    }
    Ok(())
}

pub fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, HandlerErr> {
    serde_json::to_value(value).map_err(|e| HandlerErr {
        code: "internal",
        message: e.to_string(),
        details: None,
    })
}

/// `{ <key>: value, "message": message }`, the shape of every mutation result.
pub fn saved<T: Serialize>(key: &str, value: &T, message: &str) -> HandlerResult {
    let mut out = json!({ "message": message });
    out[key] = to_json(value)?;
    Ok(out)
}

pub fn listed<T: Serialize>(key: &str, items: &[T]) -> HandlerResult {
    let mut out = json!({ "count": items.len() });
    out[key] = to_json(&items)?;
    Ok(out)
}

pub fn found<T: Serialize>(key: &str, item: Option<T>, what: &str) -> HandlerResult {
    match item {
        Some(v) => {
            let mut out = json!({});
            out[key] = to_json(&v)?;
            Ok(out)
        }
        None => Err(RecordError::not_found(what).into()),
    }
}
