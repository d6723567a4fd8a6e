use crate::import::{self, ImportBatch, ImportSummary};
use crate::ipc::helpers::{db_conn, get_required_str, parse_param, respond, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;

fn cell_text(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

// Rows arrive as field -> cell objects; cells may be strings, numbers or null.
fn batch_from_params(params: &serde_json::Value) -> Result<ImportBatch, HandlerErr> {
    let columns: Vec<String> = parse_param(params, "columns")?;
    let raw_rows: Vec<BTreeMap<String, serde_json::Value>> = parse_param(params, "rows")?;
    let rows = raw_rows
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|(field, cell)| cell_text(cell).map(|t| (field.clone(), t)))
                .collect()
        })
        .collect();
    Ok(ImportBatch { columns, rows })
}

fn batch_from_file(params: &serde_json::Value) -> Result<ImportBatch, HandlerErr> {
    let path = PathBuf::from(get_required_str(params, "path")?);
    let mapping: BTreeMap<String, String> = parse_param(params, "mapping")?;
    let source = import::read_csv_source(&path)
        .map_err(|e| HandlerErr::from(e).with_details(json!({ "path": path.to_string_lossy() })))?;
    Ok(import::apply_mapping(&source, &mapping))
}

fn summary_result(summary: ImportSummary, entity: &str) -> HandlerResult {
    let message = format!(
        "imported {} {}; {} failed",
        summary.succeeded, entity, summary.failed
    );
    Ok(json!({
        "summary": summary,
        "message": message
    }))
}

fn run(
    state: &mut AppState,
    batch: Result<ImportBatch, HandlerErr>,
    entity: &str,
    importer: fn(&Connection, &ImportBatch) -> crate::error::Result<ImportSummary>,
) -> HandlerResult {
    let conn = db_conn(state)?;
    let batch = batch?;
    let summary = importer(conn, &batch)?;
    summary_result(summary, entity)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "import.students" => run(
            state,
            batch_from_params(&req.params),
            "students",
            import::import_students,
        ),
        "import.teachers" => run(
            state,
            batch_from_params(&req.params),
            "teachers",
            import::import_teachers,
        ),
        "import.studentsFromFile" => run(
            state,
            batch_from_file(&req.params),
            "students",
            import::import_students,
        ),
        "import.teachersFromFile" => run(
            state,
            batch_from_file(&req.params),
            "teachers",
            import::import_teachers,
        ),
        _ => return None,
    };
    Some(respond(req, res))
}
