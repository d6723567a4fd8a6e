use crate::backup;
use crate::ipc::helpers::{get_required_str, respond, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::{Path, PathBuf};

fn workspace_path(state: &AppState, req: &Request) -> Result<PathBuf, HandlerErr> {
    req.params
        .get("workspacePath")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .or_else(|| state.workspace.clone())
        .ok_or_else(|| HandlerErr {
            code: "no_workspace",
            message: "select a workspace first".to_string(),
            details: None,
        })
}

fn io_failed(e: anyhow::Error, path: &str) -> HandlerErr {
    tracing::error!(path, error = %e, "backup operation failed");
    HandlerErr {
        code: "io_failed",
        message: e.to_string(),
        details: Some(json!({ "path": path })),
    }
}

fn handle_export_workspace_bundle(state: &mut AppState, req: &Request) -> HandlerResult {
    let out_path = get_required_str(&req.params, "outPath")?;
    let workspace = workspace_path(state, req)?;

    let export = backup::export_workspace_bundle(&workspace, &PathBuf::from(&out_path))
        .map_err(|e| io_failed(e, &out_path))?;

    Ok(json!({
        "path": out_path,
        "bundleFormat": export.bundle_format,
        "entryCount": export.entry_count,
        "dbSha256": export.db_sha256,
        "message": "workspace bundle exported"
    }))
}

fn handle_import_workspace_bundle(state: &mut AppState, req: &Request) -> HandlerResult {
    let in_path = get_required_str(&req.params, "inPath")?;
    let workspace = workspace_path(state, req)?;

    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return Err(HandlerErr {
            code: "not_found",
            message: "bundle file not found".to_string(),
            details: Some(json!({ "path": in_path })),
        });
    }

    // Restoring into another workspace leaves the selected one open and untouched.
    let selected = state
        .workspace
        .as_deref()
        .is_some_and(|current| same_dir(current, &workspace));
    if !selected {
        let import =
            backup::import_workspace_bundle(&src, &workspace).map_err(|e| io_failed(e, &in_path))?;
        return Ok(restored_result(&workspace, &import, false));
    }

    // The open handle must be released before the database file is swapped.
    state.db = None;

    let restored = backup::import_workspace_bundle(&src, &workspace);
    // Reopen whatever is on disk now, so a failed restore keeps the old database usable.
    let reopened = state.open_workspace(workspace.clone());

    let import = restored.map_err(|e| io_failed(e, &in_path))?;
    reopened.map_err(|e| HandlerErr {
        code: "db_open_failed",
        message: format!("{e:?}"),
        details: None,
    })?;

    Ok(restored_result(&workspace, &import, true))
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn restored_result(workspace: &Path, import: &backup::ImportSummary, reopened: bool) -> serde_json::Value {
    json!({
        "workspacePath": workspace.to_string_lossy(),
        "reopened": reopened,
        "bundleFormatDetected": import.bundle_format_detected,
        "checksumVerified": import.checksum_verified,
        "message": "workspace bundle restored"
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "backup.exportWorkspaceBundle" => handle_export_workspace_bundle(state, req),
        "backup.importWorkspaceBundle" => handle_import_workspace_bundle(state, req),
        _ => return None,
    };
    Some(respond(req, res))
}
