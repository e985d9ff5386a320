use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn handle_backup_export_workspace_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match req.params.get("outPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing outPath", None),
    };
    let Some(workspace_path) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(session) = state.session.as_ref() else {
        return err(&req.id, "locked", "unlock a session first", None);
    };
    let environment = session.environment;

    let out = PathBuf::from(&out_path);
    let export = match backup::export_workspace_bundle(
        &workspace_path,
        environment.db_file_name(),
        &out,
    ) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, path = %out_path, "bundle export failed");
            return err(
                &req.id,
                "io_failed",
                e.to_string(),
                Some(json!({ "path": out_path })),
            );
        }
    };
    info!(path = %out_path, environment = environment.as_str(), "exported workspace bundle");

    ok(
        &req.id,
        json!({
            "path": out_path,
            "bundleFormat": export.bundle_format,
            "entryCount": export.entry_count,
            "dbSha256": export.db_sha256
        }),
    )
}

fn handle_backup_import_workspace_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let in_path = match req.params.get("inPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing inPath", None),
    };
    let Some(workspace_path) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(session) = state.session.as_ref() else {
        return err(&req.id, "locked", "unlock a session first", None);
    };
    let environment = session.environment;

    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return err(
            &req.id,
            "not_found",
            "bundle file not found",
            Some(json!({ "path": in_path })),
        );
    }

    // Drop open handle (and its cached snapshots) before replacing the file.
    state.store = None;

    let import = backup::import_workspace_bundle(&src, &workspace_path, environment.db_file_name());
    let reopened = state.reopen_store();
    let import = match import {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, path = %in_path, "bundle import failed");
            return err(
                &req.id,
                "io_failed",
                e.to_string(),
                Some(json!({ "path": in_path })),
            );
        }
    };
    if let Err(e) = reopened {
        return err(&req.id, "db_open_failed", e.to_string(), None);
    }
    info!(path = %in_path, environment = environment.as_str(), "imported workspace bundle");

    ok(
        &req.id,
        json!({
            "workspacePath": workspace_path.to_string_lossy(),
            "bundleFormatDetected": import.bundle_format_detected
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportWorkspaceBundle" => Some(handle_backup_export_workspace_bundle(state, req)),
        "backup.importWorkspaceBundle" => Some(handle_backup_import_workspace_bundle(state, req)),
        _ => None,
    }
}
