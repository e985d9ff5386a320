use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, info};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "environment": state.session.as_ref().map(|s| s.environment.as_str()),
        }),
    )
}

pub fn select_workspace(state: &mut AppState, path: PathBuf) -> anyhow::Result<()> {
    std::fs::create_dir_all(&path)?;
    state.workspace = Some(path);
    state.reopen_store()
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match select_workspace(state, path.clone()) {
        Ok(()) => {
            info!(workspace = %path.display(), "workspace selected");
            ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
        }
        Err(e) => {
            state.workspace = None;
            state.store = None;
            err(&req.id, "db_open_failed", format!("{e:?}"), None)
        }
    }
}

fn handle_cache_invalidate(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(store) = state.store.as_mut() {
        store.invalidate();
        debug!("snapshot cache cleared");
    }
    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "cache.invalidate" => Some(handle_cache_invalidate(state, req)),
        _ => None,
    }
}
