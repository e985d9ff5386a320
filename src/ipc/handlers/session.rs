use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::session;
use serde_json::json;
use tracing::{info, warn};

fn handle_session_unlock(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(code) = req.params.get("code").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing code", None);
    };
    let Some(unlocked) = session::unlock(&state.config, code) else {
        warn!("rejected access code");
        return err(&req.id, "bad_access_code", "Invalid Access Code", None);
    };

    let result = json!({
        "sessionId": unlocked.id.to_string(),
        "environment": unlocked.environment,
        "testMode": unlocked.environment.is_test(),
    });
    let environment = unlocked.environment;
    state.session = Some(unlocked);
    if let Err(e) = state.reopen_store() {
        state.session = None;
        return err(&req.id, "db_open_failed", format!("{e:?}"), None);
    }
    info!(environment = environment.as_str(), "session unlocked");
    ok(&req.id, result)
}

fn handle_session_lock(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.session = None;
    state.store = None;
    info!("session locked");
    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.unlock" => Some(handle_session_unlock(state, req)),
        "session.lock" => Some(handle_session_lock(state, req)),
        _ => None,
    }
}
