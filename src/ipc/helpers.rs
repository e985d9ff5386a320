use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::types::{AppState, Context, Request};
use crate::model::DATE_FORMAT;
use chrono::{Datelike, Local, NaiveDate};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

/// `YYYY-MM-DD`, defaulting to today when absent or null.
pub fn date_or_today(params: &serde_json::Value, key: &str) -> Result<NaiveDate, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(today()),
        Some(v) => {
            let s = v
                .as_str()
                .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a string", key)))?;
            NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .map_err(|_| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)))
        }
    }
}

pub fn year_or_current(params: &serde_json::Value) -> Result<i32, HandlerErr> {
    match params.get("year") {
        None | Some(serde_json::Value::Null) => Ok(today().year()),
        Some(v) => v
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .filter(|y| (1..=9999).contains(y))
            .ok_or_else(|| HandlerErr::bad_params("year must be an integer between 1 and 9999")),
    }
}

pub fn year_month_or_current(params: &serde_json::Value) -> Result<(i32, u32), HandlerErr> {
    let year = year_or_current(params)?;
    let month = match params.get("month") {
        None | Some(serde_json::Value::Null) => today().month(),
        Some(v) => v
            .as_u64()
            .filter(|m| (1..=12).contains(m))
            .map(|m| m as u32)
            .ok_or_else(|| HandlerErr::bad_params("month must be between 1 and 12"))?,
    };
    Ok((year, month))
}

pub fn require_context(state: &mut AppState) -> Result<Context<'_>, HandlerErr> {
    if state.workspace.is_none() {
        return Err(HandlerErr::new("no_workspace", "select a workspace first"));
    }
    let Some(session) = state.session.as_ref() else {
        return Err(HandlerErr::new("locked", "unlock a session first"));
    };
    let Some(store) = state.store.as_mut() else {
        return Err(HandlerErr::new("no_workspace", "select a workspace first"));
    };
    Ok(Context { session, store })
}

pub fn run_with_context<F>(state: &mut AppState, req: &Request, op: F) -> serde_json::Value
where
    F: FnOnce(&mut Context<'_>, &serde_json::Value) -> Result<serde_json::Value, HandlerErr>,
{
    let result = require_context(state).and_then(|mut ctx| op(&mut ctx, &req.params));
    match result {
        Ok(value) => ok(&req.id, value),
        Err(error) => error.response(&req.id),
    }
}
