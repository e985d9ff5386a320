use crate::aggregate;
use crate::calendar;
use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{required_str, run_with_context, year_month_or_current, year_or_current};
use crate::ipc::types::{AppState, Context, Request};
use crate::model::DATE_FORMAT;
use crate::snapshot::Snapshot;
use serde_json::json;

fn reports_monthly(ctx: &mut Context<'_>, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (year, month) = year_month_or_current(params)?;
    let snap = Snapshot::load(ctx.store)?;
    let rows: Vec<serde_json::Value> = aggregate::month_student_counts(&snap.attendance, year, month)
        .into_iter()
        .map(|c| json!({ "name": c.name, "checkIns": c.count }))
        .collect();
    let days: serde_json::Map<String, serde_json::Value> =
        aggregate::month_daily_counts(&snap.attendance, year, month)
            .into_iter()
            .map(|(day, count)| (day.to_string(), json!(count)))
            .collect();
    Ok(json!({
        "year": year,
        "month": month,
        "total": aggregate::month_total(&snap.attendance, year, month),
        "rows": rows,
        "days": days,
    }))
}

fn reports_yearly(ctx: &mut Context<'_>, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let year = year_or_current(params)?;
    let snap = Snapshot::load(ctx.store)?;
    let rows: Vec<serde_json::Value> = aggregate::year_student_counts(&snap.attendance, year)
        .into_iter()
        .map(|c| json!({ "name": c.name, "totalCheckIns": c.count }))
        .collect();
    Ok(json!({ "year": year, "rows": rows }))
}

fn reports_history(ctx: &mut Context<'_>, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let name = required_str(params, "name")?;
    let name = name.trim();
    let snap = Snapshot::load(ctx.store)?;
    let dates: Vec<String> = aggregate::student_history(&snap.attendance, name)
        .into_iter()
        .map(|d| d.format(DATE_FORMAT).to_string())
        .collect();
    Ok(json!({
        "name": name,
        "known": snap.student_by_name(name).is_some(),
        "totalSessions": dates.len(),
        "dates": dates,
    }))
}

fn reports_calendar(ctx: &mut Context<'_>, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (year, month) = year_month_or_current(params)?;
    let snap = Snapshot::load(ctx.store)?;
    let counts = aggregate::month_daily_counts(&snap.attendance, year, month);
    let grid = calendar::month_grid(year, month, &counts)?;
    Ok(json!(grid))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.monthly" => Some(run_with_context(state, req, reports_monthly)),
        "reports.yearly" => Some(run_with_context(state, req, reports_yearly)),
        "reports.history" => Some(run_with_context(state, req, reports_history)),
        "reports.calendar" => Some(run_with_context(state, req, reports_calendar)),
        _ => None,
    }
}
