use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{date_or_today, required_str, run_with_context};
use crate::ipc::types::{AppState, Context, Request};
use crate::snapshot::Snapshot;
use crate::store::RecordStore;
use crate::workflow;
use serde_json::json;
use tracing::info;

fn attendance_check_in(
    ctx: &mut Context<'_>,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = required_str(params, "name")?;
    let date = date_or_today(params, "date")?;

    ctx.store.invalidate();
    let snap = Snapshot::load(ctx.store)?;
    let (roster, attendance) = workflow::check_in(&snap.roster, &snap.attendance, &name, date)?;
    // One atomic write for both tables keeps Total Classes in step with the log.
    ctx.store.replace_many(vec![
        snap.attendance_write(&attendance),
        snap.roster_write(&roster),
    ])?;

    let (Some(record), Some(student)) = (
        attendance.last(),
        roster.iter().find(|s| s.name == name.trim()),
    ) else {
        return Err(HandlerErr::new("internal", "check-in produced no record"));
    };
    info!(
        student_id = student.id,
        date = %record.date,
        environment = ctx.session.environment.as_str(),
        "checked in"
    );
    Ok(json!({
        "record": record,
        "totalClasses": student.total_classes,
    }))
}

fn attendance_list(ctx: &mut Context<'_>, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let snap = Snapshot::load(ctx.store)?;
    Ok(json!({ "records": snap.attendance }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.checkIn" => Some(run_with_context(state, req, attendance_check_in)),
        "attendance.list" => Some(run_with_context(state, req, attendance_list)),
        _ => None,
    }
}
