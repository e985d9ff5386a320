use crate::ipc::error::HandlerErr;
use crate::ipc::helpers::{date_or_today, required_str, run_with_context};
use crate::ipc::types::{AppState, Context, Request};
use crate::snapshot::Snapshot;
use crate::store::RecordStore;
use crate::workflow;
use serde_json::json;
use tracing::info;

fn students_list(ctx: &mut Context<'_>, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let snap = Snapshot::load(ctx.store)?;
    let mut students = snap.roster;
    students.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(json!({ "students": students }))
}

fn students_register(
    ctx: &mut Context<'_>,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = required_str(params, "name")?;
    let joined = date_or_today(params, "date")?;

    // Writes start from a fresh read so the version check sees other writers.
    ctx.store.invalidate();
    let snap = Snapshot::load(ctx.store)?;
    let roster = workflow::register(&snap.roster, &name, joined)?;
    let write = snap.roster_write(&roster);
    ctx.store
        .replace_all(write.table, write.rows, write.expected_version)?;

    let Some(student) = roster.last() else {
        return Err(HandlerErr::new("internal", "registration produced no student"));
    };
    info!(
        student_id = student.id,
        environment = ctx.session.environment.as_str(),
        "registered student"
    );
    Ok(json!({ "student": student }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(run_with_context(state, req, students_list)),
        "students.register" => Some(run_with_context(state, req, students_register)),
        _ => None,
    }
}
